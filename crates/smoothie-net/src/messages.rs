//! Response envelopes of the recipe service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use smoothie_shared::Recipe;

/// `GET /recipes`. Rows are kept as raw JSON so one bad row does not sink
/// the whole listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub recipes: Vec<Value>,
}

/// `POST /recipes` and `PUT /recipes/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeResponse {
    #[serde(default)]
    pub success: bool,
    pub recipe: Recipe,
}

/// Error body produced by the service on non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
