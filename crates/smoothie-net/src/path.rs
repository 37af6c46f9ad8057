//! Request path construction.
//!
//! Every call site that embeds a recipe id in a URL goes through
//! [`recipe_path`], the only place an id is percent-encoded.

use smoothie_shared::constants::RECIPES_PATH;
use smoothie_shared::RecipeId;

/// `/recipes`
pub fn recipes_path() -> &'static str {
    RECIPES_PATH
}

/// `/recipes/{id}` with the id percent-encoded exactly once.
pub fn recipe_path(id: &RecipeId) -> String {
    format!("{RECIPES_PATH}/{}", urlencoding::encode(&id.to_string()))
}
