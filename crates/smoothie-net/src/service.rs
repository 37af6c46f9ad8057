use async_trait::async_trait;

use smoothie_shared::{Recipe, RecipeId, RecipePayload};

use crate::error::RemoteError;

/// The remote record store.
///
/// An `Ok` from [`list`](RecipeService::list) is authoritative, including an
/// empty vector: it means the remote catalog is empty, not that it could not
/// be reached.
#[async_trait]
pub trait RecipeService: Send + Sync {
    async fn list(&self) -> Result<Vec<Recipe>, RemoteError>;

    /// Create a record. The service assigns `id` and `createdAt`.
    async fn create(&self, payload: &RecipePayload) -> Result<Recipe, RemoteError>;

    /// Replace the content of `id`. Last write wins.
    async fn update(&self, id: &RecipeId, payload: &RecipePayload) -> Result<Recipe, RemoteError>;

    async fn delete(&self, id: &RecipeId) -> Result<(), RemoteError>;
}
