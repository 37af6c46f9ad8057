use thiserror::Error;

use smoothie_net::RemoteError;
use smoothie_shared::{RecipeId, ValidationError};
use smoothie_store::StoreError;

/// Errors surfaced by the sync engine's commands.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid recipe: {0}")]
    Validation(#[from] ValidationError),

    #[error("Recipe not found: {0}")]
    NotFound(RecipeId),

    /// Seed recipes cannot be edited or deleted.
    #[error("Recipe {0} is read-only")]
    ReadOnly(RecipeId),

    /// The background half of a command panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Catalog state lock poisoned")]
    LockPoisoned,
}
