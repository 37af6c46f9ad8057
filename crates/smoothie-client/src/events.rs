use serde::Serialize;

use smoothie_shared::RecipeId;

use crate::state::RemoteStatus;

pub const EVENT_CATALOG_CHANGED: &str = "catalog-changed";
pub const EVENT_REMOTE_STATUS_CHANGED: &str = "remote-status-changed";
pub const EVENT_RECIPE_MIGRATED: &str = "recipe-migrated";
pub const EVENT_RECIPE_DELETED: &str = "recipe-deleted";
pub const EVENT_DELETE_FAILED: &str = "delete-failed";

/// Notifications for UI collaborators, delivered over a broadcast channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CatalogEvent {
    CatalogChanged,
    RemoteStatusChanged { status: RemoteStatus },
    RecipeMigrated { local_id: RecipeId, remote_id: RecipeId },
    RecipeDeleted { id: RecipeId },
    /// The background remote delete failed. The local view stays deleted.
    DeleteFailed { id: RecipeId, error: String },
}

impl CatalogEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CatalogChanged => EVENT_CATALOG_CHANGED,
            Self::RemoteStatusChanged { .. } => EVENT_REMOTE_STATUS_CHANGED,
            Self::RecipeMigrated { .. } => EVENT_RECIPE_MIGRATED,
            Self::RecipeDeleted { .. } => EVENT_RECIPE_DELETED,
            Self::DeleteFailed { .. } => EVENT_DELETE_FAILED,
        }
    }
}
