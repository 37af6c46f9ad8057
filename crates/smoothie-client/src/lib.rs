//! # smoothie-client
//!
//! Local-first sync engine for the Smoothie recipe catalog.
//!
//! The [`SyncEngine`] merges the remote catalog with recipes held in the
//! local fallback store, falls back to local storage when the remote service
//! is unreachable, and promotes local recipes once a contributor identity is
//! known. [`MigrationScheduler`] drives the promotion pass periodically.

pub mod auth_gate;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod identity;
pub mod scheduler;
pub mod selection;
pub mod state;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use smoothie_net::HttpRecipeService;
use smoothie_store::SqliteKv;

pub use config::ClientConfig;
pub use engine::{MigrationReport, PendingDelete, SkipReason, SyncEngine};
pub use error::SyncError;
pub use events::CatalogEvent;
pub use identity::{AuthSession, IdentityResolver, SessionHandle, SessionProvider};
pub use scheduler::MigrationScheduler;
pub use selection::Facets;
pub use state::RemoteStatus;

/// Install a `fmt` subscriber honouring `RUST_LOG`. Safe to call more than
/// once; later calls are ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("smoothie_client=debug,smoothie_net=debug,smoothie_store=info,warn")
        }))
        .try_init();
}

/// Wire an engine to the HTTP service and the SQLite store named by `config`.
pub fn connect(config: &ClientConfig, sessions: Arc<dyn SessionProvider>) -> Result<SyncEngine, SyncError> {
    let remote = HttpRecipeService::new(config.http_config())?;
    let kv = match config.db_path {
        Some(ref path) => SqliteKv::open_at(path)?,
        None => SqliteKv::open_default()?,
    };

    info!(api_url = %config.api_url, "sync engine connected");
    SyncEngine::new(Arc::new(remote), Arc::new(kv), sessions)
}
