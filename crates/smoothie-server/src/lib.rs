//! # smoothie-server
//!
//! Reference implementation of the remote recipe service:
//! - `GET /recipes` and `POST /recipes`
//! - `PUT /recipes/{id}` and `DELETE /recipes/{id}` (id percent-encoded)
//! - optional static bearer-token check on every `/recipes` route
//! - `/health` for liveness checks

pub mod api;
pub mod config;
pub mod error;
pub mod recipe_store;

pub use api::{build_router, serve, serve_on, AppState};
pub use config::ServerConfig;
pub use error::ServerError;
pub use recipe_store::RecipeStore;
