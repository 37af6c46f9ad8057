// Client for the remote recipe service, spoken over HTTP + JSON.

pub mod error;
pub mod http;
pub mod messages;
pub mod path;
pub mod service;

pub use error::RemoteError;
pub use http::{HttpRecipeService, HttpServiceConfig};
pub use path::{recipe_path, recipes_path};
pub use service::RecipeService;
