//! # smoothie-shared
//!
//! Types shared by every Smoothie crate: the recipe data model, the
//! provenance-carrying [`RecipeId`], draft validation, the bundled seed
//! catalog and protocol constants.

pub mod constants;
pub mod error;
pub mod recipe;
pub mod seeds;
pub mod types;

pub use error::{SharedError, ValidationError};
pub use recipe::{Recipe, RecipeDraft, RecipePayload};
pub use types::{RecipeId, RecipeOrigin};
