use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Invalid recipe id: {0:?}")]
    InvalidRecipeId(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Reasons a recipe draft is rejected before it reaches any store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Recipe name is required")]
    BlankName,

    #[error("At least one ingredient is required")]
    NoIngredients,

    #[error("Instructions are required")]
    BlankInstructions,

    #[error("Servings must be at least 1")]
    ZeroServings,

    #[error("A contributor name is required")]
    MissingContributor,
}
