//! Client-side ownership checks.
//!
//! Advisory only: the remote service remains the authority and may still
//! reject an update or delete the gate allowed.

use smoothie_shared::Recipe;

/// Only remote recipes attributed to the current identity are editable here.
/// Local-only recipes are edited without a gate check.
pub fn can_edit(recipe: &Recipe, identity: Option<&str>) -> bool {
    let Some(identity) = identity else {
        return false;
    };
    recipe.id.is_remote() && recipe.contributor == identity
}

/// Remote or local recipes attributed to the current identity. Seeds never.
pub fn can_delete(recipe: &Recipe, identity: Option<&str>) -> bool {
    let Some(identity) = identity else {
        return false;
    };
    (recipe.id.is_remote() || recipe.id.is_local()) && recipe.contributor == identity
}
