//! Recipe records and the drafts used to create or edit them.
//!
//! Every struct serializes with camelCase field names, matching the JSON the
//! remote recipe service speaks and the layout of the local fallback store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::RecipeId;

// ---------------------------------------------------------------------------
// Recipe
// ---------------------------------------------------------------------------

/// A persisted smoothie recipe.
///
/// Content fields default when absent so that partially written local
/// records still load; [`Recipe::is_displayable`] and
/// [`Recipe::is_complete`] decide what may be shown or promoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contributor: String,
    #[serde(default)]
    pub emoji: String,
    /// Hex colour string, e.g. `#ff6b9d`.
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: String,
    #[serde(default = "default_servings")]
    pub servings: u32,
    #[serde(default)]
    pub prep_time: String,
    #[serde(default)]
    pub contains_fat: bool,
    #[serde(default)]
    pub contains_nuts: bool,
    /// Set by whichever store persisted the record first. Never rewritten.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_servings() -> u32 {
    1
}

impl Recipe {
    /// Build a record from a draft. The caller supplies the id and timestamp
    /// of whichever store is persisting it.
    pub fn from_draft(
        id: RecipeId,
        contributor: impl Into<String>,
        draft: RecipeDraft,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: draft.name,
            contributor: contributor.into(),
            emoji: draft.emoji,
            color: draft.color,
            ingredients: draft.ingredients,
            instructions: draft.instructions,
            servings: draft.servings,
            prep_time: draft.prep_time,
            contains_fat: draft.contains_fat,
            contains_nuts: draft.contains_nuts,
            created_at: Some(created_at),
        }
    }

    /// Records without a name or contributor are never shown.
    pub fn is_displayable(&self) -> bool {
        !self.name.trim().is_empty() && !self.contributor.trim().is_empty()
    }

    /// Minimal completeness required before a local record may be promoted
    /// to the remote service.
    pub fn is_complete(&self) -> bool {
        self.is_displayable()
            && !self.instructions.trim().is_empty()
            && self.ingredients.iter().any(|i| !i.trim().is_empty())
    }

    /// The editable content of this record, without id, contributor or
    /// timestamp.
    pub fn to_draft(&self) -> RecipeDraft {
        RecipeDraft {
            name: self.name.clone(),
            emoji: self.emoji.clone(),
            color: self.color.clone(),
            ingredients: self.ingredients.clone(),
            instructions: self.instructions.clone(),
            servings: self.servings,
            prep_time: self.prep_time.clone(),
            contains_fat: self.contains_fat,
            contains_nuts: self.contains_nuts,
        }
    }

    /// Overwrite the content fields in place. `id`, `contributor` and
    /// `created_at` are left alone.
    pub fn apply_draft(&mut self, draft: RecipeDraft) {
        self.name = draft.name;
        self.emoji = draft.emoji;
        self.color = draft.color;
        self.ingredients = draft.ingredients;
        self.instructions = draft.instructions;
        self.servings = draft.servings;
        self.prep_time = draft.prep_time;
        self.contains_fat = draft.contains_fat;
        self.contains_nuts = draft.contains_nuts;
    }
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// User-editable recipe content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecipeDraft {
    pub name: String,
    pub emoji: String,
    pub color: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    pub servings: u32,
    pub prep_time: String,
    pub contains_fat: bool,
    pub contains_nuts: bool,
}

impl Default for RecipeDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            emoji: "🥤".into(),
            color: "#ff6b9d".into(),
            ingredients: Vec::new(),
            instructions: String::new(),
            servings: 1,
            prep_time: String::new(),
            contains_fat: false,
            contains_nuts: false,
        }
    }
}

impl RecipeDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankName);
        }
        if !self.ingredients.iter().any(|i| !i.trim().is_empty()) {
            return Err(ValidationError::NoIngredients);
        }
        if self.instructions.trim().is_empty() {
            return Err(ValidationError::BlankInstructions);
        }
        if self.servings == 0 {
            return Err(ValidationError::ZeroServings);
        }
        Ok(())
    }

    /// Trim the name and drop blank ingredient lines, then validate.
    pub fn normalized(mut self) -> Result<Self, ValidationError> {
        self.name = self.name.trim().to_string();
        self.ingredients = self
            .ingredients
            .into_iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect();
        self.validate()?;
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Request body for `POST /recipes` and `PUT /recipes/{id}`: a draft plus
/// the contributor it is attributed to. Never carries `id` or `createdAt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipePayload {
    #[serde(default)]
    pub contributor: String,
    #[serde(flatten)]
    pub draft: RecipeDraft,
}

impl RecipePayload {
    pub fn new(contributor: impl Into<String>, draft: RecipeDraft) -> Self {
        Self {
            contributor: contributor.into(),
            draft,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.contributor.trim().is_empty() {
            return Err(ValidationError::MissingContributor);
        }
        self.draft.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> RecipeDraft {
        RecipeDraft {
            name: "  Mango Sunrise ".into(),
            ingredients: vec!["mango".into(), "  ".into(), "".into(), " yoghurt ".into()],
            instructions: "Blend until smooth.".into(),
            ..RecipeDraft::default()
        }
    }

    #[test]
    fn normalized_strips_blank_ingredients() {
        let d = draft().normalized().unwrap();
        assert_eq!(d.name, "Mango Sunrise");
        assert_eq!(d.ingredients, vec!["mango".to_string(), "yoghurt".to_string()]);
    }

    #[test]
    fn validation_rejects_all_blank_ingredients() {
        let d = RecipeDraft {
            ingredients: vec![" ".into(), "".into()],
            ..draft()
        };
        assert_eq!(d.normalized(), Err(ValidationError::NoIngredients));
    }

    #[test]
    fn validation_rejects_blank_fields() {
        let d = RecipeDraft {
            name: "   ".into(),
            ..draft()
        };
        assert_eq!(d.validate(), Err(ValidationError::BlankName));

        let d = RecipeDraft {
            instructions: String::new(),
            ..draft()
        };
        assert_eq!(d.validate(), Err(ValidationError::BlankInstructions));

        let d = RecipeDraft {
            servings: 0,
            ..draft()
        };
        assert_eq!(d.validate(), Err(ValidationError::ZeroServings));
    }

    #[test]
    fn payload_has_no_id_or_created_at() {
        let payload = RecipePayload::new("alice", draft().normalized().unwrap());
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["contributor"], "alice");
        assert_eq!(value["name"], "Mango Sunrise");
        assert!(value.get("id").is_none());
        assert!(value.get("createdAt").is_none());
        assert!(value.get("prepTime").is_some());
    }

    #[test]
    fn payload_requires_contributor() {
        let payload = RecipePayload::new(" ", draft().normalized().unwrap());
        assert_eq!(payload.validate(), Err(ValidationError::MissingContributor));
    }

    #[test]
    fn recipe_tolerates_missing_content_fields() {
        let json = r#"{"id":"user-5","name":"X","contributor":"bob"}"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert!(recipe.is_displayable());
        assert!(!recipe.is_complete());
        assert_eq!(recipe.servings, 1);
        assert!(recipe.created_at.is_none());
    }

    #[test]
    fn apply_draft_keeps_identity_fields() {
        let created = Utc::now();
        let mut recipe = Recipe::from_draft(
            RecipeId::Local(1),
            "alice",
            draft().normalized().unwrap(),
            created,
        );
        let edited = RecipeDraft {
            name: "Berry Blast".into(),
            ..recipe.to_draft()
        };
        recipe.apply_draft(edited);
        assert_eq!(recipe.name, "Berry Blast");
        assert_eq!(recipe.contributor, "alice");
        assert_eq!(recipe.id, RecipeId::Local(1));
        assert_eq!(recipe.created_at, Some(created));
    }
}
