//! In-memory record store behind the HTTP API.

use std::sync::Arc;

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tokio::sync::RwLock;
use tracing::info;

use smoothie_shared::constants::REMOTE_SUFFIX_LEN;
use smoothie_shared::{Recipe, RecipeId, RecipePayload};

use crate::error::ServerError;

#[derive(Clone, Default)]
pub struct RecipeStore {
    // Insertion order is the listing order.
    recipes: Arc<RwLock<Vec<Recipe>>>,
}

impl RecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn list(&self) -> Vec<Recipe> {
        self.recipes.read().await.clone()
    }

    /// Persist a new record, assigning its id and `createdAt`.
    pub async fn create(&self, payload: RecipePayload) -> Result<Recipe, ServerError> {
        payload.validate()?;

        let mut recipes = self.recipes.write().await;
        let now = Utc::now();
        let id = loop {
            let candidate = RecipeId::remote(now.timestamp_millis(), random_suffix());
            if !recipes.iter().any(|r| r.id == candidate) {
                break candidate;
            }
        };

        let recipe = Recipe::from_draft(id, payload.contributor, payload.draft, now);
        recipes.push(recipe.clone());

        info!(id = %recipe.id, contributor = %recipe.contributor, "Recipe created");
        Ok(recipe)
    }

    /// Replace the content of an existing record. `contributor` and
    /// `createdAt` keep their original values.
    pub async fn update(&self, id: &RecipeId, payload: RecipePayload) -> Result<Recipe, ServerError> {
        payload.validate()?;

        let mut recipes = self.recipes.write().await;
        let recipe = recipes
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| ServerError::RecipeNotFound(id.to_string()))?;
        recipe.apply_draft(payload.draft);

        info!(id = %id, "Recipe updated");
        Ok(recipe.clone())
    }

    pub async fn delete(&self, id: &RecipeId) -> Result<(), ServerError> {
        let mut recipes = self.recipes.write().await;
        let before = recipes.len();
        recipes.retain(|r| &r.id != id);
        if recipes.len() == before {
            return Err(ServerError::RecipeNotFound(id.to_string()));
        }

        info!(id = %id, "Recipe deleted");
        Ok(())
    }
}

fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REMOTE_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use smoothie_shared::RecipeDraft;

    fn payload(name: &str) -> RecipePayload {
        RecipePayload::new(
            "alice",
            RecipeDraft {
                name: name.into(),
                ingredients: vec!["kale".into()],
                instructions: "blend".into(),
                ..RecipeDraft::default()
            },
        )
    }

    #[tokio::test]
    async fn create_assigns_remote_id_and_timestamp() {
        let store = RecipeStore::new();
        let recipe = store.create(payload("Kale Cooler")).await.unwrap();
        assert!(recipe.id.is_remote());
        assert!(recipe.created_at.is_some());
        match &recipe.id {
            RecipeId::Remote { suffix, .. } => assert_eq!(suffix.len(), REMOTE_SUFFIX_LEN),
            other => panic!("unexpected id {other}"),
        }
    }

    #[tokio::test]
    async fn update_preserves_created_at_and_contributor() {
        let store = RecipeStore::new();
        let created = store.create(payload("A")).await.unwrap();

        let mut edit = payload("B");
        edit.contributor = "mallory".into();
        let updated = store.update(&created.id, edit).await.unwrap();

        assert_eq!(updated.name, "B");
        assert_eq!(updated.contributor, "alice");
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let store = RecipeStore::new();
        let id = RecipeId::remote(1, "nope");
        assert!(matches!(
            store.delete(&id).await,
            Err(ServerError::RecipeNotFound(_))
        ));
        assert!(matches!(
            store.update(&id, payload("x")).await,
            Err(ServerError::RecipeNotFound(_))
        ));
    }

    #[tokio::test]
    async fn create_rejects_incomplete_payload() {
        let store = RecipeStore::new();
        let mut bad = payload("x");
        bad.draft.ingredients.clear();
        assert!(matches!(
            store.create(bad).await,
            Err(ServerError::BadRequest(_))
        ));
        assert!(store.list().await.is_empty());
    }
}
