//! Local fallback store.
//!
//! Holds recipes whose remote create failed, as one JSON array under
//! [`LOCAL_RECIPES_KEY`]. Every write replaces the whole array.
//!
//! Loading runs a repair step: records that kept their `name` and
//! `contributor` but lost `ingredients` or `instructions` are patched and
//! written back straight away. Records missing `name` or `contributor`
//! cannot be repaired and are returned untouched; the sync engine never
//! shows them and drops them on its next migration pass.

use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tracing::{debug, info, warn};

use smoothie_shared::constants::{DEFAULT_INSTRUCTIONS, LOCAL_RECIPES_BACKUP_KEY, LOCAL_RECIPES_KEY};
use smoothie_shared::{Recipe, RecipeDraft, RecipeId};

use crate::error::{Result, StoreError};
use crate::kv::KeyValueStore;

pub struct LocalFallbackStore {
    kv: Arc<dyn KeyValueStore>,
    // Serializes read-modify-write sequences on the single key.
    write_lock: Mutex<()>,
}

impl LocalFallbackStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            write_lock: Mutex::new(()),
        }
    }

    /// Load every local record, repairing and re-persisting where possible.
    pub fn load(&self) -> Result<Vec<Recipe>> {
        let _guard = self.lock()?;
        self.load_unlocked()
    }

    /// Atomically replace the stored list.
    pub fn save(&self, recipes: &[Recipe]) -> Result<()> {
        let _guard = self.lock()?;
        self.save_unlocked(recipes)
    }

    /// Insert a record, replacing any existing record with the same id.
    pub fn upsert(&self, recipe: Recipe) -> Result<()> {
        let _guard = self.lock()?;
        let mut recipes = self.load_unlocked()?;
        match recipes.iter_mut().find(|r| r.id == recipe.id) {
            Some(existing) => *existing = recipe,
            None => recipes.push(recipe),
        }
        self.save_unlocked(&recipes)
    }

    /// Apply `draft` to the record with `id`. Returns the patched record, or
    /// `None` when no such record exists.
    pub fn patch(&self, id: &RecipeId, draft: RecipeDraft) -> Result<Option<Recipe>> {
        let _guard = self.lock()?;
        let mut recipes = self.load_unlocked()?;
        let Some(recipe) = recipes.iter_mut().find(|r| &r.id == id) else {
            return Ok(None);
        };
        recipe.apply_draft(draft);
        let patched = recipe.clone();
        self.save_unlocked(&recipes)?;
        debug!(id = %id, "patched local recipe");
        Ok(Some(patched))
    }

    /// Remove every record whose id is in `ids`. Returns how many were removed.
    pub fn remove_many(&self, ids: &[RecipeId]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let _guard = self.lock()?;
        let mut recipes = self.load_unlocked()?;
        let before = recipes.len();
        recipes.retain(|r| !ids.contains(&r.id));
        let removed = before - recipes.len();
        if removed > 0 {
            self.save_unlocked(&recipes)?;
        }
        Ok(removed)
    }

    pub fn remove(&self, id: &RecipeId) -> Result<bool> {
        self.remove_many(std::slice::from_ref(id)).map(|n| n > 0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn load_unlocked(&self) -> Result<Vec<Recipe>> {
        let Some(raw) = self.kv.get(LOCAL_RECIPES_KEY)? else {
            return Ok(Vec::new());
        };

        let mut records: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(Value::Array(records)) => records,
            Ok(_) | Err(_) => {
                warn!(
                    backup_key = LOCAL_RECIPES_BACKUP_KEY,
                    "local recipe list is not a JSON array, backing it up and starting empty"
                );
                self.back_up_unreadable(&raw)?;
                return Ok(Vec::new());
            }
        };

        let repaired = records
            .iter_mut()
            .map(repair_record)
            .filter(|changed| *changed)
            .count();

        if repaired > 0 {
            info!(repaired, "repaired incomplete local recipes");
            self.kv
                .set(LOCAL_RECIPES_KEY, &serde_json::to_string(&records)?)?;
        }

        let mut recipes = Vec::with_capacity(records.len());
        for record in records {
            match serde_json::from_value::<Recipe>(record) {
                Ok(recipe) => recipes.push(recipe),
                Err(e) => warn!(error = %e, "skipping unreadable local recipe"),
            }
        }
        Ok(recipes)
    }

    /// Keep the first unreadable document; a later rewrite of the main key
    /// must not lose it.
    fn back_up_unreadable(&self, raw: &str) -> Result<()> {
        if self.kv.get(LOCAL_RECIPES_BACKUP_KEY)?.is_none() {
            self.kv.set(LOCAL_RECIPES_BACKUP_KEY, raw)?;
        }
        Ok(())
    }

    fn save_unlocked(&self, recipes: &[Recipe]) -> Result<()> {
        let json = serde_json::to_string(recipes)?;
        self.kv.set(LOCAL_RECIPES_KEY, &json)?;
        debug!(count = recipes.len(), "saved local recipes");
        Ok(())
    }
}

fn has_text(record: &serde_json::Map<String, Value>, field: &str) -> bool {
    record
        .get(field)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty())
}

/// Patch missing `ingredients` / `instructions` on a record that still has a
/// name and contributor. Returns whether anything changed.
fn repair_record(record: &mut Value) -> bool {
    let Some(obj) = record.as_object_mut() else {
        return false;
    };
    if !has_text(obj, "name") || !has_text(obj, "contributor") {
        return false;
    }

    let mut changed = false;
    if !obj.get("ingredients").is_some_and(Value::is_array) {
        obj.insert("ingredients".into(), Value::Array(Vec::new()));
        changed = true;
    }
    if !obj.get("instructions").is_some_and(Value::is_string) {
        obj.insert(
            "instructions".into(),
            Value::String(DEFAULT_INSTRUCTIONS.to_string()),
        );
        changed = true;
    }
    changed
}
