//! Favorites set, persisted as a JSON array of id strings under
//! [`FAVORITES_KEY`].
//!
//! Entries are never validated against the catalog; an id that no longer
//! resolves to a recipe is simply inert.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use tracing::warn;

use smoothie_shared::constants::FAVORITES_KEY;

use crate::error::{Result, StoreError};
use crate::kv::KeyValueStore;

pub struct FavoritesStore {
    kv: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl FavoritesStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            write_lock: Mutex::new(()),
        }
    }

    pub fn load(&self) -> Result<BTreeSet<String>> {
        let Some(raw) = self.kv.get(FAVORITES_KEY)? else {
            return Ok(BTreeSet::new());
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(ids) => Ok(ids.into_iter().collect()),
            Err(e) => {
                warn!(error = %e, "favorites document is corrupt, starting empty");
                Ok(BTreeSet::new())
            }
        }
    }

    pub fn save(&self, favorites: &BTreeSet<String>) -> Result<()> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        let ids: Vec<&String> = favorites.iter().collect();
        self.kv.set(FAVORITES_KEY, &serde_json::to_string(&ids)?)
    }

    /// Flip membership of `id`. Returns `true` if it is now a favorite.
    pub fn toggle(&self, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut favorites = self.load()?;
        let now_favorite = if favorites.remove(id) {
            false
        } else {
            favorites.insert(id.to_string());
            true
        };
        let ids: Vec<&String> = favorites.iter().collect();
        self.kv.set(FAVORITES_KEY, &serde_json::to_string(&ids)?)?;
        Ok(now_favorite)
    }

    /// Drop `id` from the set. Returns whether it was present.
    pub fn remove(&self, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut favorites = self.load()?;
        if !favorites.remove(id) {
            return Ok(false);
        }
        let ids: Vec<&String> = favorites.iter().collect();
        self.kv.set(FAVORITES_KEY, &serde_json::to_string(&ids)?)?;
        Ok(true)
    }
}
