//! The catalog state container.
//!
//! Holds both recipe sets, the favorites set, the outcome of the last
//! `list()` call and the currently displayed recipe. The engine mutates it
//! only through the methods here, under one lock, so each command is a
//! single transition.
//!
//! Remote writes made by this client are also journalled against the list
//! epoch they happened in. A listing only replaces the remote set wholesale
//! for writes that happened before it was requested; later writes are
//! replayed on top, so a slow `list()` cannot undo a create, edit or delete
//! that finished while it was in flight.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use smoothie_shared::seeds::seed_recipes;
use smoothie_shared::{Recipe, RecipeId};

/// Outcome of the most recent `list()` attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemoteStatus {
    /// Last list failed (or none has succeeded yet): seeds + local are shown.
    Unavailable,
    /// Last list succeeded, possibly empty: remote + local are shown.
    Available,
}

#[derive(Debug, Clone)]
pub struct CatalogState {
    pub remote: Vec<Recipe>,
    pub local: Vec<Recipe>,
    pub seeds: Vec<Recipe>,
    pub favorites: BTreeSet<String>,
    pub remote_status: RemoteStatus,
    pub current: Option<RecipeId>,
    /// Number of `list()` calls started so far.
    list_epoch: u64,
    /// Epoch of the newest listing applied; older ones arriving late are stale.
    applied_epoch: u64,
    /// Remote records written by this client, tagged with the list epoch.
    written: Vec<(u64, Recipe)>,
    /// Remote ids deleted by this client. The epoch is set once the remote
    /// call has finished; until then the id is filtered from every listing.
    deleted: Vec<(Option<u64>, RecipeId)>,
}

impl CatalogState {
    pub fn new(local: Vec<Recipe>, favorites: BTreeSet<String>) -> Self {
        Self {
            remote: Vec::new(),
            local,
            seeds: seed_recipes(),
            favorites,
            remote_status: RemoteStatus::Unavailable,
            current: None,
            list_epoch: 0,
            applied_epoch: 0,
            written: Vec::new(),
            deleted: Vec::new(),
        }
    }

    /// Call before issuing `list()`; pass the result to
    /// [`apply_listing`](Self::apply_listing) or
    /// [`listing_failed`](Self::listing_failed).
    pub fn begin_listing(&mut self) -> u64 {
        self.list_epoch += 1;
        self.list_epoch
    }

    /// Install the result of the listing started at `epoch`. Returns `false`
    /// when a newer listing was already applied and this one was dropped.
    pub fn apply_listing(&mut self, epoch: u64, recipes: Vec<Recipe>) -> bool {
        if epoch < self.applied_epoch {
            return false;
        }
        self.applied_epoch = epoch;

        // Writes made before this listing was requested are reflected in it.
        self.written.retain(|(e, _)| *e >= epoch);
        self.deleted
            .retain(|(settled, _)| settled.map_or(true, |e| e >= epoch));

        self.remote = recipes;
        self.remote
            .retain(|r| !self.deleted.iter().any(|(_, id)| id == &r.id));
        let replay: Vec<Recipe> = self.written.iter().map(|(_, r)| r.clone()).collect();
        for recipe in replay {
            self.upsert_remote_set(recipe);
        }
        self.remote_status = RemoteStatus::Available;
        true
    }

    /// The listing started at `epoch` failed. Stale failures are ignored.
    pub fn listing_failed(&mut self, epoch: u64) -> bool {
        if epoch < self.applied_epoch {
            return false;
        }
        self.applied_epoch = epoch;
        self.remote.clear();
        self.remote_status = RemoteStatus::Unavailable;
        true
    }

    /// The merged catalog. Each id appears once; local records without a
    /// name or contributor are never included.
    pub fn visible(&self) -> Vec<Recipe> {
        // While unavailable, records this client wrote to the service since
        // the last listing still show alongside the seeds.
        let (primary, written): (&[Recipe], Vec<&Recipe>) = match self.remote_status {
            RemoteStatus::Available => (self.remote.as_slice(), Vec::new()),
            RemoteStatus::Unavailable => (
                self.seeds.as_slice(),
                self.written.iter().map(|(_, r)| r).collect(),
            ),
        };

        let mut seen = HashSet::new();
        primary
            .iter()
            .chain(written)
            .chain(self.local.iter().filter(|r| r.is_displayable()))
            .filter(|r| seen.insert(r.id.clone()))
            .cloned()
            .collect()
    }

    /// Look a recipe up in whichever set owns its namespace.
    pub fn find(&self, id: &RecipeId) -> Option<&Recipe> {
        let set = match id {
            RecipeId::Remote { .. } => &self.remote,
            RecipeId::Local(_) => &self.local,
            RecipeId::Seed(_) => &self.seeds,
        };
        set.iter().find(|r| &r.id == id).or_else(|| {
            self.written
                .iter()
                .map(|(_, r)| r)
                .find(|r| &r.id == id)
        })
    }

    pub fn is_favorite(&self, id: &RecipeId) -> bool {
        self.favorites.contains(&id.to_string())
    }

    /// Add a record this client just created remotely, unless one with the
    /// same id is already present. Returns whether it was inserted.
    pub fn insert_remote(&mut self, recipe: Recipe) -> bool {
        if self.remote.iter().any(|r| r.id == recipe.id) {
            return false;
        }
        self.journal_write(recipe.clone());
        self.remote.push(recipe);
        true
    }

    /// Insert or replace a record this client just wrote remotely.
    pub fn upsert_remote(&mut self, recipe: Recipe) {
        self.journal_write(recipe.clone());
        self.upsert_remote_set(recipe);
    }

    fn upsert_remote_set(&mut self, recipe: Recipe) {
        match self.remote.iter_mut().find(|r| r.id == recipe.id) {
            Some(existing) => *existing = recipe,
            None => self.remote.push(recipe),
        }
    }

    fn journal_write(&mut self, recipe: Recipe) {
        self.written.retain(|(_, r)| r.id != recipe.id);
        self.written.push((self.list_epoch, recipe));
    }

    pub fn upsert_local(&mut self, recipe: Recipe) {
        match self.local.iter_mut().find(|r| r.id == recipe.id) {
            Some(existing) => *existing = recipe,
            None => self.local.push(recipe),
        }
    }

    /// Drop `id` from its recipe set, the favorites set and the current
    /// selection in one step. Returns the removed record, if any.
    pub fn remove(&mut self, id: &RecipeId) -> Option<Recipe> {
        let set = match id {
            RecipeId::Remote { .. } => &mut self.remote,
            RecipeId::Local(_) => &mut self.local,
            RecipeId::Seed(_) => return None,
        };
        let mut removed = set
            .iter()
            .position(|r| &r.id == id)
            .map(|idx| set.remove(idx));

        if id.is_remote() {
            if let Some(idx) = self.written.iter().position(|(_, r)| &r.id == id) {
                let (_, recipe) = self.written.remove(idx);
                if removed.is_none() {
                    removed = Some(recipe);
                }
            }
            self.deleted.push((None, id.clone()));
        }

        self.favorites.remove(&id.to_string());
        if self.current.as_ref() == Some(id) {
            self.current = None;
        }
        removed
    }

    /// The remote delete of `id` finished (either way). Only listings
    /// requested from now on can be trusted to reflect it.
    pub fn settle_delete(&mut self, id: &RecipeId) {
        let now = self.list_epoch;
        for (settled, deleted) in self.deleted.iter_mut() {
            if deleted == id {
                *settled = Some(now);
            }
        }
    }

    /// Re-point references from a promoted local id to its new remote id.
    pub fn retarget(&mut self, from: &RecipeId, to: &RecipeId) {
        if self.favorites.remove(&from.to_string()) {
            self.favorites.insert(to.to_string());
        }
        if self.current.as_ref() == Some(from) {
            self.current = Some(to.clone());
        }
    }

    /// A fresh local id based on `now_ms`, bumped until unique.
    pub fn next_local_id(&self, now_ms: i64) -> RecipeId {
        let mut ts = now_ms;
        while self.local.iter().any(|r| r.id == RecipeId::Local(ts)) {
            ts += 1;
        }
        RecipeId::Local(ts)
    }
}
