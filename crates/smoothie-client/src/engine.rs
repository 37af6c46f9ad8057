//! The sync engine.
//!
//! [`SyncEngine`] owns the catalog state and exposes the commands UI code
//! calls: `refresh`, `submit`, `update`, `delete`, `run_migration`, plus
//! favorites and selection helpers. Remote calls are never made while the
//! state lock is held; every transition of the catalog happens under one
//! short critical section.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use smoothie_net::{RecipeService, RemoteError};
use smoothie_shared::{Recipe, RecipeDraft, RecipeId, RecipeOrigin, RecipePayload, ValidationError};
use smoothie_store::{FavoritesStore, KeyValueStore, LocalFallbackStore};

use crate::auth_gate;
use crate::error::SyncError;
use crate::events::CatalogEvent;
use crate::identity::{IdentityResolver, SessionProvider};
use crate::selection::{self, Facets};
use crate::state::{CatalogState, RemoteStatus};

const EVENT_CAPACITY: usize = 64;

pub struct SyncEngine {
    remote: Arc<dyn RecipeService>,
    local: LocalFallbackStore,
    favorites: FavoritesStore,
    identity: IdentityResolver,
    state: Arc<Mutex<CatalogState>>,
    migrating: AtomicBool,
    events: broadcast::Sender<CatalogEvent>,
}

// ---------------------------------------------------------------------------
// Command results
// ---------------------------------------------------------------------------

/// Why a migration pass did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// No identity: anonymous records are never auto-migrated.
    Anonymous,
    /// Another pass was already running.
    AlreadyRunning,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// `(local id, remote id)` for every promoted record.
    pub promoted: Vec<(RecipeId, RecipeId)>,
    /// Incomplete records dropped from the local store.
    pub discarded: usize,
    /// Records whose remote create failed; they stay for the next pass.
    pub failed: usize,
    /// Records attributed to someone other than the signed-in identity
    /// (guest names, other accounts). They stay local.
    pub not_owned: usize,
    pub skipped: Option<SkipReason>,
}

impl MigrationReport {
    fn skipped(reason: SkipReason) -> Self {
        Self {
            skipped: Some(reason),
            ..Self::default()
        }
    }

    /// Nothing was changed or attempted remotely.
    pub fn is_noop(&self) -> bool {
        self.promoted.is_empty() && self.discarded == 0 && self.failed == 0
    }
}

/// Handle to the background half of a delete.
///
/// The recipe is already gone from the catalog and favorites when this is
/// returned. Dropping the handle detaches the remote call; awaiting
/// [`PendingDelete::confirmed`] reports its outcome for optional feedback.
#[derive(Debug)]
pub struct PendingDelete {
    id: RecipeId,
    task: Option<JoinHandle<Result<(), RemoteError>>>,
}

impl PendingDelete {
    pub fn id(&self) -> &RecipeId {
        &self.id
    }

    /// Whether a remote delete was issued at all (remote ids only).
    pub fn has_remote_call(&self) -> bool {
        self.task.is_some()
    }

    pub async fn confirmed(self) -> Result<(), SyncError> {
        match self.task {
            None => Ok(()),
            Some(task) => Ok(task.await??),
        }
    }
}

/// Clears the in-flight flag when a migration pass ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

impl SyncEngine {
    /// Build an engine over the given collaborators, loading the local
    /// fallback store and favorites. No remote call is made until
    /// [`refresh`](Self::refresh).
    pub fn new(
        remote: Arc<dyn RecipeService>,
        storage: Arc<dyn KeyValueStore>,
        sessions: Arc<dyn SessionProvider>,
    ) -> Result<Self, SyncError> {
        let local = LocalFallbackStore::new(storage.clone());
        let favorites = FavoritesStore::new(storage);

        let state = CatalogState::new(local.load()?, favorites.load()?);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            remote,
            local,
            favorites,
            identity: IdentityResolver::new(sessions),
            state: Arc::new(Mutex::new(state)),
            migrating: AtomicBool::new(false),
            events,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    /// The contributor identity right now.
    pub fn identity(&self) -> Option<String> {
        self.identity.current()
    }

    pub fn remote_status(&self) -> Result<RemoteStatus, SyncError> {
        Ok(self.lock_state()?.remote_status)
    }

    /// The merged, de-duplicated catalog.
    pub fn catalog(&self) -> Result<Vec<Recipe>, SyncError> {
        Ok(self.lock_state()?.visible())
    }

    /// The catalog narrowed by `facets`.
    pub fn visible(&self, facets: &Facets) -> Result<Vec<Recipe>, SyncError> {
        let state = self.lock_state()?;
        Ok(selection::filter(&state.visible(), facets, &state.favorites))
    }

    pub fn favorites(&self) -> Result<BTreeSet<String>, SyncError> {
        Ok(self.lock_state()?.favorites.clone())
    }

    pub fn is_favorite(&self, id: &RecipeId) -> Result<bool, SyncError> {
        Ok(self.lock_state()?.is_favorite(id))
    }

    /// The currently displayed recipe, if it still exists.
    pub fn current(&self) -> Result<Option<Recipe>, SyncError> {
        let state = self.lock_state()?;
        Ok(state
            .current
            .as_ref()
            .and_then(|id| state.find(id))
            .cloned())
    }

    pub fn can_edit(&self, recipe: &Recipe) -> bool {
        auth_gate::can_edit(recipe, self.identity.current().as_deref())
    }

    pub fn can_delete(&self, recipe: &Recipe) -> bool {
        auth_gate::can_delete(recipe, self.identity.current().as_deref())
    }

    // -- refresh ------------------------------------------------------------

    /// Re-list the remote catalog and reload the local store.
    ///
    /// Any list failure lands in [`RemoteStatus::Unavailable`]; any success,
    /// even an empty one, lands in [`RemoteStatus::Available`]. Writes this
    /// client finished while the listing was in flight are kept.
    pub async fn refresh(&self) -> Result<RemoteStatus, SyncError> {
        let epoch = self.lock_state()?.begin_listing();
        let listing = self.remote.list().await;

        let local = match self.local.load() {
            Ok(local) => Some(local),
            Err(e) => {
                warn!(error = %e, "failed to reload local recipes, keeping cached copy");
                None
            }
        };

        let (status, changed) = {
            let mut state = self.lock_state()?;
            let previous = state.remote_status;
            match listing {
                Ok(recipes) => {
                    let count = recipes.len();
                    if state.apply_listing(epoch, recipes) {
                        debug!(count, "remote catalog refreshed");
                    } else {
                        debug!(epoch, "dropping stale remote listing");
                    }
                }
                Err(e) => {
                    if state.listing_failed(epoch) {
                        warn!(error = %e, "remote catalog unavailable, showing seed and local recipes");
                    }
                }
            }
            if let Some(local) = local {
                state.local = local;
            }
            (state.remote_status, previous != state.remote_status)
        };

        if changed {
            info!(status = ?status, "remote status changed");
            self.emit(CatalogEvent::RemoteStatusChanged { status });
        }
        self.emit(CatalogEvent::CatalogChanged);
        Ok(status)
    }

    // -- submit -------------------------------------------------------------

    /// Create a recipe. Tries the remote service first and falls back to the
    /// local store; either way the result becomes the current recipe.
    ///
    /// `guest_name` attributes the recipe when nobody is signed in.
    pub async fn submit(&self, draft: RecipeDraft, guest_name: Option<&str>) -> Result<Recipe, SyncError> {
        let draft = draft.normalized()?;
        let contributor = self
            .identity
            .current()
            .or_else(|| {
                guest_name
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(String::from)
            })
            .ok_or(ValidationError::MissingContributor)?;

        let payload = RecipePayload::new(contributor, draft);

        let recipe = match self.remote.create(&payload).await {
            Ok(recipe) => {
                let mut state = self.lock_state()?;
                state.insert_remote(recipe.clone());
                state.current = Some(recipe.id.clone());
                info!(id = %recipe.id, "recipe submitted to remote service");
                recipe
            }
            Err(e) => {
                let mut state = self.lock_state()?;
                let now = Utc::now();
                let id = state.next_local_id(now.timestamp_millis());
                let recipe = Recipe::from_draft(id, payload.contributor, payload.draft, now);
                self.local.upsert(recipe.clone())?;
                state.upsert_local(recipe.clone());
                state.current = Some(recipe.id.clone());
                info!(id = %recipe.id, error = %e, "remote create failed, recipe kept locally");
                recipe
            }
        };

        self.emit(CatalogEvent::CatalogChanged);
        Ok(recipe)
    }

    // -- update -------------------------------------------------------------

    /// Edit a recipe in whichever store owns its id. Remote failures are
    /// returned; there is no local fallback for remote ids.
    pub async fn update(&self, id: &RecipeId, draft: RecipeDraft) -> Result<Recipe, SyncError> {
        let draft = draft.normalized()?;

        let recipe = match id.origin() {
            RecipeOrigin::Seed => return Err(SyncError::ReadOnly(id.clone())),
            RecipeOrigin::Remote => {
                // Attribution is fixed at creation.
                let existing = {
                    let state = self.lock_state()?;
                    let contributor = state.find(id).map(|r| r.contributor.clone());
                    contributor
                };
                let contributor = existing
                    .or_else(|| self.identity.current())
                    .ok_or(ValidationError::MissingContributor)?;

                let payload = RecipePayload::new(contributor, draft);
                let recipe = self.remote.update(id, &payload).await.map_err(|e| {
                    warn!(id = %id, error = %e, "remote update failed");
                    e
                })?;

                self.lock_state()?.upsert_remote(recipe.clone());
                recipe
            }
            RecipeOrigin::Local => {
                let mut state = self.lock_state()?;
                let recipe = self
                    .local
                    .patch(id, draft)?
                    .ok_or_else(|| SyncError::NotFound(id.clone()))?;
                state.upsert_local(recipe.clone());
                recipe
            }
        };

        debug!(id = %id, "recipe updated");
        self.emit(CatalogEvent::CatalogChanged);
        Ok(recipe)
    }

    // -- delete -------------------------------------------------------------

    /// Optimistically remove a recipe from the catalog and favorites, then
    /// issue the remote delete in the background for remote ids.
    ///
    /// A failed remote delete is logged and reported through the returned
    /// handle and a [`CatalogEvent::DeleteFailed`] event; it is not rolled
    /// back.
    pub async fn delete(&self, id: &RecipeId) -> Result<PendingDelete, SyncError> {
        match id.origin() {
            RecipeOrigin::Seed => return Err(SyncError::ReadOnly(id.clone())),
            RecipeOrigin::Local => {
                let mut state = self.lock_state()?;
                if !self.local.remove(id)? && state.find(id).is_none() {
                    return Err(SyncError::NotFound(id.clone()));
                }
                state.remove(id);
                self.persist_favorite_removal(id);
            }
            RecipeOrigin::Remote => {
                self.lock_state()?.remove(id);
                self.persist_favorite_removal(id);
            }
        }

        info!(id = %id, "recipe deleted locally");
        self.emit(CatalogEvent::RecipeDeleted { id: id.clone() });
        self.emit(CatalogEvent::CatalogChanged);

        let task = id.is_remote().then(|| {
            let remote = self.remote.clone();
            let state = self.state.clone();
            let events = self.events.clone();
            let id = id.clone();
            tokio::spawn(async move {
                let result = remote.delete(&id).await;
                match state.lock() {
                    Ok(mut state) => state.settle_delete(&id),
                    Err(_) => warn!(id = %id, "catalog state lock poisoned, delete not settled"),
                }
                if let Err(ref e) = result {
                    warn!(id = %id, error = %e, "remote delete failed, local view stays deleted");
                    let _ = events.send(CatalogEvent::DeleteFailed {
                        id,
                        error: e.to_string(),
                    });
                }
                result
            })
        });

        Ok(PendingDelete {
            id: id.clone(),
            task,
        })
    }

    fn persist_favorite_removal(&self, id: &RecipeId) {
        if let Err(e) = self.favorites.remove(&id.to_string()) {
            warn!(id = %id, error = %e, "failed to persist favorite removal");
        }
    }

    // -- migration ----------------------------------------------------------

    /// Try to promote the signed-in user's local records to the remote
    /// service, one create at a time.
    ///
    /// Incomplete records are discarded. Records attributed to anyone else,
    /// guest names included, stay local. Failed creates leave the record in
    /// place for the next pass and are not surfaced as errors. Runs only
    /// when an identity resolves, and only one pass runs at a time.
    pub async fn run_migration(&self) -> Result<MigrationReport, SyncError> {
        let Some(owner) = self.identity.current() else {
            debug!("skipping migration, no identity");
            return Ok(MigrationReport::skipped(SkipReason::Anonymous));
        };
        let Some(_in_flight) = InFlight::acquire(&self.migrating) else {
            debug!("migration already in flight");
            return Ok(MigrationReport::skipped(SkipReason::AlreadyRunning));
        };

        let records = self.local.load()?;
        let mut report = MigrationReport::default();
        let mut corrupt = Vec::new();

        for record in records {
            let payload = match record.to_draft().normalized() {
                Ok(draft) if record.is_complete() => {
                    RecipePayload::new(record.contributor.clone(), draft)
                }
                _ => {
                    debug!(id = %record.id, "discarding incomplete local recipe");
                    corrupt.push(record.id);
                    continue;
                }
            };
            if record.contributor != owner {
                debug!(id = %record.id, "local recipe belongs to someone else, leaving it local");
                report.not_owned += 1;
                continue;
            }

            match self.remote.create(&payload).await {
                Ok(created) => {
                    if self.promote(&record.id, created.clone())? {
                        report.promoted.push((record.id, created.id));
                    }
                }
                Err(e) => {
                    debug!(id = %record.id, error = %e, "migration create failed, will retry");
                    report.failed += 1;
                }
            }
        }

        if !corrupt.is_empty() {
            report.discarded = self.local.remove_many(&corrupt)?;
            self.lock_state()?.local.retain(|r| !corrupt.contains(&r.id));
        }

        if !report.is_noop() {
            info!(
                promoted = report.promoted.len(),
                discarded = report.discarded,
                failed = report.failed,
                "migration pass finished"
            );
            self.emit(CatalogEvent::CatalogChanged);
        }

        // A create just succeeded, so the service is reachable; list it so
        // the catalog switches from the seeds to the real remote set.
        if !report.promoted.is_empty() && self.remote_status()? == RemoteStatus::Unavailable {
            self.refresh().await?;
        }
        Ok(report)
    }

    /// Swap a local record for its freshly created remote copy. Returns
    /// `false` when the local record was deleted while the create was in
    /// flight; the orphaned remote copy is then deleted in the background.
    fn promote(&self, local_id: &RecipeId, created: Recipe) -> Result<bool, SyncError> {
        let mut state = self.lock_state()?;

        if state.find(local_id).is_none() {
            drop(state);
            info!(local_id = %local_id, remote_id = %created.id, "local recipe deleted during migration, removing remote copy");
            let remote = self.remote.clone();
            tokio::spawn(async move {
                if let Err(e) = remote.delete(&created.id).await {
                    warn!(id = %created.id, error = %e, "failed to remove orphaned remote recipe");
                }
            });
            return Ok(false);
        }

        self.local.remove(local_id)?;
        state.local.retain(|r| &r.id != local_id);
        state.retarget(local_id, &created.id);
        let remote_id = created.id.clone();
        if !state.insert_remote(created) {
            debug!(id = %remote_id, "promoted recipe already present in remote set");
        }
        let favorites = state.favorites.clone();
        drop(state);

        if let Err(e) = self.favorites.save(&favorites) {
            warn!(error = %e, "failed to persist favorites after migration");
        }

        info!(local_id = %local_id, remote_id = %remote_id, "local recipe migrated");
        self.emit(CatalogEvent::RecipeMigrated {
            local_id: local_id.clone(),
            remote_id,
        });
        Ok(true)
    }

    // -- favorites & selection ----------------------------------------------

    /// Flip favorite membership. Returns `true` if `id` is now a favorite.
    pub fn toggle_favorite(&self, id: &RecipeId) -> Result<bool, SyncError> {
        let mut state = self.lock_state()?;
        let now_favorite = self.favorites.toggle(&id.to_string())?;
        if now_favorite {
            state.favorites.insert(id.to_string());
        } else {
            state.favorites.remove(&id.to_string());
        }
        Ok(now_favorite)
    }

    /// Pick a random recipe matching `facets` and make it current. `None`
    /// means nothing matches, which callers show as an empty state.
    pub fn pick(&self, facets: &Facets) -> Result<Option<Recipe>, SyncError> {
        self.pick_with(facets, &mut rand::thread_rng())
    }

    pub fn pick_with<R: rand::Rng + ?Sized>(
        &self,
        facets: &Facets,
        rng: &mut R,
    ) -> Result<Option<Recipe>, SyncError> {
        let mut state = self.lock_state()?;
        let candidates = selection::filter(&state.visible(), facets, &state.favorites);
        let picked = selection::pick_random(&candidates, rng).cloned();
        if let Some(ref recipe) = picked {
            state.current = Some(recipe.id.clone());
        }
        Ok(picked)
    }

    /// Make `id` the current recipe if it is in the catalog.
    pub fn select(&self, id: &RecipeId) -> Result<Option<Recipe>, SyncError> {
        let mut state = self.lock_state()?;
        let Some(found) = state.visible().into_iter().find(|r| &r.id == id) else {
            return Ok(None);
        };
        state.current = Some(found.id.clone());
        Ok(Some(found))
    }

    // -- helpers ------------------------------------------------------------

    fn emit(&self, event: CatalogEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, CatalogState>, SyncError> {
        self.state.lock().map_err(|_| SyncError::LockPoisoned)
    }
}
