//! In-memory [`RecipeService`] double for unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use smoothie_net::{RecipeService, RemoteError};
use smoothie_shared::{Recipe, RecipeId, RecipePayload};
use smoothie_store::MemoryKv;

use crate::engine::SyncEngine;
use crate::identity::{AuthSession, SessionHandle};

pub const BASE_TS: i64 = 1_700_000_000_000;

#[derive(Default)]
pub struct MockRecipeService {
    pub recipes: Mutex<Vec<Recipe>>,
    pub fail_list: AtomicBool,
    pub fail_create: AtomicBool,
    pub fail_update: AtomicBool,
    pub fail_delete: AtomicBool,
    pub creates: AtomicUsize,
    /// How many times `list` yields after taking its snapshot, so other
    /// commands can finish while the listing is in flight.
    pub list_yields: AtomicUsize,
    pub deletes: Mutex<Vec<RecipeId>>,
}

impl MockRecipeService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_online(&self, online: bool) {
        self.fail_list.store(!online, Ordering::SeqCst);
        self.fail_create.store(!online, Ordering::SeqCst);
        self.fail_update.store(!online, Ordering::SeqCst);
        self.fail_delete.store(!online, Ordering::SeqCst);
    }

    pub fn stored(&self) -> Vec<Recipe> {
        self.recipes.lock().unwrap().clone()
    }

    fn offline() -> RemoteError {
        RemoteError::Unreachable("connection refused".into())
    }
}

#[async_trait]
impl RecipeService for MockRecipeService {
    async fn list(&self) -> Result<Vec<Recipe>, RemoteError> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(Self::offline());
        }
        let snapshot = self.stored();
        for _ in 0..self.list_yields.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
        Ok(snapshot)
    }

    async fn create(&self, payload: &RecipePayload) -> Result<Recipe, RemoteError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(Self::offline());
        }
        payload
            .validate()
            .map_err(|e| RemoteError::Validation(e.to_string()))?;

        let n = self.creates.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        let id = RecipeId::remote(BASE_TS + n, format!("xy{n}"));
        let recipe = Recipe::from_draft(id, payload.contributor.clone(), payload.draft.clone(), Utc::now());
        self.recipes.lock().unwrap().push(recipe.clone());

        // Give concurrently running commands a chance to interleave.
        tokio::task::yield_now().await;
        Ok(recipe)
    }

    async fn update(&self, id: &RecipeId, payload: &RecipePayload) -> Result<Recipe, RemoteError> {
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(Self::offline());
        }
        let mut recipes = self.recipes.lock().unwrap();
        let recipe = recipes
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| RemoteError::NotFound(id.to_string()))?;
        recipe.apply_draft(payload.draft.clone());
        Ok(recipe.clone())
    }

    async fn delete(&self, id: &RecipeId) -> Result<(), RemoteError> {
        self.deletes.lock().unwrap().push(id.clone());
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(Self::offline());
        }
        self.recipes.lock().unwrap().retain(|r| &r.id != id);
        Ok(())
    }
}

pub struct Harness {
    pub remote: Arc<MockRecipeService>,
    pub kv: Arc<MemoryKv>,
    pub session: Arc<SessionHandle>,
    pub engine: Arc<SyncEngine>,
}

pub fn harness() -> Harness {
    harness_with(Arc::new(MemoryKv::new()))
}

pub fn harness_with(kv: Arc<MemoryKv>) -> Harness {
    let remote = MockRecipeService::new();
    let session = Arc::new(SessionHandle::new());
    let engine = Arc::new(SyncEngine::new(remote.clone(), kv.clone(), session.clone()).unwrap());
    Harness {
        remote,
        kv,
        session,
        engine,
    }
}

impl Harness {
    pub fn sign_in(&self, email: &str) {
        self.session.sign_in(AuthSession::with_email(email));
    }
}
