//! Periodic migration driver.
//!
//! A scheduler belongs to one signed-in identity. It waits a short delay,
//! then runs a migration pass on a fixed interval until it is stopped,
//! dropped, or the identity changes (sign-out or switching user).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::engine::SyncEngine;

pub struct MigrationScheduler {
    owner: String,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl MigrationScheduler {
    /// Start the periodic pass for whoever is signed in now. Returns `None`
    /// when nobody is.
    pub fn start(engine: Arc<SyncEngine>, delay: Duration, interval: Duration) -> Option<Self> {
        let owner = engine.identity()?;
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let task_owner = owner.clone();
        let task = tokio::spawn(async move {
            tokio::select! {
                _ = time::sleep(delay) => {}
                _ = &mut shutdown_rx => return,
            }

            let mut ticker = time::interval_at(Instant::now(), interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = &mut shutdown_rx => break,
                }

                if engine.identity().as_deref() != Some(task_owner.as_str()) {
                    info!(owner = %task_owner, "identity changed, stopping migration scheduler");
                    break;
                }

                match engine.run_migration().await {
                    Ok(report) => debug!(
                        promoted = report.promoted.len(),
                        failed = report.failed,
                        not_owned = report.not_owned,
                        skipped = ?report.skipped,
                        "scheduled migration pass"
                    ),
                    Err(e) => warn!(error = %e, "scheduled migration pass failed"),
                }
            }
        });

        info!(owner = %owner, interval_secs = interval.as_secs(), "migration scheduler started");
        Some(Self {
            owner,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }

    /// The identity this scheduler was started for.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Stop the loop and wait for any pass in progress to finish.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for MigrationScheduler {
    fn drop(&mut self) {
        // A dropped sender resolves the receiver, which ends the loop.
        self.shutdown.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{harness, harness_with, BASE_TS};
    use chrono::Utc;
    use smoothie_shared::{Recipe, RecipeDraft, RecipeId};
    use smoothie_store::{LocalFallbackStore, MemoryKv};

    const DELAY: Duration = Duration::from_millis(10);
    const INTERVAL: Duration = Duration::from_millis(20);

    #[tokio::test]
    async fn anonymous_sessions_get_no_scheduler() {
        let h = harness();
        assert!(MigrationScheduler::start(h.engine.clone(), DELAY, INTERVAL).is_none());
    }

    #[tokio::test]
    async fn promotes_in_the_background() {
        let kv = Arc::new(MemoryKv::new());
        let recipe = Recipe::from_draft(
            RecipeId::Local(BASE_TS),
            "alice@example.com",
            RecipeDraft {
                name: "Kiwi Cooler".into(),
                ingredients: vec!["kiwi".into()],
                instructions: "Blend.".into(),
                ..RecipeDraft::default()
            },
            Utc::now(),
        );
        LocalFallbackStore::new(kv.clone()).save(&[recipe]).unwrap();
        let h = harness_with(kv.clone());
        h.sign_in("alice@example.com");

        let scheduler = MigrationScheduler::start(h.engine.clone(), DELAY, INTERVAL).unwrap();
        assert_eq!(scheduler.owner(), "alice@example.com");
        time::sleep(Duration::from_millis(150)).await;

        assert_eq!(h.remote.stored().len(), 1);
        assert!(LocalFallbackStore::new(kv).load().unwrap().is_empty());
        scheduler.stop().await;
    }

    #[tokio::test]
    async fn stops_when_identity_changes() {
        let h = harness();
        h.sign_in("alice@example.com");
        let scheduler = MigrationScheduler::start(h.engine.clone(), DELAY, INTERVAL).unwrap();

        h.sign_in("bob@example.com");
        time::sleep(Duration::from_millis(150)).await;
        assert!(scheduler.is_finished());
    }

    #[tokio::test]
    async fn stop_ends_the_task_during_the_delay() {
        let h = harness();
        h.sign_in("alice@example.com");
        let scheduler =
            MigrationScheduler::start(h.engine.clone(), Duration::from_secs(60), INTERVAL).unwrap();
        tokio::time::timeout(Duration::from_secs(1), scheduler.stop())
            .await
            .unwrap();
    }
}
