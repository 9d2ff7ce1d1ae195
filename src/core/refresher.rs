// One refresh cycle: observe, reconcile, synchronize, persist
//
// Cycles never overlap. A run-lock serializes them so two callers can't race
// on the snapshot or double-issue registry calls.

use crate::core::invocation::feature_code;
use crate::core::observer::observe;
use crate::core::reconciler::reconcile;
use crate::core::synchronizer::{CommandSynchronizer, SyncReport};
use crate::db::{Database, ItemRecord};
use crate::error::{RecentsError, Result};
use crate::inspect::SystemInspector;
use crate::registry::CommandRegistry;
use std::sync::Arc;
use tokio::sync::Mutex;

/// What a refresh changed, as far as the user cares
#[derive(Debug, Clone, Default)]
pub struct RefreshOutcome {
    pub added: Vec<ItemRecord>,
    pub removed: Vec<ItemRecord>,
    pub sync: SyncReport,
}

pub struct Refresher<I, R> {
    db: Arc<Database>,
    inspector: I,
    synchronizer: CommandSynchronizer<R>,
    run_lock: Mutex<()>,
}

impl<I: SystemInspector, R: CommandRegistry> Refresher<I, R> {
    pub fn new(db: Arc<Database>, inspector: I, registry: R) -> Self {
        Self {
            db,
            inspector,
            synchronizer: CommandSynchronizer::new(registry),
            run_lock: Mutex::new(()),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn inspector(&self) -> &I {
        &self.inspector
    }

    pub fn registry(&self) -> &R {
        self.synchronizer.registry()
    }

    /// Run a full cycle and report what was added and removed
    ///
    /// If the machine can't be inspected nothing is touched. Registry failures
    /// are logged and the snapshot is still saved.
    pub async fn refresh_apps(&self) -> Result<RefreshOutcome> {
        let _guard = self.run_lock.lock().await;

        let previous = self.db.load_snapshot().await?;
        let observed = observe(&self.inspector).await?;

        let reconciliation = reconcile(&previous, observed);

        // Removed items, buckets that moved to a new key, and disabled items
        // all have to leave the registry
        let mut retire = reconciliation.removed_ids();
        retire.extend(reconciliation.migrated.iter().map(|(old, _)| old.clone()));
        retire.extend(
            reconciliation
                .merged
                .iter()
                .filter(|item| !item.enabled)
                .map(|item| item.id.clone()),
        );

        let sync = self.synchronizer.sync(&retire, &reconciliation.merged).await;
        if !sync.is_clean() {
            tracing::warn!(
                failed = sync.failures.len(),
                "some commands could not be updated, they will be retried next refresh"
            );
        }

        self.db.save_snapshot(&reconciliation.merged).await?;

        tracing::info!(
            items = reconciliation.merged.len(),
            added = reconciliation.added.len(),
            removed = reconciliation.removed.len(),
            "refresh complete"
        );

        Ok(RefreshOutcome {
            added: reconciliation.added,
            removed: reconciliation.removed,
            sync,
        })
    }

    /// Turn one item's command on or off
    ///
    /// The flag is saved first; the registry follows right away.
    pub async fn set_enabled(&self, id: &str, enabled: bool) -> Result<ItemRecord> {
        let _guard = self.run_lock.lock().await;

        if !self.db.set_item_enabled(id, enabled).await? {
            return Err(RecentsError::ItemNotFound(id.to_string()));
        }
        let item = self
            .db
            .get_item(id)
            .await?
            .ok_or_else(|| RecentsError::ItemNotFound(id.to_string()))?;

        let report = if enabled {
            self.synchronizer.sync(&[], std::slice::from_ref(&item)).await
        } else {
            self.synchronizer.sync(&[item.id.clone()], &[]).await
        };

        if let Some(failure) = report.failures.into_iter().next() {
            return Err(RecentsError::Registry(format!(
                "{}: {}",
                failure.code, failure.error
            )));
        }

        tracing::info!(%id, enabled, code = %feature_code(id), "item toggled");
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::observer::tests::FakeInspector;
    use crate::db::RegisteredCommand;
    use crate::registry::MemoryRegistry;

    const DOCS_SFL2: &str = "com.apple.LSSharedFileList.RecentDocuments.sfl2";
    const DOCS_SFL3: &str = "com.apple.LSSharedFileList.RecentDocuments.sfl3";

    async fn setup() -> Refresher<FakeInspector, MemoryRegistry> {
        let db = Arc::new(Database::new_test().await.unwrap());
        let inspector = FakeInspector::with_apps(&[
            ("/Applications/Safari.app", "com.apple.Safari"),
            ("/Applications/TextEdit.app", "com.apple.TextEdit"),
            ("/Applications/Notes.app", "com.apple.Notes"),
        ]);
        inspector.set_list_ids(&["com.apple.Safari", "com.apple.TextEdit"]);
        inspector.set_finder_lists(&[DOCS_SFL2]);

        Refresher::new(db, inspector, MemoryRegistry::new())
    }

    // Registry that refuses every call
    struct RejectingRegistry;

    impl CommandRegistry for RejectingRegistry {
        async fn upsert(&self, _command: RegisteredCommand) -> Result<()> {
            Err(RecentsError::Registry("registry offline".to_string()))
        }

        async fn remove(&self, _code: &str) -> Result<()> {
            Err(RecentsError::Registry("registry offline".to_string()))
        }
    }

    fn codes(commands: &[RegisteredCommand]) -> Vec<&str> {
        commands.iter().map(|c| c.code.as_str()).collect()
    }

    #[tokio::test]
    async fn test_first_refresh() {
        let refresher = setup().await;

        let outcome = refresher.refresh_apps().await.unwrap();

        // The bucket is registered but never announced as added
        let added: Vec<&str> = outcome.added.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(added, vec!["com.apple.safari", "com.apple.textedit"]);
        assert!(outcome.removed.is_empty());
        assert_eq!(refresher.registry().len(), 3);
        assert_eq!(refresher.db.load_snapshot().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_second_refresh_is_quiet() {
        let refresher = setup().await;
        refresher.refresh_apps().await.unwrap();
        let before = refresher.registry().commands();

        let outcome = refresher.refresh_apps().await.unwrap();

        assert!(outcome.added.is_empty());
        assert!(outcome.removed.is_empty());
        assert_eq!(refresher.registry().commands(), before);
    }

    #[tokio::test]
    async fn test_removed_app_loses_command() {
        let refresher = setup().await;
        refresher.refresh_apps().await.unwrap();

        refresher.inspector().set_list_ids(&["com.apple.Safari"]);
        let outcome = refresher.refresh_apps().await.unwrap();

        assert_eq!(outcome.removed.len(), 1);
        assert_eq!(outcome.removed[0].id, "com.apple.textedit");
        assert!(refresher.registry().get("recents-com.apple.textedit").is_none());
    }

    #[tokio::test]
    async fn test_disabled_survives_refresh() {
        let refresher = setup().await;
        refresher.refresh_apps().await.unwrap();

        refresher.set_enabled("com.apple.safari", false).await.unwrap();
        assert!(refresher.registry().get("recents-com.apple.safari").is_none());

        refresher.refresh_apps().await.unwrap();

        let item = refresher.db.get_item("com.apple.safari").await.unwrap().unwrap();
        assert!(!item.enabled);
        assert!(refresher.registry().get("recents-com.apple.safari").is_none());
    }

    #[tokio::test]
    async fn test_enable_registers_again() {
        let refresher = setup().await;
        refresher.refresh_apps().await.unwrap();
        refresher.set_enabled("com.apple.safari", false).await.unwrap();

        let item = refresher.set_enabled("com.apple.safari", true).await.unwrap();

        assert!(item.enabled);
        assert!(refresher.registry().get("recents-com.apple.safari").is_some());
    }

    #[tokio::test]
    async fn test_set_enabled_unknown() {
        let refresher = setup().await;

        let result = refresher.set_enabled("com.nothing", false).await;
        assert!(matches!(result, Err(RecentsError::ItemNotFound(_))));
    }

    #[tokio::test]
    async fn test_bucket_migration_keeps_flag_and_retires_old_command() {
        let refresher = setup().await;
        refresher.refresh_apps().await.unwrap();
        refresher.set_enabled(DOCS_SFL2, false).await.unwrap();
        refresher.set_enabled(DOCS_SFL2, true).await.unwrap();
        assert!(refresher.registry().get(&feature_code(DOCS_SFL2)).is_some());

        // OS upgrade: the list now ships with a newer suffix
        refresher.inspector().set_finder_lists(&[DOCS_SFL3]);
        let outcome = refresher.refresh_apps().await.unwrap();

        assert!(outcome.removed.is_empty());
        assert!(outcome.added.is_empty());
        let registered = refresher.registry().commands();
        assert!(codes(&registered).contains(&feature_code(DOCS_SFL3).as_str()));
        assert!(!codes(&registered).contains(&feature_code(DOCS_SFL2).as_str()));
    }

    #[tokio::test]
    async fn test_migrated_bucket_stays_disabled() {
        let refresher = setup().await;
        refresher.refresh_apps().await.unwrap();
        refresher.set_enabled(DOCS_SFL2, false).await.unwrap();

        refresher.inspector().set_finder_lists(&[DOCS_SFL3]);
        refresher.refresh_apps().await.unwrap();

        let bucket = refresher.db.get_item(DOCS_SFL3).await.unwrap().unwrap();
        assert!(!bucket.enabled);
        assert!(refresher.registry().get(&feature_code(DOCS_SFL3)).is_none());
    }

    #[tokio::test]
    async fn test_inspection_failure_commits_nothing() {
        let refresher = setup().await;
        refresher.refresh_apps().await.unwrap();
        let snapshot = refresher.db.load_snapshot().await.unwrap();
        let commands = refresher.registry().commands();

        refresher.inspector().fail_listing();
        let result = refresher.refresh_apps().await;

        assert!(matches!(result, Err(RecentsError::Inspection(_))));
        assert_eq!(refresher.db.load_snapshot().await.unwrap(), snapshot);
        assert_eq!(refresher.registry().commands(), commands);
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_serialize() {
        let refresher = setup().await;

        let (a, b) = tokio::join!(refresher.refresh_apps(), refresher.refresh_apps());

        // Exactly one of them saw the items as new
        let added = a.unwrap().added.len() + b.unwrap().added.len();
        assert_eq!(added, 2);
        assert_eq!(refresher.registry().len(), 3);
    }

    #[tokio::test]
    async fn test_registry_failure_still_saves_snapshot() {
        let db = Arc::new(Database::new_test().await.unwrap());
        let inspector =
            FakeInspector::with_apps(&[("/Applications/Safari.app", "com.apple.Safari")]);
        inspector.set_list_ids(&["com.apple.Safari"]);
        let refresher = Refresher::new(Arc::clone(&db), inspector, RejectingRegistry);

        let outcome = refresher.refresh_apps().await.unwrap();

        assert!(!outcome.sync.is_clean());
        assert_eq!(outcome.sync.failures.len(), 1);
        assert_eq!(outcome.sync.failures[0].code, "recents-com.apple.safari");
        assert_eq!(outcome.added.len(), 1);

        // The decided delta is committed even though no command went through
        let saved = db.load_snapshot().await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, "com.apple.safari");
    }
}
