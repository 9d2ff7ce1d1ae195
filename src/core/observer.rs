// Builds the observed snapshot for one refresh
//
// Finder buckets come first, then every installed app that has a recent
// documents list, in list order. Ids are unique in the result.

use crate::core::indexer::AppIndexer;
use crate::db::ItemRecord;
use crate::error::Result;
use crate::inspect::SystemInspector;
use std::collections::HashSet;

pub const FINDER_NAME: &str = "Finder.app";
pub const FINDER_PATH: &str = "/System/Library/CoreServices/Finder.app";

/// Finder-level lists that become buckets: (list file stem, title)
pub const FINDER_BUCKETS: &[(&str, &str)] = &[
    ("com.apple.LSSharedFileList.RecentApplications", "最近的应用"),
    ("com.apple.LSSharedFileList.RecentDocuments", "最近的文稿"),
];

/// Observe the current state of the machine
///
/// Fails only if the installed apps or the recent lists can't be listed at
/// all. Apps without a recent list and lists without an installed app are
/// left out.
pub async fn observe<I: SystemInspector>(inspector: &I) -> Result<Vec<ItemRecord>> {
    let raw_apps = inspector.installed_apps().await?;
    let mut apps = AppIndexer::index(&raw_apps);

    let mut items = Vec::new();
    for (stem, title) in FINDER_BUCKETS {
        if let Some(file_name) = inspector.finder_list(stem).await {
            items.push(ItemRecord::bucket(file_name, *title, FINDER_NAME, FINDER_PATH));
        }
    }

    let mut seen: HashSet<String> = HashSet::new();
    for list_id in inspector.recent_list_ids().await? {
        let id = list_id.to_lowercase();
        if !seen.insert(id.clone()) {
            continue;
        }
        match apps.remove(&id) {
            Some(app) => items.push(app),
            None => tracing::debug!(%id, "recent list without installed app"),
        }
    }

    tracing::debug!(items = items.len(), "observed recent items");
    Ok(items)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::indexer::RawApp;
    use crate::error::RecentsError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Scripted stand-in for the OS
    #[derive(Default)]
    pub struct FakeInspector {
        pub apps: Mutex<Option<Vec<RawApp>>>,
        pub list_ids: Mutex<Vec<String>>,
        pub finder_lists: Mutex<Vec<String>>,
        pub documents: Mutex<HashMap<String, Vec<String>>>,
    }

    impl FakeInspector {
        pub fn with_apps(apps: &[(&str, &str)]) -> Self {
            let raw = apps
                .iter()
                .map(|(path, id)| RawApp {
                    path: path.to_string(),
                    bundle_id: Some(id.to_string()),
                    display_name: None,
                })
                .collect();
            let inspector = Self::default();
            *inspector.apps.lock().unwrap() = Some(raw);
            inspector
        }

        pub fn set_list_ids(&self, ids: &[&str]) {
            *self.list_ids.lock().unwrap() = ids.iter().map(|s| s.to_string()).collect();
        }

        pub fn set_finder_lists(&self, files: &[&str]) {
            *self.finder_lists.lock().unwrap() = files.iter().map(|s| s.to_string()).collect();
        }

        pub fn fail_listing(&self) {
            *self.apps.lock().unwrap() = None;
        }
    }

    impl SystemInspector for FakeInspector {
        async fn installed_apps(&self) -> Result<Vec<RawApp>> {
            self.apps
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| RecentsError::Inspection("mdfind exited with 1".to_string()))
        }

        async fn recent_list_ids(&self) -> Result<Vec<String>> {
            Ok(self.list_ids.lock().unwrap().clone())
        }

        async fn finder_list(&self, stem: &str) -> Option<String> {
            self.finder_lists
                .lock()
                .unwrap()
                .iter()
                .find(|file| file.starts_with(&format!("{}.", stem)))
                .cloned()
        }

        async fn recent_documents(&self, item: &ItemRecord) -> Vec<String> {
            self.documents
                .lock()
                .unwrap()
                .get(&item.id)
                .cloned()
                .unwrap_or_default()
        }
    }

    #[tokio::test]
    async fn test_observe_orders_buckets_first() {
        let inspector = FakeInspector::with_apps(&[
            ("/Applications/Safari.app", "com.apple.Safari"),
            ("/Applications/Notes.app", "com.apple.Notes"),
        ]);
        inspector.set_list_ids(&["com.apple.Safari"]);
        inspector.set_finder_lists(&["com.apple.LSSharedFileList.RecentDocuments.sfl2"]);

        let items = observe(&inspector).await.unwrap();

        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["com.apple.LSSharedFileList.RecentDocuments.sfl2", "com.apple.safari"]
        );
        assert!(items[0].is_bucket);
        assert_eq!(items[0].title, "最近的文稿");
        assert_eq!(items[0].name, FINDER_NAME);
    }

    #[tokio::test]
    async fn test_observe_dedupes_lists() {
        let inspector =
            FakeInspector::with_apps(&[("/Applications/Safari.app", "com.apple.Safari")]);
        // Same app listed under two suffixes and two spellings
        inspector.set_list_ids(&["com.apple.Safari", "com.apple.safari", "org.gone"]);

        let items = observe(&inspector).await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "com.apple.safari");
    }

    #[tokio::test]
    async fn test_observe_listing_failure() {
        let inspector = FakeInspector::default();
        inspector.fail_listing();

        let result = observe(&inspector).await;
        assert!(matches!(result, Err(RecentsError::Inspection(_))));
    }
}
