/// The OS inspection boundary

use crate::core::indexer::RawApp;
use crate::db::ItemRecord;
use crate::error::Result;

#[allow(async_fn_in_trait)]
pub trait SystemInspector {
    /// Every installed application
    ///
    /// Failing here fails the whole refresh.
    async fn installed_apps(&self) -> Result<Vec<RawApp>>;

    /// Bundle ids that have a recent-documents list, as the list files name them
    async fn recent_list_ids(&self) -> Result<Vec<String>>;

    /// File name of the Finder list `stem`, with whichever suffix is on disk
    ///
    /// `None` when the list doesn't exist in any known format.
    async fn finder_list(&self, stem: &str) -> Option<String>;

    /// Recent document paths of one tracked item, most recent first
    ///
    /// Unreadable lists or entries are skipped, never reported.
    async fn recent_documents(&self, item: &ItemRecord) -> Vec<String>;
}
