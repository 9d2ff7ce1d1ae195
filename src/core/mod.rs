/// Core functionality modules
///
/// Indexing installed apps, reconciling snapshots, keeping the command
/// registry in sync, and the refresh cycle tying them together.

pub mod indexer;
pub mod invocation;
pub mod observer;
pub mod reconciler;
pub mod refresher;
pub mod searcher;
pub mod synchronizer;

pub use indexer::{AppIndexer, RawApp};
pub use invocation::Invocation;
pub use reconciler::{reconcile, Reconciliation};
pub use refresher::{RefreshOutcome, Refresher};
pub use searcher::{RecentDocument, Searcher};
pub use synchronizer::{CommandSynchronizer, SyncReport};
