/// Command registry integration
///
/// The registry is owned by the host: it holds the quick-launch commands users
/// can type. This tool only ever touches codes under its own prefix.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryRegistry;
pub use sqlite::SqliteRegistry;

use crate::db::RegisteredCommand;
use crate::error::Result;

/// Where quick-launch commands get registered
///
/// Both operations must be idempotent: upserting the same code twice leaves
/// one command, removing an unknown code succeeds.
#[allow(async_fn_in_trait)]
pub trait CommandRegistry {
    async fn upsert(&self, command: RegisteredCommand) -> Result<()>;

    async fn remove(&self, code: &str) -> Result<()>;
}
