/// recents library
///
/// Tracks the apps and documents macOS remembers as recently used and keeps
/// one quick-launch command per item in a command registry.

pub mod config;
pub mod core;
pub mod db;
pub mod error;
pub mod inspect;
pub mod registry;

// Re-exports for convenience
pub use config::Config;
pub use db::Database;
pub use error::{RecentsError, Result};
