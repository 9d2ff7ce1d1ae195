/// Database module for recents
///
/// Persists the last committed snapshot of tracked items using SQLite and sqlx.
/// The same database also backs the standalone command registry.

pub mod connection;
pub mod models;
pub mod queries;

pub use connection::Database;
pub use models::*;
