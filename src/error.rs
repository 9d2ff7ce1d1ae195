/// Error types for recents
///
/// This module defines all possible errors that can occur in the application.
/// Uses thiserror for ergonomic error handling.

use thiserror::Error;

/// Main error type for recents operations
#[derive(Error, Debug)]
pub enum RecentsError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O errors (file operations, spawning processes, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The OS could not be inspected (app listing, recent lists)
    #[error("Inspection failed: {0}")]
    Inspection(String),

    /// Command registry rejected an operation
    #[error("Registry error: {0}")]
    Registry(String),

    /// No tracked item with this id
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for recents operations
pub type Result<T> = std::result::Result<T, RecentsError>;

/// Convert RecentsError to a user-friendly error message
impl RecentsError {
    pub fn user_message(&self) -> String {
        match self {
            RecentsError::Database(e) => {
                format!("Database error occurred. Please try again. Details: {}", e)
            }
            RecentsError::Io(e) => {
                format!("File system error. Check permissions. Details: {}", e)
            }
            RecentsError::Serialization(e) => {
                format!("Data format error: {}", e)
            }
            RecentsError::Inspection(msg) => {
                format!("Could not read installed apps or recent lists: {}", msg)
            }
            RecentsError::Registry(msg) => {
                format!("Command registry refused the update: {}", msg)
            }
            RecentsError::ItemNotFound(id) => {
                format!("'{}' is not a tracked item. Run 'recents refresh' first.", id)
            }
            RecentsError::Config(msg) => {
                format!("Configuration issue: {}", msg)
            }
            RecentsError::Generic(msg) => msg.clone(),
        }
    }
}
