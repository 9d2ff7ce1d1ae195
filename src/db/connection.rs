/// Database connection management with connection pooling
///
/// Provides a thread-safe connection pool to SQLite database.

use crate::error::{RecentsError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Maximum number of database connections in the pool
const MAX_CONNECTIONS: u32 = 5;

/// Bumped whenever `database/schema.sql` changes shape
pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = include_str!("../../database/schema.sql");

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
}

impl Database {
    /// Create a new database instance
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    ///
    /// # Returns
    /// * `Ok(Database)` - Successfully created database instance
    /// * `Err(RecentsError)` - If connection fails
    ///
    /// # Examples
    /// ```no_run
    /// use recents_lib::db::Database;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let db = Database::new("/tmp/recents/recents.db").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
            .create_if_missing(true)
            .disable_statement_logging();

        let db = Self::open(options, MAX_CONNECTIONS, db_path).await?;
        tracing::debug!(path = %db.db_path.display(), "database opened");

        Ok(db)
    }

    /// Create a test database in memory
    ///
    /// A single connection, since every `:memory:` connection is its own database.
    #[cfg(test)]
    pub async fn new_test() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        Self::open(options, 1, PathBuf::from(":memory:")).await
    }

    async fn open(
        options: SqliteConnectOptions,
        max_connections: u32,
        db_path: PathBuf,
    ) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let db = Self {
            pool: Arc::new(pool),
            db_path,
        };
        db.initialize_schema().await?;

        Ok(db)
    }

    /// Bring the schema up to `SCHEMA_VERSION`
    ///
    /// The statements are idempotent and run in one transaction together with
    /// the version bump. A database written by a newer build is refused rather
    /// than silently downgraded.
    async fn initialize_schema(&self) -> Result<()> {
        let found = self.schema_version().await?;
        if found > SCHEMA_VERSION {
            return Err(RecentsError::Config(format!(
                "{} uses schema v{}, this build only knows v{}",
                self.db_path.display(),
                found,
                SCHEMA_VERSION
            )));
        }

        let mut tx = self.pool.begin().await?;
        for statement in schema_statements(SCHEMA) {
            sqlx::query(&statement).execute(&mut *tx).await?;
        }
        // PRAGMA values can't be bound
        sqlx::query(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        if found != SCHEMA_VERSION {
            tracing::debug!(from = found, to = SCHEMA_VERSION, "schema upgraded");
        }

        Ok(())
    }

    /// Schema version recorded in the database file, 0 if never initialized
    pub async fn schema_version(&self) -> Result<i64> {
        let version: (i64,) = sqlx::query_as("PRAGMA user_version")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(version.0)
    }

    /// Get reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Close all connections in the pool
    ///
    /// Should be called on application shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Get database statistics
    pub async fn stats(&self) -> Result<DatabaseStats> {
        let item_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM items")
            .fetch_one(self.pool.as_ref())
            .await?;

        let disabled_count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM items WHERE enabled = 0")
                .fetch_one(self.pool.as_ref())
                .await?;

        let command_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM registered_commands")
            .fetch_one(self.pool.as_ref())
            .await?;

        let last_saved: Option<(String,)> =
            sqlx::query_as("SELECT saved_at FROM snapshot_meta WHERE key = 1")
                .fetch_optional(self.pool.as_ref())
                .await?;

        Ok(DatabaseStats {
            total_items: item_count.0,
            disabled_items: disabled_count.0,
            registered_commands: command_count.0,
            last_saved_at: last_saved.map(|row| row.0),
        })
    }
}

/// Split the schema file into executable statements
///
/// SQLite runs one statement per call. Line comments are dropped first so a
/// chunk made only of comments doesn't become an empty query.
fn schema_statements(schema: &str) -> Vec<String> {
    schema
        .split(';')
        .map(|chunk| {
            chunk
                .lines()
                .map(|line| match line.find("--") {
                    Some(idx) => &line[..idx],
                    None => line,
                })
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        })
        .filter(|statement| !statement.is_empty())
        .collect()
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub total_items: i64,
    pub disabled_items: i64,
    pub registered_commands: i64,
    pub last_saved_at: Option<String>,
}
