/// SQL query functions for database operations
///
/// The snapshot half is the persisted snapshot store: `load_snapshot` returns
/// the last committed collection and `save_snapshot` replaces it atomically.

use crate::db::models::*;
use crate::db::Database;
use crate::error::Result;
use chrono::Utc;

impl Database {
    /// Load the last committed snapshot, in the order it was saved
    ///
    /// Returns an empty list if nothing was ever saved.
    pub async fn load_snapshot(&self) -> Result<Vec<ItemRecord>> {
        let items = sqlx::query_as::<_, ItemRecord>(
            "SELECT id, title, name, path, is_bucket, enabled FROM items ORDER BY position ASC",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(items)
    }

    /// Replace the committed snapshot
    ///
    /// Runs in one transaction, so a concurrent `load_snapshot` sees either the
    /// old collection or the new one, never a mix.
    pub async fn save_snapshot(&self, snapshot: &[ItemRecord]) -> Result<()> {
        let mut tx = self.pool().begin().await?;

        sqlx::query("DELETE FROM items").execute(&mut *tx).await?;

        for (position, item) in snapshot.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO items (id, position, title, name, path, is_bucket, enabled)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&item.id)
            .bind(position as i64)
            .bind(&item.title)
            .bind(&item.name)
            .bind(&item.path)
            .bind(item.is_bucket)
            .bind(item.enabled)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO snapshot_meta (key, saved_at, item_count)
            VALUES (1, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                saved_at = excluded.saved_at,
                item_count = excluded.item_count
            "#,
        )
        .bind(Utc::now().to_rfc3339())
        .bind(snapshot.len() as i64)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!(items = snapshot.len(), "snapshot saved");

        Ok(())
    }

    /// Get one tracked item by id
    pub async fn get_item(&self, id: &str) -> Result<Option<ItemRecord>> {
        let item = sqlx::query_as::<_, ItemRecord>(
            "SELECT id, title, name, path, is_bucket, enabled FROM items WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(item)
    }

    /// Flip the user-controlled `enabled` flag
    ///
    /// # Returns
    /// * `Ok(true)` - The item exists and was updated
    /// * `Ok(false)` - No item with this id
    pub async fn set_item_enabled(&self, id: &str, enabled: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE items SET enabled = ? WHERE id = ?")
            .bind(enabled)
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Insert or overwrite a registered command
    pub async fn upsert_registered_command(&self, command: &RegisteredCommand) -> Result<()> {
        let aliases = serde_json::to_string(&command.aliases)?;

        sqlx::query(
            r#"
            INSERT INTO registered_commands (code, explanation, icon, aliases, updated_at)
            VALUES (?, ?, ?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(code) DO UPDATE SET
                explanation = excluded.explanation,
                icon = excluded.icon,
                aliases = excluded.aliases,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(&command.code)
        .bind(&command.explanation)
        .bind(&command.icon)
        .bind(aliases)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Delete a registered command. Unknown codes are not an error.
    pub async fn delete_registered_command(&self, code: &str) -> Result<()> {
        sqlx::query("DELETE FROM registered_commands WHERE code = ?")
            .bind(code)
            .execute(self.pool())
            .await?;

        Ok(())
    }

    /// All registered commands whose code starts with `prefix`
    pub async fn get_registered_commands(&self, prefix: &str) -> Result<Vec<RegisteredCommand>> {
        let pattern = format!("{}%", prefix);

        let rows = sqlx::query_as::<_, RegisteredCommandRow>(
            "SELECT code, explanation, icon, aliases FROM registered_commands
             WHERE code LIKE ? ORDER BY code",
        )
        .bind(pattern)
        .fetch_all(self.pool())
        .await?;

        let mut commands = Vec::with_capacity(rows.len());
        for row in rows {
            commands.push(row.into_command()?);
        }

        Ok(commands)
    }
}
