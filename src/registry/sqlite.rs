/// Registry backed by the local database
///
/// Lets the CLI run standalone: commands land in `registered_commands` and a
/// launcher can read them from there.

use crate::db::{Database, RegisteredCommand};
use crate::error::Result;
use crate::registry::CommandRegistry;
use std::sync::Arc;

pub struct SqliteRegistry {
    db: Arc<Database>,
}

impl SqliteRegistry {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Commands registered under `prefix`
    pub async fn list(&self, prefix: &str) -> Result<Vec<RegisteredCommand>> {
        self.db.get_registered_commands(prefix).await
    }
}

impl CommandRegistry for SqliteRegistry {
    async fn upsert(&self, command: RegisteredCommand) -> Result<()> {
        self.db.upsert_registered_command(&command).await
    }

    async fn remove(&self, code: &str) -> Result<()> {
        self.db.delete_registered_command(code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::CommandAlias;

    #[tokio::test]
    async fn test_roundtrip_through_database() {
        let db = Arc::new(Database::new_test().await.unwrap());
        let registry = SqliteRegistry::new(Arc::clone(&db));

        let command = RegisteredCommand {
            code: "recents-com.apple.safari".to_string(),
            explanation: "快速打开 Safari 最近文档".to_string(),
            icon: "/Applications/Safari.app".to_string(),
            aliases: vec![
                CommandAlias::Text {
                    text: "Safari Recents".to_string(),
                },
                CommandAlias::WindowMatch {
                    label: "快速打开 Safari 最近文档".to_string(),
                    apps: vec!["Safari.app".to_string()],
                },
            ],
        };

        registry.upsert(command.clone()).await.unwrap();
        assert_eq!(registry.list("recents-").await.unwrap(), vec![command.clone()]);

        // Other producers' commands are invisible under our prefix
        assert!(registry.list("other-").await.unwrap().is_empty());

        registry.remove(&command.code).await.unwrap();
        registry.remove(&command.code).await.unwrap();
        assert!(registry.list("recents-").await.unwrap().is_empty());
    }
}
