/// Data models for tracked items and registered commands
///
/// `ItemRecord` maps to the `items` table; `RegisteredCommand` is the payload
/// handed to the command registry.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One trackable thing: an installed application or a Finder-level bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub id: String,
    pub title: String,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub is_bucket: bool,
    /// Set only by the user. Carried forward across refreshes.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl ItemRecord {
    /// A freshly observed application
    pub fn app(
        id: impl Into<String>,
        title: impl Into<String>,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            name: name.into(),
            path: path.into(),
            is_bucket: false,
            enabled: true,
        }
    }

    /// A freshly observed Finder-level bucket
    pub fn bucket(
        id: impl Into<String>,
        title: impl Into<String>,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            is_bucket: true,
            ..Self::app(id, title, name, path)
        }
    }
}

/// One invocable alias of a registered command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandAlias {
    /// Typed text that triggers the command
    Text { text: String },
    /// Offered when the focused window belongs to one of `apps`
    WindowMatch { label: String, apps: Vec<String> },
}

/// A quick-launch command as the registry stores it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredCommand {
    pub code: String,
    pub explanation: String,
    /// Path of the file whose icon represents the command
    pub icon: String,
    pub aliases: Vec<CommandAlias>,
}

/// Row shape of `registered_commands`
#[derive(Debug, Clone, FromRow)]
pub struct RegisteredCommandRow {
    pub code: String,
    pub explanation: String,
    pub icon: String,
    pub aliases: String, // JSON array
}

impl RegisteredCommandRow {
    pub fn into_command(self) -> Result<RegisteredCommand, serde_json::Error> {
        Ok(RegisteredCommand {
            code: self.code,
            explanation: self.explanation,
            icon: self.icon,
            aliases: serde_json::from_str(&self.aliases)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_constructor() {
        let bucket = ItemRecord::bucket(
            "com.apple.LSSharedFileList.RecentDocuments.sfl2",
            "最近的文稿",
            "Finder.app",
            "/System/Library/CoreServices/Finder.app",
        );

        assert!(bucket.is_bucket);
        assert!(bucket.enabled);
    }

    #[test]
    fn test_item_json_defaults() {
        // Snapshots written before `enabled` existed still load as enabled
        let json = r#"{"id":"com.a","title":"A","name":"A.app","path":"/Applications/A.app"}"#;
        let item: ItemRecord = serde_json::from_str(json).unwrap();

        assert!(item.enabled);
        assert!(!item.is_bucket);
    }

    #[test]
    fn test_alias_tagging() {
        let alias = CommandAlias::WindowMatch {
            label: "Open".to_string(),
            apps: vec!["Safari.app".to_string()],
        };
        let json = serde_json::to_value(&alias).unwrap();

        assert_eq!(json["type"], "window_match");
        assert_eq!(json["apps"][0], "Safari.app");
    }
}
