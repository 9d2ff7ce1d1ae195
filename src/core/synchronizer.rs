// Keeps the command registry in line with the tracked items
//
// Removes commands for items that went away, upserts one command per enabled
// item. No state is kept between calls, so running it twice is harmless.

use crate::core::invocation::feature_code;
use crate::db::{CommandAlias, ItemRecord, RegisteredCommand};
use crate::registry::CommandRegistry;
use regex::Regex;

// Titles made only of these get spaces around them in the localized phrases
const LATIN_TITLE_PATTERN: &str = r"^[a-zA-Z0-9 -_]+$";

const OPEN_PREFIX: &str = "快速打开";
const RECENT_DOCS_SUFFIX: &str = "最近文档";
const RECENTS_SUFFIX: &str = " Recents";

/// One registry call that failed
#[derive(Debug, Clone, PartialEq)]
pub struct SyncFailure {
    pub code: String,
    pub error: String,
}

/// What a sync pass did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    pub removed: usize,
    pub upserted: usize,
    pub skipped: usize,
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct CommandSynchronizer<R> {
    registry: R,
    latin_title: Option<Regex>,
}

impl<R: CommandRegistry> CommandSynchronizer<R> {
    pub fn new(registry: R) -> Self {
        Self {
            registry,
            latin_title: Regex::new(LATIN_TITLE_PATTERN).ok(),
        }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Remove `removed_ids`, then upsert every enabled record in `merged`
    ///
    /// A failing call is logged and recorded; the rest still run.
    pub async fn sync(&self, removed_ids: &[String], merged: &[ItemRecord]) -> SyncReport {
        let mut report = SyncReport::default();

        for id in removed_ids {
            let code = feature_code(id);
            match self.registry.remove(&code).await {
                Ok(()) => report.removed += 1,
                Err(e) => {
                    tracing::warn!(%code, error = %e, "failed to remove command");
                    report.failures.push(SyncFailure {
                        code,
                        error: e.to_string(),
                    });
                }
            }
        }

        for item in merged {
            if !item.enabled {
                report.skipped += 1;
                continue;
            }

            let command = self.build_command(item);
            let code = command.code.clone();
            match self.registry.upsert(command).await {
                Ok(()) => report.upserted += 1,
                Err(e) => {
                    tracing::warn!(%code, error = %e, "failed to register command");
                    report.failures.push(SyncFailure {
                        code,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::debug!(
            removed = report.removed,
            upserted = report.upserted,
            skipped = report.skipped,
            failed = report.failures.len(),
            "registry synchronized"
        );
        report
    }

    /// Registry payload for one item. Same item in, same command out.
    pub fn build_command(&self, item: &ItemRecord) -> RegisteredCommand {
        let padded = if self.is_latin(&item.title) {
            format!(" {} ", item.title)
        } else {
            item.title.clone()
        };

        let explanation = if item.is_bucket {
            format!("{}{}", OPEN_PREFIX, item.title)
        } else {
            format!("{}{}{}", OPEN_PREFIX, padded, RECENT_DOCS_SUFFIX)
        };

        let mut aliases: Vec<CommandAlias> = if item.is_bucket {
            vec![text(item.title.clone())]
        } else {
            vec![
                text(format!("{}{}", item.title, RECENTS_SUFFIX)),
                text(format!("{}{}", padded.trim_start(), RECENT_DOCS_SUFFIX)),
            ]
        };
        aliases.push(CommandAlias::WindowMatch {
            label: explanation.clone(),
            apps: vec![item.name.clone()],
        });

        RegisteredCommand {
            code: feature_code(&item.id),
            explanation,
            icon: item.path.clone(),
            aliases,
        }
    }

    fn is_latin(&self, title: &str) -> bool {
        self.latin_title
            .as_ref()
            .map(|re| re.is_match(title))
            .unwrap_or(false)
    }
}

fn text(text: String) -> CommandAlias {
    CommandAlias::Text { text }
}
