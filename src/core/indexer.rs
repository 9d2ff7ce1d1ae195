// Turns the raw list of installed apps into a lookup by bundle id
//
// The raw list comes straight out of a Spotlight query, so expect junk:
// missing ids, "(null)" ids, names without extensions.

use crate::db::ItemRecord;
use std::collections::HashMap;
use std::path::Path;

// What Spotlight prints when an attribute has no value
const NULL_SENTINELS: &[&str] = &["null", "(null)"];

/// One installed application as the OS reports it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawApp {
    pub path: String,
    pub bundle_id: Option<String>,
    pub display_name: Option<String>,
}

pub struct AppIndexer;

impl AppIndexer {
    /// Build `lowercased bundle id -> ItemRecord`
    ///
    /// Entries without a usable bundle id are dropped. When two entries share
    /// a bundle id the later one wins.
    pub fn index(raw_apps: &[RawApp]) -> HashMap<String, ItemRecord> {
        let mut map = HashMap::with_capacity(raw_apps.len());

        for raw in raw_apps {
            let Some(id) = Self::normalized_id(raw.bundle_id.as_deref()) else {
                continue;
            };

            let name = file_name(&raw.path);
            if name.is_empty() {
                continue;
            }

            let label = raw
                .display_name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty() && !is_null(n))
                .unwrap_or(&name);
            let title = strip_extension(label).to_string();

            map.insert(id.clone(), ItemRecord::app(id, title, name, raw.path.clone()));
        }

        tracing::debug!(raw = raw_apps.len(), indexed = map.len(), "indexed installed apps");
        map
    }

    fn normalized_id(bundle_id: Option<&str>) -> Option<String> {
        let id = bundle_id?.trim();
        if id.is_empty() || is_null(id) {
            return None;
        }
        Some(id.to_lowercase())
    }
}

fn is_null(value: &str) -> bool {
    NULL_SENTINELS.contains(&value)
}

/// Last path component, tolerating trailing slashes
pub fn file_name(path: &str) -> String {
    Path::new(path.trim_end_matches('/'))
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_string()
}

/// Everything before the last `.`; names without one come back unchanged
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[..idx],
        None => name,
    }
}
