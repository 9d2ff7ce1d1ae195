// macOS inspection through the command line tools that ship with the OS
//
// Spotlight (mdfind) lists the installed apps. The recent lists are keyed
// archives only Foundation can read, so a small JXA script run by osascript
// decodes them and prints the paths as JSON.

use crate::config::Config;
use crate::core::indexer::RawApp;
use crate::core::reconciler::LIST_FILE_SUFFIXES;
use crate::db::ItemRecord;
use crate::error::{RecentsError, Result};
use crate::inspect::SystemInspector;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::process::Command;

const BUNDLE_ID_ATTR: &str = "kMDItemCFBundleIdentifier";
const DISPLAY_NAME_ATTR: &str = "kMDItemDisplayName";
const APP_QUERY: &str = "kMDItemContentTypeTree = 'com.apple.application'";

// Spotlight separates the path from each attribute with three spaces
const MDFIND_COLUMN_SEPARATOR: &str = "   ";

pub struct MacInspector {
    config: Config,
}

impl MacInspector {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Locate the list file for an app, whatever case and suffix it has on disk
    fn app_list_file(&self, bundle_id: &str) -> Option<PathBuf> {
        let entries = std::fs::read_dir(self.config.app_recents_dir()).ok()?;

        entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                list_stem(path)
                    .map(|stem| stem.eq_ignore_ascii_case(bundle_id))
                    .unwrap_or(false)
            })
            .min_by_key(|path| suffix_rank(path))
    }

    async fn read_list(&self, list_file: &Path) -> Vec<String> {
        let script = recents_script(list_file);

        let output = match Command::new("osascript")
            .args(["-l", "JavaScript", "-e", script.as_str()])
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!(file = %list_file.display(), error = %e, "osascript unavailable");
                return Vec::new();
            }
        };

        if !output.status.success() {
            tracing::debug!(
                file = %list_file.display(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "could not read recent list"
            );
            return Vec::new();
        }

        parse_recents_output(&String::from_utf8_lossy(&output.stdout))
    }
}

impl SystemInspector for MacInspector {
    async fn installed_apps(&self) -> Result<Vec<RawApp>> {
        let output = Command::new("mdfind")
            .args(mdfind_args())
            .output()
            .await
            .map_err(|e| RecentsError::Inspection(format!("could not run mdfind: {}", e)))?;

        if !output.status.success() {
            return Err(RecentsError::Inspection(format!(
                "mdfind exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let apps = parse_mdfind_output(&String::from_utf8_lossy(&output.stdout));
        tracing::debug!(count = apps.len(), "listed installed apps");
        Ok(apps)
    }

    async fn recent_list_ids(&self) -> Result<Vec<String>> {
        let dir = self.config.app_recents_dir();
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            // No app has recorded a recent document yet
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(RecentsError::Inspection(format!(
                    "could not list {}: {}",
                    dir.display(),
                    e
                )))
            }
        };

        let mut ids = Vec::new();
        for entry in entries.filter_map(|entry| entry.ok()) {
            if let Some(stem) = list_stem(&entry.path()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();

        Ok(ids)
    }

    async fn finder_list(&self, stem: &str) -> Option<String> {
        LIST_FILE_SUFFIXES
            .iter()
            .map(|suffix| format!("{}.{}", stem, suffix))
            .find(|file_name| self.config.shared_file_list_dir.join(file_name).is_file())
    }

    async fn recent_documents(&self, item: &ItemRecord) -> Vec<String> {
        let list_file = if item.is_bucket {
            let path = self.config.shared_file_list_dir.join(&item.id);
            path.is_file().then_some(path)
        } else {
            self.app_list_file(&item.id)
        };

        match list_file {
            Some(file) => self.read_list(&file).await,
            None => {
                tracing::debug!(id = %item.id, "no recent list on disk");
                Vec::new()
            }
        }
    }
}

/// Spotlight query listing every app with its bundle id and display name
fn mdfind_args() -> [&'static str; 7] {
    [
        APP_QUERY,
        "-attr",
        BUNDLE_ID_ATTR,
        "-attr",
        DISPLAY_NAME_ATTR,
        "-onlyin",
        "/",
    ]
}

/// Open `file`, with `app` if given, otherwise with its default application
pub async fn open_file(file: &str, app: Option<&str>) -> Result<()> {
    let mut command = Command::new("open");
    if let Some(app) = app {
        command.args(["-a", app]);
    }

    let status = command.arg(file).status().await?;
    if !status.success() {
        return Err(RecentsError::Generic(format!(
            "open exited with {} for {}",
            status, file
        )));
    }

    Ok(())
}

/// Parse `mdfind -attr` output into raw app entries
///
/// Lines look like `<path>   kMDItemCFBundleIdentifier = <id>`. Blank lines
/// are skipped, anything unrecognised after the path is ignored.
pub fn parse_mdfind_output(stdout: &str) -> Vec<RawApp> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut columns = line.split(MDFIND_COLUMN_SEPARATOR);
            let path = columns.next()?.trim();
            if path.is_empty() {
                return None;
            }

            let mut app = RawApp {
                path: path.to_string(),
                ..RawApp::default()
            };

            for column in columns {
                let Some((key, value)) = column.split_once(" = ") else {
                    continue;
                };
                let value = value.trim().trim_matches('"').to_string();
                match key.trim() {
                    BUNDLE_ID_ATTR => app.bundle_id = Some(value),
                    DISPLAY_NAME_ATTR => app.display_name = Some(value),
                    _ => {}
                }
            }

            Some(app)
        })
        .collect()
}

/// Parse what the recents script prints: a JSON array of paths
///
/// Anything else yields nothing.
pub fn parse_recents_output(stdout: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<Option<String>>>(stdout.trim()) {
        Ok(paths) => paths
            .into_iter()
            .flatten()
            .filter(|path| !path.is_empty())
            .collect(),
        Err(e) => {
            tracing::debug!(error = %e, "unexpected osascript output");
            Vec::new()
        }
    }
}

fn recents_script(list_file: &Path) -> String {
    // JSON string literal is also a valid JS string literal
    let file = serde_json::to_string(&list_file.to_string_lossy())
        .unwrap_or_else(|_| "\"\"".to_string());

    format!(
        r#"ObjC.import('Foundation')
let paths = []
try {{
  let data = $.NSData.dataWithContentsOfFile({file})
  let document = $.NSKeyedUnarchiver.unarchiveObjectWithData(data)
  let items = document.objectForKey('items')
  let keys = $([$.NSURLPathKey])
  for (let i = 0; i < items.count; i++) {{
    try {{
      let bookmark = items.objectAtIndex(i).objectForKey('Bookmark')
      let dict = $.NSURL.resourceValuesForKeysFromBookmarkData(keys, bookmark)
      paths.push(ObjC.unwrap(dict.objectForKey('_NSURLPathKey')))
    }} catch (e) {{
      continue
    }}
  }}
}} catch (e) {{}}
JSON.stringify(paths)"#
    )
}

/// File name without a known list suffix; `None` for anything that isn't a list
fn list_stem(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    let (stem, suffix) = name.rsplit_once('.')?;
    if stem.is_empty() || !LIST_FILE_SUFFIXES.contains(&suffix) {
        return None;
    }
    Some(stem)
}

fn suffix_rank(path: &Path) -> usize {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| LIST_FILE_SUFFIXES.iter().position(|s| *s == ext))
        .unwrap_or(LIST_FILE_SUFFIXES.len())
}
