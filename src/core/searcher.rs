/// Recent document search with fuzzy matching
///
/// Lists what a tracked item opened recently and narrows it down by file name.

use crate::core::indexer::file_name;
use crate::db::ItemRecord;
use crate::inspect::SystemInspector;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::Serialize;
use std::path::Path;

/// One recent document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentDocument {
    pub path: String,
    pub file_name: String,
    pub score: i64,
}

/// Handles recent document lookups
pub struct Searcher<'a, I> {
    inspector: &'a I,
    matcher: SkimMatcherV2,
}

impl<'a, I: SystemInspector> Searcher<'a, I> {
    pub fn new(inspector: &'a I) -> Self {
        Self {
            inspector,
            matcher: SkimMatcherV2::default(),
        }
    }

    /// Recent documents of `item` that still exist
    ///
    /// # Arguments
    /// * `item` - Tracked item whose list to read
    /// * `query` - Fuzzy filter on the file name; empty keeps recency order
    /// * `limit` - Maximum results to return
    pub async fn search(
        &self,
        item: &ItemRecord,
        query: &str,
        limit: usize,
    ) -> Vec<RecentDocument> {
        let paths = self.inspector.recent_documents(item).await;
        self.rank(paths, query, limit)
    }

    fn rank(&self, paths: Vec<String>, query: &str, limit: usize) -> Vec<RecentDocument> {
        let query = query.trim();

        let mut results: Vec<RecentDocument> = paths
            .into_iter()
            .filter(|path| Path::new(path).exists())
            .filter_map(|path| {
                let name = file_name(&path);
                let score = if query.is_empty() {
                    0
                } else {
                    self.matcher.fuzzy_match(&name, query)?
                };
                Some(RecentDocument {
                    path,
                    file_name: name,
                    score,
                })
            })
            .collect();

        // Stable, so equal scores keep recency order
        if !query.is_empty() {
            results.sort_by(|a, b| b.score.cmp(&a.score));
        }

        results.truncate(limit);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::observer::tests::FakeInspector;
    use std::fs;
    use tempfile::TempDir;

    fn setup(temp: &TempDir, names: &[&str]) -> (FakeInspector, ItemRecord) {
        let item = ItemRecord::app(
            "com.apple.textedit",
            "TextEdit",
            "TextEdit.app",
            "/Applications/TextEdit.app",
        );
        let inspector = FakeInspector::default();

        let mut paths = Vec::new();
        for name in names {
            let path = temp.path().join(name);
            fs::write(&path, b"x").unwrap();
            paths.push(path.to_string_lossy().to_string());
        }
        // One stale entry that no longer exists
        paths.push(temp.path().join("deleted.txt").to_string_lossy().to_string());

        inspector.documents.lock().unwrap().insert(item.id.clone(), paths);
        (inspector, item)
    }

    #[tokio::test]
    async fn test_lists_existing_in_order() {
        let temp = TempDir::new().unwrap();
        let (inspector, item) = setup(&temp, &["notes.txt", "budget.numbers", "todo.md"]);
        let searcher = Searcher::new(&inspector);

        let results = searcher.search(&item, "", 10).await;

        let names: Vec<&str> = results.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(names, vec!["notes.txt", "budget.numbers", "todo.md"]);
    }

    #[tokio::test]
    async fn test_fuzzy_filter() {
        let temp = TempDir::new().unwrap();
        let (inspector, item) = setup(&temp, &["notes.txt", "budget.numbers", "todo.md"]);
        let searcher = Searcher::new(&inspector);

        let results = searcher.search(&item, "bdgt", 10).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].file_name, "budget.numbers");
    }

    #[tokio::test]
    async fn test_limit() {
        let temp = TempDir::new().unwrap();
        let (inspector, item) = setup(&temp, &["a.txt", "b.txt", "c.txt"]);
        let searcher = Searcher::new(&inspector);

        assert_eq!(searcher.search(&item, "", 2).await.len(), 2);
    }
}
