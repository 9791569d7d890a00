//! Full-text search collaborator used by caller discovery

use std::sync::Arc;

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::storage::{BundleStore, RepoRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchScope {
    Bundle,
    Repo(RepoRef),
}

#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub text: String,
    pub scope: SearchScope,
    pub limit: usize,
}

/// A line containing the query text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    /// Bundle path of the file.
    pub path: String,
    /// 1-based.
    pub line_no: u32,
    /// The matching line, when the backend returns it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// Name of the function the hit sits in, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enclosing: Option<String>,
}

#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
    /// At most `query.limit` hits, in a stable order.
    async fn search(&self, bundle_id: &str, query: &SearchQuery) -> Result<Vec<SearchHit>>;
}

static DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?:pub(?:\([^)]*\))?|export|default|async|static|public|private|protected|unsafe|const|extern)\s+)*(?:def|fn|function\*?|func(?:\s*\([^)]*\))?)\s+([A-Za-z_$][\w$]*)",
    )
    .expect("invalid declaration regex")
});

/// Scans code files line by line. Tracks the innermost declaration by
/// indentation to report the enclosing function.
pub struct ScanSearch {
    store: Arc<dyn BundleStore>,
}

impl ScanSearch {
    pub fn new(store: Arc<dyn BundleStore>) -> Self {
        ScanSearch { store }
    }
}

#[async_trait::async_trait]
impl SearchBackend for ScanSearch {
    async fn search(&self, bundle_id: &str, query: &SearchQuery) -> Result<Vec<SearchHit>> {
        let Some(storage) = self.store.open(bundle_id).await? else {
            anyhow::bail!("bundle `{}` not found", bundle_id);
        };
        if query.text.is_empty() || query.limit == 0 {
            return Ok(Vec::new());
        }
        let needle = Regex::new(&format!(
            r"(?:^|[^\w$]){}(?:[^\w$]|$)",
            regex::escape(&query.text)
        ))?;

        let repos = match &query.scope {
            SearchScope::Bundle => storage.list_repos().await?,
            SearchScope::Repo(repo) => vec![repo.clone()],
        };

        let mut hits = Vec::new();
        for repo in repos {
            let files: Vec<String> = storage.code_files(&repo).collect();
            for rel in files {
                let path = repo.file(&rel);
                let Ok(content) = storage.read_file(&path).await else {
                    tracing::debug!("Search skipped unreadable {}", path);
                    continue;
                };
                let bundle_path = path.to_string();
                for hit in scan_lines(&bundle_path, &content, &needle) {
                    hits.push(hit);
                    if hits.len() >= query.limit {
                        return Ok(hits);
                    }
                }
            }
        }
        Ok(hits)
    }
}

struct Scope {
    name: String,
    indent: usize,
}

fn scan_lines(path: &str, content: &str, needle: &Regex) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    let mut scope: Option<Scope> = None;
    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();
        if !trimmed.is_empty() && scope.as_ref().is_some_and(|s| indent <= s.indent) {
            scope = None;
        }
        if let Some(caps) = DECLARATION.captures(trimmed) {
            if let Some(name) = caps.get(1) {
                scope = Some(Scope {
                    name: name.as_str().to_string(),
                    indent,
                });
            }
        }
        if needle.is_match(line) {
            hits.push(SearchHit {
                path: path.to_string(),
                line_no: i as u32 + 1,
                snippet: Some(line.to_string()),
                enclosing: scope.as_ref().map(|s| s.name.clone()),
            });
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_reports_enclosing_function() {
        let needle = Regex::new(r"(?:^|[^\w$])parse(?:[^\w$]|$)").unwrap();
        let content = "def parse(x):\n    return x\n\ndef main():\n    parse(1)\n\nparse(2)\n";
        let hits = scan_lines("repos/o/r/norm/m.py", content, &needle);
        let found: Vec<_> = hits
            .iter()
            .map(|h| (h.line_no, h.enclosing.as_deref()))
            .collect();
        assert_eq!(
            found,
            vec![(1, Some("parse")), (5, Some("main")), (7, None)]
        );
    }

    #[test]
    fn test_scan_matches_whole_words_only() {
        let needle = Regex::new(r"(?:^|[^\w$])run(?:[^\w$]|$)").unwrap();
        let hits = scan_lines("f.ts", "rerun();\nrunner();\nrun();\n", &needle);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].line_no, 3);
    }
}
