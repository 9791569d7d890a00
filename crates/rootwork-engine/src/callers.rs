//! Caller discovery: textual search hits classified by a call-site heuristic

use regex::Regex;
use rootwork_core::{
    BundlePath, EdgeType, EvidenceItem, GraphNode, Method, SourceRange, SourceRef, WarningCode,
    symbol_node_id,
};

use crate::run::{GraphRun, RunPhase};
use crate::search::{SearchBackend, SearchHit, SearchQuery, SearchScope};
use crate::storage::BundleStorage;

/// Fixed confidence of a call edge; no type or overload resolution happens.
pub const CALL_CONFIDENCE: f64 = 0.6;

/// Absolute cap on search hits per request.
pub const MAX_SEARCH_HITS: usize = 500;

/// Symbols shorter than this match too much text to be useful.
pub const MIN_SYMBOL_CHARS: usize = 2;

pub const CALL_NOTE: &str = "textual call-site match; no type or overload resolution";

pub fn hit_limit(max_files: usize) -> usize {
    MAX_SEARCH_HITS.min(max_files.saturating_mul(5))
}

/// Compiled patterns for one symbol. The symbol is escaped before embedding.
pub struct CallSitePattern {
    call: Regex,
    definition: Regex,
}

impl CallSitePattern {
    pub fn new(symbol: &str) -> anyhow::Result<Self> {
        let escaped = regex::escape(symbol);
        Ok(CallSitePattern {
            call: Regex::new(&format!(r"(?:^|[^\w$])({escaped})\("))?,
            definition: Regex::new(&format!(
                r"(?:\b(?:def|fn|function)\s+|\bfunc\s*(?:\([^)]*\)\s*)?)({escaped})\s*[(<]"
            ))?,
        })
    }

    /// Column span of the first call of the symbol on `line`, skipping lines
    /// that declare it.
    pub fn call_site(&self, line: &str) -> Option<(u32, u32)> {
        if self.definition.is_match(line) {
            return None;
        }
        let m = self.call.captures(line)?.get(1)?;
        Some((m.start() as u32 + 1, m.as_str().len() as u32))
    }

    /// Column span of the symbol's name on a line that declares it.
    pub fn definition_site(&self, line: &str) -> Option<(u32, u32)> {
        let m = self.definition.captures(line)?.get(1)?;
        Some((m.start() as u32 + 1, m.as_str().len() as u32))
    }
}

/// Range of the first declaration of `symbol` in `content`.
pub fn definition_range(content: &str, symbol: &str) -> Option<SourceRange> {
    let pattern = CallSitePattern::new(symbol).ok()?;
    content.lines().enumerate().find_map(|(i, line)| {
        let (col, len) = pattern.definition_site(line)?;
        Some(SourceRange::on_line(i as u32 + 1, col, len))
    })
}

/// Add `calls` edges pointing at `symbol` defined in `target`.
pub async fn discover_callers(
    run: &mut GraphRun,
    storage: &dyn BundleStorage,
    search: &dyn SearchBackend,
    target: &BundlePath,
    symbol: Option<&str>,
) {
    let Some(symbol) = symbol
        .map(str::trim)
        .filter(|s| s.chars().count() >= MIN_SYMBOL_CHARS)
    else {
        run.warn(
            WarningCode::CallerDiscoverySkipped,
            format!(
                "caller discovery skipped: target symbol is missing or shorter than {MIN_SYMBOL_CHARS} characters"
            ),
        );
        return;
    };
    run.enter(RunPhase::DiscoveringCallers);
    if !run.graph.checkpoint() {
        return;
    }

    let pattern = match CallSitePattern::new(symbol) {
        Ok(pattern) => pattern,
        Err(e) => {
            run.warn(
                WarningCode::CallerDiscoverySkipped,
                format!("caller discovery skipped: {e}"),
            );
            return;
        }
    };

    let limit = hit_limit(run.graph.budget().options().max_files);
    let query = SearchQuery {
        text: symbol.to_string(),
        scope: SearchScope::Bundle,
        limit,
    };
    let hits = match search.search(&run.bundle_id, &query).await {
        Ok(hits) => hits,
        Err(e) => {
            tracing::warn!("Search for `{}` failed: {:#}", symbol, e);
            run.warn(
                WarningCode::SearchFailed,
                format!("search backend failed, no callers discovered: {e}"),
            );
            return;
        }
    };
    run.stats.search_hits = hits.len();
    if hits.len() >= limit {
        run.warn(
            WarningCode::SearchHitLimit,
            format!("search stopped at {limit} hits; callers may be incomplete"),
        );
    }

    let target_path = target.to_string();
    let target_id = symbol_node_id(symbol, &target_path);
    for hit in hits.into_iter().take(limit) {
        if !run.graph.checkpoint() {
            break;
        }
        let Some(line) = hit_line(run, storage, &hit).await else {
            continue;
        };
        let Some((col, len)) = pattern.call_site(&line) else {
            continue;
        };

        let caller = match &hit.enclosing {
            Some(name) => GraphNode::symbol(name, &hit.path),
            None => GraphNode::file(&hit.path),
        };
        let caller_id = caller.id.clone();
        if caller_id == target_id {
            continue;
        }
        if run.graph.upsert_node(caller).is_none() {
            break;
        }

        let range = SourceRange::on_line(hit.line_no, col, len);
        let source = SourceRef::new(&hit.path, range, storage.uri(&hit.path, &range), &line);
        run.graph.push_edge(
            EvidenceItem::edge(
                EdgeType::Calls,
                &caller_id,
                &target_id,
                Method::Heuristic,
                CALL_CONFIDENCE,
                source,
            )
            .with_note(CALL_NOTE),
        );
    }
}

/// The hit's line, from its snippet or from the file.
async fn hit_line(run: &mut GraphRun, storage: &dyn BundleStorage, hit: &SearchHit) -> Option<String> {
    if let Some(snippet) = &hit.snippet {
        return Some(snippet.clone());
    }
    let path = BundlePath::parse(&hit.path).ok()?;
    let content = run.file_content(storage, &path).await?;
    content
        .lines()
        .nth(hit.line_no.checked_sub(1)? as usize)
        .map(str::to_string)
}
