//! Per-request state: the graph under construction, counters, warnings and
//! the file-content memo

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rootwork_core::{
    Budget, BundlePath, DependencyGraphResult, EdgeType, EvidenceGraph, GraphFacts, GraphMeta,
    GraphMode, GraphSignals, GraphStats, RunStatus, TargetRef, Warning, WarningCode,
};

use crate::storage::BundleStorage;

/// Request lifecycle, logged at each transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    DiscoveringFiles,
    ResolvingImports,
    DiscoveringCallers,
    Complete,
    Truncated,
    PersistingCache,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::DiscoveringFiles => "discovering-files",
            RunPhase::ResolvingImports => "resolving-imports",
            RunPhase::DiscoveringCallers => "discovering-callers",
            RunPhase::Complete => "complete",
            RunPhase::Truncated => "truncated",
            RunPhase::PersistingCache => "persisting-cache",
        };
        f.write_str(name)
    }
}

pub struct GraphRun {
    pub bundle_id: String,
    pub mode: GraphMode,
    pub graph: EvidenceGraph,
    pub stats: GraphStats,
    warnings: Vec<Warning>,
    phase: RunPhase,
    files: HashMap<String, Option<Arc<str>>>,
    read_failures: usize,
}

impl GraphRun {
    pub fn new(bundle_id: &str, mode: GraphMode, budget: Budget) -> Self {
        GraphRun {
            bundle_id: bundle_id.to_string(),
            mode,
            graph: EvidenceGraph::new(budget),
            stats: GraphStats::default(),
            warnings: Vec::new(),
            phase: RunPhase::DiscoveringFiles,
            files: HashMap::new(),
            read_failures: 0,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn enter(&mut self, phase: RunPhase) {
        if self.phase != phase {
            tracing::debug!(
                "[{}] {:?} graph: {} -> {}",
                self.bundle_id,
                self.mode,
                self.phase,
                phase
            );
            self.phase = phase;
        }
    }

    pub fn warn(&mut self, code: WarningCode, message: impl Into<String>) {
        let warning = Warning::new(code, message);
        tracing::debug!("Warning {:?}: {}", warning.code, warning.message);
        self.warnings.push(warning);
    }

    pub fn record_read_failure(&mut self, path: &str, error: &std::io::Error) {
        tracing::warn!("Failed to read {}: {}", path, error);
        self.read_failures += 1;
    }

    /// Remember content already read so later lookups are free.
    pub fn remember(&mut self, path: &BundlePath, content: &str) {
        self.files.insert(path.to_string(), Some(Arc::from(content)));
    }

    /// Content of a bundle file, read at most once per request.
    ///
    /// A first read is admitted against `maxFiles` and counted in `filesRead`.
    pub async fn file_content(
        &mut self,
        storage: &dyn BundleStorage,
        path: &BundlePath,
    ) -> Option<Arc<str>> {
        let key = path.to_string();
        if let Some(hit) = self.files.get(&key) {
            return hit.clone();
        }
        if !self.graph.admit_file() {
            return None;
        }
        let content = match storage.read_file(path).await {
            Ok(content) => {
                self.stats.files_read += 1;
                Some(Arc::<str>::from(content))
            }
            Err(e) => {
                self.record_read_failure(&key, &e);
                None
            }
        };
        self.files.insert(key, content.clone());
        content
    }

    /// Freeze the graph and assemble the response document.
    pub fn finish(
        mut self,
        repo: Option<String>,
        target: Option<TargetRef>,
    ) -> DependencyGraphResult {
        if self.read_failures > 0 {
            let n = self.read_failures;
            self.warn(
                WarningCode::FileReadFailed,
                format!("{n} file(s) could not be read and were skipped"),
            );
        }
        if self.stats.parser_fallbacks > 0 {
            let n = self.stats.parser_fallbacks;
            self.warn(
                WarningCode::ParserFallback,
                format!("{n} file(s) used heuristic import extraction"),
            );
        }
        if self.stats.unresolved_imports > 0 {
            let n = self.stats.unresolved_imports;
            self.warn(
                WarningCode::UnresolvedImports,
                format!("{n} import(s) could not be resolved to a file in the bundle"),
            );
        }
        let status = if self.graph.budget().is_truncated() {
            let reason = self
                .graph
                .budget()
                .truncated_reason()
                .unwrap_or("budget exhausted")
                .to_string();
            self.warn(
                WarningCode::BudgetTruncated,
                format!("result is partial: {reason}"),
            );
            RunStatus::Truncated
        } else {
            RunStatus::Complete
        };
        self.enter(match status {
            RunStatus::Complete => RunPhase::Complete,
            RunStatus::Truncated => RunPhase::Truncated,
        });

        self.stats.import_edges = self.graph.count_edges(EdgeType::Imports);
        self.stats.resolved_import_edges = self.graph.count_edges(EdgeType::ImportsResolved);
        self.stats.call_edges = self.graph.count_edges(EdgeType::Calls);

        let (nodes, edges, budget) = self.graph.into_parts();
        let elapsed_ms = budget.elapsed().as_millis() as u64;
        tracing::info!(
            "[{}] {:?} graph {:?}: {} nodes, {} edges, {} files in {}ms",
            self.bundle_id,
            self.mode,
            status,
            nodes.len(),
            edges.len(),
            self.stats.files_read,
            elapsed_ms
        );

        DependencyGraphResult {
            meta: GraphMeta {
                request_id: uuid::Uuid::new_v4().to_string(),
                generated_at: chrono::Utc::now().to_rfc3339(),
                elapsed_ms,
                bundle_id: self.bundle_id,
                mode: self.mode,
                repo,
                target,
                status,
                budget: budget.report(),
            },
            facts: GraphFacts { nodes, edges },
            signals: GraphSignals {
                stats: self.stats,
                warnings: self.warnings,
            },
        }
    }
}
