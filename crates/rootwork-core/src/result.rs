//! The result document returned for every graph request

use serde::{Deserialize, Serialize};

use crate::model::{EvidenceItem, GraphNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphMode {
    Targeted,
    Global,
}

/// Terminal state of a run. Both are successful outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Complete,
    Truncated,
}

/// Configured limits plus whether (and why) the run stopped early.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetReport {
    pub max_files: usize,
    pub max_nodes: usize,
    pub max_edges: usize,
    pub time_budget_ms: u64,
    pub truncated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncated_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRef {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMeta {
    pub request_id: String,
    pub generated_at: String,
    pub elapsed_ms: u64,
    pub bundle_id: String,
    pub mode: GraphMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetRef>,
    pub status: RunStatus,
    pub budget: BudgetReport,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphFacts {
    pub nodes: Vec<GraphNode>,
    /// Discovery order.
    pub edges: Vec<EvidenceItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphStats {
    pub files_read: usize,
    pub search_hits: usize,
    pub call_edges: usize,
    pub import_edges: usize,
    pub resolved_import_edges: usize,
    pub unresolved_imports: usize,
    pub parser_fallbacks: usize,
}

/// Stable, machine-readable warning codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningCode {
    ParserFallback,
    SearchHitLimit,
    SearchFailed,
    CallerDiscoverySkipped,
    UnresolvedImports,
    BudgetTruncated,
    CacheHit,
    CacheReadFailed,
    CacheWriteFailed,
    FileReadFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub code: WarningCode,
    pub message: String,
}

impl Warning {
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Warning {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSignals {
    pub stats: GraphStats,
    #[serde(default)]
    pub warnings: Vec<Warning>,
}

/// The full response document, and also the schema of the global cache artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyGraphResult {
    pub meta: GraphMeta,
    pub facts: GraphFacts,
    pub signals: GraphSignals,
}

impl DependencyGraphResult {
    pub fn is_truncated(&self) -> bool {
        self.meta.budget.truncated
    }

    pub fn has_warning(&self, code: WarningCode) -> bool {
        self.signals.warnings.iter().any(|w| w.code == code)
    }
}
