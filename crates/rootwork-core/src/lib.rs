//! Rootwork Core — evidence graph model, budgets, and the global graph cache

pub mod model;
pub mod evidence;
pub mod result;
pub mod graph;
pub mod budget;
pub mod bundle_path;
pub mod config;
pub mod error;
pub mod cache;

#[cfg(test)]
pub mod tests;

pub use model::{
    EdgeType, EvidenceItem, EvidenceKind, GraphNode, Method, NodeKind, SourceRange, SourceRef,
    file_node_id, module_node_id, symbol_node_id,
};
pub use evidence::{clamp_snippet, evidence_id, sha256_hex, SNIPPET_MAX_CHARS};
pub use result::{
    BudgetReport, DependencyGraphResult, GraphFacts, GraphMeta, GraphMode, GraphSignals,
    GraphStats, RunStatus, TargetRef, Warning, WarningCode,
};
pub use graph::EvidenceGraph;
pub use budget::Budget;
pub use bundle_path::{BundlePath, looks_absolute};
pub use config::{CacheConfig, EngineConfig, GraphOptions, CONFIG_FILE};
pub use error::GraphError;
pub use cache::{CACHE_DIR, GLOBAL_GRAPH_CACHE, cache_dir, global_graph_path, ensure_cache_dir, save_graph, load_graph, clear_cache};
