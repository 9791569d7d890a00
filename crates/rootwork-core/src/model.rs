//! Core data structures for the evidence graph

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Discriminates what a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    File,
    Symbol,
    Module,
}

/// 1-based line/column span inside a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRange {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl SourceRange {
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        SourceRange {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// A range covering `len` columns of a single line starting at `col`.
    pub fn on_line(line: u32, col: u32, len: u32) -> Self {
        SourceRange::new(line, col, line, col + len)
    }
}

/// A single node in the evidence graph.
///
/// The id is derived from (kind, name, file) only, so the same logical node
/// gets the same id on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub kind: NodeKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<SourceRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<BTreeMap<String, serde_json::Value>>,
}

pub fn file_node_id(path: &str) -> String {
    format!("file:{path}")
}

pub fn symbol_node_id(name: &str, path: &str) -> String {
    format!("symbol:{name}@{path}")
}

pub fn module_node_id(specifier: &str) -> String {
    format!("module:{specifier}")
}

impl GraphNode {
    pub fn file(path: &str) -> Self {
        GraphNode {
            id: file_node_id(path),
            kind: NodeKind::File,
            name: path.to_string(),
            file: Some(path.to_string()),
            range: None,
            attrs: None,
        }
    }

    pub fn symbol(name: &str, path: &str) -> Self {
        GraphNode {
            id: symbol_node_id(name, path),
            kind: NodeKind::Symbol,
            name: name.to_string(),
            file: Some(path.to_string()),
            range: None,
            attrs: None,
        }
    }

    pub fn module(specifier: &str) -> Self {
        GraphNode {
            id: module_node_id(specifier),
            kind: NodeKind::Module,
            name: specifier.to_string(),
            file: None,
            range: None,
            attrs: None,
        }
    }

    pub fn with_range(mut self, range: SourceRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_attr(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.attrs
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), value.into());
        self
    }
}

/// What relationship an edge asserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    /// file -> module specifier, as written in source.
    Imports,
    /// file -> file, after module resolution.
    ImportsResolved,
    /// caller -> callee, from a textual call-site match.
    Calls,
}

impl EdgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Imports => "imports",
            EdgeType::ImportsResolved => "imports_resolved",
            EdgeType::Calls => "calls",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    Edge,
}

/// How an edge was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Read straight off a syntax tree.
    Exact,
    /// Pattern matching or best-effort resolution.
    Heuristic,
}

/// Citation of a source location inside a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub file: String,
    pub range: SourceRange,
    pub uri: String,
    pub snippet: String,
    pub snippet_sha256: String,
}

/// A directed edge together with the evidence that supports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceItem {
    pub evidence_id: String,
    pub kind: EvidenceKind,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
    pub from: String,
    pub to: String,
    pub method: Method,
    /// Always within [0, 1].
    pub confidence: f64,
    pub sources: Vec<SourceRef>,
    #[serde(default)]
    pub notes: Vec<String>,
}
