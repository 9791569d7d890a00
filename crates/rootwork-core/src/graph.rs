//! Evidence graph assembler using petgraph::StableDiGraph keyed by string ids

use crate::budget::Budget;
use crate::model::*;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

/// Deduplicating node set plus an insertion-ordered edge list, with every
/// insertion checked against the run's budget.
pub struct EvidenceGraph {
    inner: StableDiGraph<GraphNode, EvidenceItem>,
    index: HashMap<String, NodeIndex>,
    evidence_ids: HashSet<String>,
    budget: Budget,
}

impl std::fmt::Debug for EvidenceGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvidenceGraph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .field("truncated", &self.budget.is_truncated())
            .finish()
    }
}

impl EvidenceGraph {
    pub fn new(budget: Budget) -> Self {
        EvidenceGraph {
            inner: StableDiGraph::new(),
            index: HashMap::new(),
            evidence_ids: HashSet::new(),
            budget,
        }
    }

    pub fn budget(&self) -> &Budget {
        &self.budget
    }

    pub fn budget_mut(&mut self) -> &mut Budget {
        &mut self.budget
    }

    /// Budget check before a unit of work.
    pub fn checkpoint(&mut self) -> bool {
        let (nodes, edges) = (self.inner.node_count(), self.inner.edge_count());
        self.budget.checkpoint(nodes, edges)
    }

    pub fn admit_file(&mut self) -> bool {
        self.budget.admit_file()
    }

    /// Insert a node unless one with the same id exists.
    ///
    /// Returns `None` when the node is new and `maxNodes` is used up.
    pub fn upsert_node(&mut self, node: GraphNode) -> Option<NodeIndex> {
        if let Some(&idx) = self.index.get(&node.id) {
            return Some(idx);
        }
        let max_nodes = self.budget.options().max_nodes;
        if self.inner.node_count() >= max_nodes {
            self.budget.truncate(format!("maxNodes ({max_nodes}) reached"));
            return None;
        }
        let id = node.id.clone();
        let idx = self.inner.add_node(node);
        self.index.insert(id, idx);
        if self.inner.node_count() == max_nodes {
            self.budget.truncate(format!("maxNodes ({max_nodes}) reached"));
        }
        Some(idx)
    }

    /// Append an edge. Both endpoints must already be present.
    ///
    /// Returns false for duplicates (same evidence id), unknown endpoints, or
    /// when `maxEdges` is used up; the edge count never exceeds the limit.
    pub fn push_edge(&mut self, edge: EvidenceItem) -> bool {
        if self.evidence_ids.contains(&edge.evidence_id) {
            return false;
        }
        let max_edges = self.budget.options().max_edges;
        if self.inner.edge_count() >= max_edges {
            self.budget.truncate(format!("maxEdges ({max_edges}) reached"));
            return false;
        }
        let (Some(&source), Some(&target)) = (self.index.get(&edge.from), self.index.get(&edge.to))
        else {
            tracing::debug!("Dropping edge {} -> {}: endpoint missing", edge.from, edge.to);
            return false;
        };
        self.evidence_ids.insert(edge.evidence_id.clone());
        self.inner.add_edge(source, target, edge);
        if self.inner.edge_count() == max_edges {
            self.budget.truncate(format!("maxEdges ({max_edges}) reached"));
        }
        true
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.inner
            .node_indices()
            .filter_map(move |idx| self.inner.node_weight(idx))
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &EvidenceItem> {
        self.inner
            .edge_indices()
            .filter_map(move |idx| self.inner.edge_weight(idx))
    }

    /// Outgoing edges of a node.
    pub fn edges_from(&self, id: &str) -> Vec<&EvidenceItem> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self
            .inner
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.id(), e.weight()))
            .collect();
        edges.sort_by_key(|(edge_idx, _)| edge_idx.index());
        edges.into_iter().map(|(_, edge)| edge).collect()
    }

    pub fn count_edges(&self, edge_type: EdgeType) -> usize {
        self.edges().filter(|e| e.edge_type == edge_type).count()
    }

    /// Freeze into ordered node/edge lists and the final budget state.
    pub fn into_parts(self) -> (Vec<GraphNode>, Vec<EvidenceItem>, Budget) {
        let nodes = self.nodes().cloned().collect();
        let edges = self.edges().cloned().collect();
        (nodes, edges, self.budget)
    }
}
