//! Budget controller for graph runs
//!
//! Tracks wall-clock time, admitted files, and node/edge counts. Once any
//! limit is hit the budget flips to truncated and stays there; the first
//! recorded reason wins.

use std::time::{Duration, Instant};

use crate::config::GraphOptions;
use crate::result::BudgetReport;

#[derive(Debug, Clone)]
pub struct Budget {
    options: GraphOptions,
    started: Instant,
    files_admitted: usize,
    truncated_reason: Option<String>,
}

impl Budget {
    /// Start the clock now.
    pub fn new(options: GraphOptions) -> Self {
        Self {
            options,
            started: Instant::now(),
            files_admitted: 0,
            truncated_reason: None,
        }
    }

    pub fn options(&self) -> &GraphOptions {
        &self.options
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated_reason.is_some()
    }

    pub fn truncated_reason(&self) -> Option<&str> {
        self.truncated_reason.as_deref()
    }

    /// Record truncation. Later reasons are ignored.
    pub fn truncate(&mut self, reason: impl Into<String>) {
        if self.truncated_reason.is_none() {
            let reason = reason.into();
            tracing::debug!("Budget exhausted: {}", reason);
            self.truncated_reason = Some(reason);
        }
    }

    /// Consulted before each unit of work. Returns false once work must stop.
    pub fn checkpoint(&mut self, nodes: usize, edges: usize) -> bool {
        if self.is_truncated() {
            return false;
        }
        if self.elapsed() >= self.options.time_budget() {
            self.truncate(format!(
                "time budget of {}ms exceeded",
                self.options.time_budget_ms
            ));
            return false;
        }
        if nodes >= self.options.max_nodes {
            self.truncate(format!("maxNodes ({}) reached", self.options.max_nodes));
            return false;
        }
        if edges >= self.options.max_edges {
            self.truncate(format!("maxEdges ({}) reached", self.options.max_edges));
            return false;
        }
        true
    }

    /// Count one more file against `maxFiles`. Refuses once the limit is used up.
    pub fn admit_file(&mut self) -> bool {
        if self.is_truncated() {
            return false;
        }
        if self.files_admitted >= self.options.max_files {
            self.truncate(format!("maxFiles ({}) reached", self.options.max_files));
            return false;
        }
        self.files_admitted += 1;
        true
    }

    pub fn files_admitted(&self) -> usize {
        self.files_admitted
    }

    pub fn report(&self) -> BudgetReport {
        BudgetReport {
            max_files: self.options.max_files,
            max_nodes: self.options.max_nodes,
            max_edges: self.options.max_edges,
            time_budget_ms: self.options.time_budget_ms,
            truncated: self.is_truncated(),
            truncated_reason: self.truncated_reason.clone(),
        }
    }
}
