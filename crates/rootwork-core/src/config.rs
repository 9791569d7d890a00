//! Engine configuration: request limits and cache policy

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// Default config file name looked up by the CLI.
pub const CONFIG_FILE: &str = "rootwork.toml";

/// Per-request resource limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphOptions {
    #[serde(alias = "max_files")]
    pub max_files: usize,
    #[serde(alias = "max_nodes")]
    pub max_nodes: usize,
    #[serde(alias = "max_edges")]
    pub max_edges: usize,
    #[serde(alias = "time_budget_ms")]
    pub time_budget_ms: u64,
}

impl Default for GraphOptions {
    fn default() -> Self {
        GraphOptions {
            max_files: 200,
            max_nodes: 2_000,
            max_edges: 5_000,
            time_budget_ms: 25_000,
        }
    }
}

impl GraphOptions {
    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }

    /// Reject limits that make a run meaningless.
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.max_files == 0 {
            return Err(GraphError::InvalidRequest(
                "options.maxFiles must be at least 1".to_string(),
            ));
        }
        if self.time_budget_ms == 0 {
            return Err(GraphError::InvalidRequest(
                "options.timeBudgetMs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Persist and reuse global-mode results.
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig { enabled: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub limits: GraphOptions,
    pub cache: CacheConfig,
}

impl EngineConfig {
    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        toml::from_str(raw).context("Failed to parse engine config")
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(EngineConfig::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&raw)
    }

    /// Apply `ROOTWORK_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> anyhow::Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(v) = lookup("ROOTWORK_MAX_FILES") {
            self.limits.max_files = parse_var("ROOTWORK_MAX_FILES", &v)?;
        }
        if let Some(v) = lookup("ROOTWORK_MAX_NODES") {
            self.limits.max_nodes = parse_var("ROOTWORK_MAX_NODES", &v)?;
        }
        if let Some(v) = lookup("ROOTWORK_MAX_EDGES") {
            self.limits.max_edges = parse_var("ROOTWORK_MAX_EDGES", &v)?;
        }
        if let Some(v) = lookup("ROOTWORK_TIME_BUDGET_MS") {
            self.limits.time_budget_ms = parse_var("ROOTWORK_TIME_BUDGET_MS", &v)?;
        }
        if let Some(v) = lookup("ROOTWORK_CACHE") {
            self.cache.enabled = match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "on" | "yes" => true,
                "0" | "false" | "off" | "no" => false,
                other => anyhow::bail!("ROOTWORK_CACHE: expected a boolean, got `{other}`"),
            };
        }
        Ok(())
    }
}

fn parse_var<T>(key: &str, raw: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("{key}: invalid value `{raw}`"))
}
