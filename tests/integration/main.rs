//! Integration tests for Rootwork
//!
//! These tests drive a whole bundle through the generator and the CLI.

use std::fs;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use rootwork_core::{
    DependencyGraphResult, EdgeType, EngineConfig, GraphMode, RunStatus, WarningCode,
    global_graph_path,
};
use rootwork_engine::{
    BundleStore, FsBundleStore, GraphGenerator, GraphRequest, ScanSearch, SearchBackend,
};
use rootwork_indexer::{ImportExtractor, TreeSitterParser};
use tempfile::TempDir;

const BUNDLE: &str = "demo";

fn write(root: &Path, rel: &str, content: &str) {
    let full = root.join(BUNDLE).join(rel);
    fs::create_dir_all(full.parent().unwrap()).unwrap();
    fs::write(full, content).unwrap();
}

/// A bundle with two repositories in different languages.
fn create_bundle() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    write(
        root,
        "repos/acme/web/norm/src/app.tsx",
        r#"import React from 'react';
import { fetchOrders } from './api/orders';
import type { Order } from './types';

export function App() {
    const orders: Order[] = fetchOrders();
    return <ul>{orders.length}</ul>;
}
"#,
    );
    write(
        root,
        "repos/acme/web/norm/src/api/orders.ts",
        r#"import { Order } from '../types';
const http = require('./http');

export function fetchOrders(): Order[] {
    return http.get('/orders');
}
"#,
    );
    write(root, "repos/acme/web/norm/src/api/http.js", "module.exports = { get() { return []; } };\n");
    write(root, "repos/acme/web/norm/src/types.ts", "export interface Order { id: string }\n");
    write(root, "repos/acme/web/norm/node_modules/react/index.js", "module.exports = {};\n");

    write(
        root,
        "repos/acme/jobs/norm/src/jobs/sync.py",
        r#"from ..clients import orders
from . import helpers


def run_sync():
    data = orders.fetch_orders()
    return helpers.normalize(data)
"#,
    );
    write(root, "repos/acme/jobs/norm/src/clients/orders.py", "def fetch_orders():\n    return []\n");
    write(root, "repos/acme/jobs/norm/src/jobs/helpers.py", "def normalize(x):\n    return x\n");
    write(root, "repos/acme/jobs/norm/src/jobs/__init__.py", "");
    write(root, "repos/acme/jobs/norm/src/clients/__init__.py", "");

    temp_dir
}

fn generator(root: &Path) -> GraphGenerator {
    let store: Arc<dyn BundleStore> = Arc::new(FsBundleStore::new(root));
    let search: Arc<dyn SearchBackend> = Arc::new(ScanSearch::new(store.clone()));
    GraphGenerator::new(
        store,
        search,
        ImportExtractor::new(Arc::new(TreeSitterParser::default())),
        EngineConfig::default(),
    )
}

fn resolved_pairs(result: &DependencyGraphResult) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = result
        .facts
        .edges
        .iter()
        .filter(|e| e.edge_type == EdgeType::ImportsResolved)
        .map(|e| (e.from.clone(), e.to.clone()))
        .collect();
    pairs.sort();
    pairs.dedup();
    pairs
}

#[tokio::test]
async fn test_global_graph_across_repositories() {
    let temp_dir = create_bundle();
    let generator = generator(temp_dir.path());

    let result = generator.generate(GraphRequest::global(BUNDLE)).await.unwrap();
    assert_eq!(result.meta.mode, GraphMode::Global);
    assert_eq!(result.meta.status, RunStatus::Complete);

    let web = |p: &str| format!("file:repos/acme/web/norm/src/{p}");
    let jobs = |p: &str| format!("file:repos/acme/jobs/norm/src/{p}");
    let pairs = resolved_pairs(&result);
    for expected in [
        (web("app.tsx"), web("api/orders.ts")),
        (web("app.tsx"), web("types.ts")),
        (web("api/orders.ts"), web("types.ts")),
        (web("api/orders.ts"), web("api/http.js")),
        (jobs("jobs/sync.py"), jobs("clients/__init__.py")),
    ] {
        assert!(pairs.contains(&expected), "missing {expected:?} in {pairs:?}");
    }
    // Vendored trees are never scanned.
    assert!(result.facts.nodes.iter().all(|n| !n.id.contains("node_modules")));

    let cached = generator.generate(GraphRequest::global(BUNDLE)).await.unwrap();
    assert!(cached.has_warning(WarningCode::CacheHit));
    assert_eq!(cached.facts, result.facts);
}

#[tokio::test]
async fn test_targeted_graph_with_callers() {
    let temp_dir = create_bundle();
    let generator = generator(temp_dir.path());

    let result = generator
        .generate(GraphRequest::targeted(
            BUNDLE,
            "repos/acme/web/norm/src/api/orders.ts",
            Some("fetchOrders"),
        ))
        .await
        .unwrap();

    assert_eq!(result.meta.repo.as_deref(), Some("acme/web"));
    let calls: Vec<_> = result
        .facts
        .edges
        .iter()
        .filter(|e| e.edge_type == EdgeType::Calls)
        .collect();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].from, "symbol:App@repos/acme/web/norm/src/app.tsx");
    assert_eq!(
        calls[0].to,
        "symbol:fetchOrders@repos/acme/web/norm/src/api/orders.ts"
    );
    assert_eq!(calls[0].sources[0].range.start_line, 6);
    assert!(calls[0].sources[0].uri.starts_with("bundle://demo/repos/acme/web/norm/src/app.tsx#L6"));

    // The cache only ever holds global graphs.
    assert!(!global_graph_path(&temp_dir.path().join(BUNDLE).join("derived")).exists());
}

#[tokio::test]
async fn test_result_json_is_camel_case() {
    let temp_dir = create_bundle();
    let result = generator(temp_dir.path())
        .generate(GraphRequest::targeted(
            BUNDLE,
            "repos/acme/jobs/norm/src/jobs/sync.py",
            Some("run_sync"),
        ))
        .await
        .unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert!(json["meta"]["requestId"].is_string());
    assert_eq!(json["meta"]["mode"], "targeted");
    assert!(json["meta"]["budget"]["maxEdges"].is_u64());
    assert!(json["signals"]["stats"]["filesRead"].is_u64());
    let edge = &json["facts"]["edges"][0];
    assert!(edge["evidenceId"].is_string());
    assert!(edge["sources"][0]["snippetSha256"].is_string());
}

#[test]
fn test_cli_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_rootwork"))
        .arg("version")
        .output()
        .expect("Failed to execute command");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("rootwork v"));
}

#[test]
fn test_cli_graph_and_clear() {
    let temp_dir = create_bundle();
    let store = temp_dir.path().to_str().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_rootwork"))
        .args(["graph", BUNDLE, "--store", store, "--compact", "--max-edges", "2"])
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let result: DependencyGraphResult = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result.meta.status, RunStatus::Truncated);
    assert!(result.facts.edges.len() <= 2);

    let cache = global_graph_path(&temp_dir.path().join(BUNDLE).join("derived"));
    assert!(cache.exists());
    let output = Command::new(env!("CARGO_BIN_EXE_rootwork"))
        .args(["clear", BUNDLE, "--store", store])
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());
    assert!(!cache.exists());
}

#[test]
fn test_cli_reports_absolute_target() {
    let temp_dir = create_bundle();
    let output = Command::new(env!("CARGO_BIN_EXE_rootwork"))
        .args([
            "graph",
            BUNDLE,
            "--store",
            temp_dir.path().to_str().unwrap(),
            "--file",
            "/abs/app.tsx",
        ])
        .output()
        .expect("Failed to execute command");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("absolute"));
}
