//! Unit tests for rootwork-core module

use crate::*;
use std::collections::HashMap;

fn source(file: &str, line: u32) -> SourceRef {
    SourceRef::new(
        file,
        SourceRange::on_line(line, 1, 10),
        format!("bundle://b/{file}#L{line}"),
        "import { a } from './a';",
    )
}

fn import_edge(from_file: &str, module: &str, line: u32) -> EvidenceItem {
    EvidenceItem::edge(
        EdgeType::Imports,
        &file_node_id(from_file),
        &module_node_id(module),
        Method::Exact,
        0.9,
        source(from_file, line),
    )
}

fn options(max_nodes: usize, max_edges: usize) -> GraphOptions {
    GraphOptions {
        max_files: 10,
        max_nodes,
        max_edges,
        time_budget_ms: 60_000,
    }
}

fn sample_result() -> DependencyGraphResult {
    let mut graph = EvidenceGraph::new(Budget::new(GraphOptions::default()));
    graph.upsert_node(GraphNode::file("repos/o/r/norm/a.ts"));
    graph.upsert_node(GraphNode::module("./b"));
    graph.push_edge(import_edge("repos/o/r/norm/a.ts", "./b", 1));
    let (nodes, edges, budget) = graph.into_parts();
    DependencyGraphResult {
        meta: GraphMeta {
            request_id: "req-1".to_string(),
            generated_at: "2026-01-01T00:00:00Z".to_string(),
            elapsed_ms: 3,
            bundle_id: "b".to_string(),
            mode: GraphMode::Global,
            repo: None,
            target: None,
            status: RunStatus::Complete,
            budget: budget.report(),
        },
        facts: GraphFacts { nodes, edges },
        signals: GraphSignals {
            stats: GraphStats {
                files_read: 1,
                import_edges: 1,
                ..GraphStats::default()
            },
            warnings: vec![Warning::new(WarningCode::CacheHit, "served from cache")],
        },
    }
}

#[test]
fn test_node_ids_are_pure_functions_of_identity() {
    assert_eq!(GraphNode::file("a/b.ts").id, "file:a/b.ts");
    assert_eq!(GraphNode::symbol("run", "a/b.ts").id, "symbol:run@a/b.ts");
    assert_eq!(GraphNode::module("./x").id, "module:./x");
    assert_eq!(GraphNode::file("a/b.ts"), GraphNode::file("a/b.ts"));
}

#[test]
fn test_evidence_id_is_deterministic() {
    let a = import_edge("repos/o/r/norm/a.ts", "./b", 3);
    let b = import_edge("repos/o/r/norm/a.ts", "./b", 3);
    assert_eq!(a.evidence_id, b.evidence_id);
    assert_eq!(a.evidence_id.len(), 24);
    assert!(a.evidence_id.chars().all(|c| c.is_ascii_hexdigit()));

    let moved = import_edge("repos/o/r/norm/a.ts", "./b", 4);
    assert_ne!(a.evidence_id, moved.evidence_id);

    let other_type = evidence_id(
        EdgeType::ImportsResolved,
        &a.from,
        &a.to,
        &a.sources[0].discriminators(),
    );
    assert_ne!(a.evidence_id, other_type);
}

#[test]
fn test_snippet_is_collapsed_clamped_and_hashed() {
    assert_eq!(clamp_snippet("  use   crate::a;\t// x "), "use crate::a; // x");

    let long = "é".repeat(300);
    let clamped = clamp_snippet(&long);
    assert_eq!(clamped.chars().count(), SNIPPET_MAX_CHARS);

    let sref = source("a.ts", 1);
    assert_eq!(sref.snippet, "import { a } from './a';");
    assert_eq!(sref.snippet_sha256, sha256_hex(sref.snippet.as_bytes()));
    assert_eq!(sref.snippet_sha256.len(), 64);
}

#[test]
fn test_confidence_is_clamped() {
    let edge = EvidenceItem::edge(
        EdgeType::Calls,
        "file:a",
        "symbol:f@b",
        Method::Heuristic,
        1.7,
        source("a", 1),
    );
    assert_eq!(edge.confidence, 1.0);
}

#[test]
fn test_graph_dedupes_nodes_and_edges() {
    let mut graph = EvidenceGraph::new(Budget::new(options(100, 100)));
    let first = graph.upsert_node(GraphNode::file("a.ts"));
    let again = graph.upsert_node(GraphNode::file("a.ts"));
    assert_eq!(first, again);
    graph.upsert_node(GraphNode::module("./b"));
    assert_eq!(graph.node_count(), 2);

    assert!(graph.push_edge(import_edge("a.ts", "./b", 1)));
    assert!(!graph.push_edge(import_edge("a.ts", "./b", 1)));
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.edges_from("file:a.ts").len(), 1);
    assert!(!graph.budget().is_truncated());
}

#[test]
fn test_edge_with_unknown_endpoint_is_dropped() {
    let mut graph = EvidenceGraph::new(Budget::new(options(100, 100)));
    graph.upsert_node(GraphNode::file("a.ts"));
    assert!(!graph.push_edge(import_edge("a.ts", "./missing", 1)));
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_edge_budget_is_never_exceeded() {
    let mut graph = EvidenceGraph::new(Budget::new(options(100, 3)));
    graph.upsert_node(GraphNode::file("a.ts"));
    for i in 0..5 {
        let module = format!("./m{i}");
        graph.upsert_node(GraphNode::module(&module));
        graph.push_edge(import_edge("a.ts", &module, i + 1));
    }
    assert_eq!(graph.edge_count(), 3);
    assert!(graph.budget().is_truncated());
    assert!(graph.budget().truncated_reason().unwrap().contains("maxEdges"));
    assert!(!graph.checkpoint());
}

#[test]
fn test_reaching_edge_limit_exactly_marks_truncated() {
    let mut graph = EvidenceGraph::new(Budget::new(options(100, 1)));
    graph.upsert_node(GraphNode::file("a.ts"));
    graph.upsert_node(GraphNode::module("./b"));
    assert!(graph.push_edge(import_edge("a.ts", "./b", 1)));
    assert_eq!(graph.edge_count(), 1);
    assert!(graph.budget().report().truncated);
}

#[test]
fn test_node_budget_refuses_new_nodes() {
    let mut graph = EvidenceGraph::new(Budget::new(options(2, 100)));
    assert!(graph.upsert_node(GraphNode::file("a.ts")).is_some());
    assert!(graph.upsert_node(GraphNode::file("b.ts")).is_some());
    assert!(graph.upsert_node(GraphNode::file("c.ts")).is_none());
    // existing nodes are still reachable
    assert!(graph.upsert_node(GraphNode::file("a.ts")).is_some());
    assert_eq!(graph.node_count(), 2);
    assert!(graph.budget().truncated_reason().unwrap().contains("maxNodes"));
}

#[test]
fn test_budget_file_admission_and_first_reason_wins() {
    let mut budget = Budget::new(GraphOptions {
        max_files: 2,
        ..GraphOptions::default()
    });
    assert!(budget.admit_file());
    assert!(budget.admit_file());
    assert!(!budget.admit_file());
    assert_eq!(budget.files_admitted(), 2);
    budget.truncate("something else");
    assert_eq!(budget.truncated_reason(), Some("maxFiles (2) reached"));
}

#[test]
fn test_budget_time_limit() {
    let mut budget = Budget::new(GraphOptions {
        time_budget_ms: 1,
        ..GraphOptions::default()
    });
    std::thread::sleep(std::time::Duration::from_millis(10));
    assert!(!budget.checkpoint(0, 0));
    assert!(budget.truncated_reason().unwrap().contains("time budget"));
}

#[test]
fn test_bundle_path_parsing() {
    let parsed = BundlePath::parse("repos/acme/widgets/norm/src/lib.rs").unwrap();
    assert_eq!(parsed.owner, "acme");
    assert_eq!(parsed.repo, "widgets");
    assert_eq!(parsed.rel_path, "src/lib.rs");
    assert_eq!(parsed.repo_key(), "acme/widgets");
    assert_eq!(parsed.to_string(), "repos/acme/widgets/norm/src/lib.rs");
}

#[test]
fn test_bundle_path_error_variants() {
    let windows = BundlePath::parse("C:\\Users\\x\\repo\\a.ts").unwrap_err();
    assert!(matches!(windows, GraphError::AbsolutePath { .. }));
    assert_eq!(windows.code(), "ABSOLUTE_PATH");

    let posix = BundlePath::parse("/home/x/repo/a.ts").unwrap_err();
    assert!(matches!(posix, GraphError::AbsolutePath { .. }));

    for bad in [
        "src/a.ts",
        "repos/acme/widgets/src/a.ts",
        "repos/acme/widgets/norm",
        "repos/acme/widgets/norm/../a.ts",
        "repos\\acme\\widgets\\norm\\a.ts",
    ] {
        let err = BundlePath::parse(bad).unwrap_err();
        assert!(
            matches!(err, GraphError::UnrecognizedPath { .. }),
            "expected unrecognized for {bad}"
        );
    }
}

#[test]
fn test_result_serialization_field_names() {
    let result = sample_result();
    let value = serde_json::to_value(&result).unwrap();

    assert!(value["meta"]["requestId"].is_string());
    assert_eq!(value["meta"]["mode"], "global");
    assert_eq!(value["meta"]["budget"]["maxEdges"], 5_000);
    assert_eq!(value["facts"]["nodes"][0]["kind"], "file");
    let edge = &value["facts"]["edges"][0];
    assert_eq!(edge["type"], "imports");
    assert_eq!(edge["kind"], "edge");
    assert_eq!(edge["method"], "exact");
    assert!(edge["evidenceId"].is_string());
    assert!(edge["sources"][0]["snippetSha256"].is_string());
    assert_eq!(edge["sources"][0]["range"]["startLine"], 1);
    assert_eq!(value["signals"]["stats"]["filesRead"], 1);
    assert_eq!(value["signals"]["warnings"][0]["code"], "CACHE_HIT");

    let back: DependencyGraphResult = serde_json::from_value(value).unwrap();
    assert_eq!(back, result);
}

#[test]
fn test_config_from_toml_and_overrides() {
    let mut config = EngineConfig::from_toml_str(
        r#"
[limits]
max_files = 10
maxEdges = 50

[cache]
enabled = false
"#,
    )
    .unwrap();
    assert_eq!(config.limits.max_files, 10);
    assert_eq!(config.limits.max_edges, 50);
    assert_eq!(config.limits.max_nodes, GraphOptions::default().max_nodes);
    assert!(!config.cache.enabled);

    let env: HashMap<&str, &str> = [("ROOTWORK_MAX_NODES", "7"), ("ROOTWORK_CACHE", "on")]
        .into_iter()
        .collect();
    config
        .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
        .unwrap();
    assert_eq!(config.limits.max_nodes, 7);
    assert!(config.cache.enabled);

    let err = config.apply_overrides(|k| (k == "ROOTWORK_MAX_FILES").then(|| "lots".to_string()));
    assert!(err.is_err());
}

#[test]
fn test_options_validation() {
    assert!(GraphOptions::default().validate().is_ok());
    let zero_files = GraphOptions {
        max_files: 0,
        ..GraphOptions::default()
    };
    assert!(matches!(
        zero_files.validate(),
        Err(GraphError::InvalidRequest(_))
    ));
}

#[test]
fn test_cache_roundtrip_and_corruption() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let derived = temp_dir.path();

    assert!(load_graph(derived).unwrap().is_none());

    let result = sample_result();
    let path = save_graph(&result, derived).unwrap();
    assert_eq!(path, global_graph_path(derived));
    assert_eq!(load_graph(derived).unwrap(), Some(result));

    std::fs::write(&path, "{ not json").unwrap();
    assert!(load_graph(derived).is_err());

    clear_cache(derived).unwrap();
    assert!(!cache_dir(derived).exists());
}

#[test]
fn test_cache_writers_use_distinct_temp_files() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let derived = temp_dir.path();

    let first = sample_result();
    let mut second = sample_result();
    second.meta.request_id = "req-2".to_string();
    second.meta.elapsed_ms = 9;

    // A stale temp file from an interrupted writer is left alone.
    ensure_cache_dir(derived).unwrap();
    let stale = cache_dir(derived).join("global.json.req-1.tmp.stale");
    std::fs::write(&stale, "partial").unwrap();

    save_graph(&first, derived).unwrap();
    save_graph(&second, derived).unwrap();
    assert_eq!(load_graph(derived).unwrap(), Some(second));

    let mut entries: Vec<String> = std::fs::read_dir(cache_dir(derived))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    entries.sort();
    assert_eq!(entries, vec!["global.json", "global.json.req-1.tmp.stale"]);
}

#[test]
fn test_node_range_and_attrs_serialize() {
    let node = GraphNode::symbol("run", "repos/o/r/norm/a.py")
        .with_range(SourceRange::on_line(4, 5, 3))
        .with_attr("language", "python");
    let json = serde_json::to_value(&node).unwrap();
    assert_eq!(json["range"]["startLine"], 4);
    assert_eq!(json["range"]["endCol"], 8);
    assert_eq!(json["attrs"]["language"], "python");
    assert!(serde_json::to_value(GraphNode::file("repos/o/r/norm/a.py")).unwrap()["attrs"].is_null());
}
