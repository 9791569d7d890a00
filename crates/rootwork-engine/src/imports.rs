//! Import evidence: extraction, resolution and edge assembly for one file

use rootwork_core::{
    BundlePath, EdgeType, EvidenceItem, GraphMode, GraphNode, Method, SourceRef, file_node_id,
    module_node_id,
};
use rootwork_indexer::{ImportExtractor, PathIndex, ResolveContext, SourceLanguage};

use crate::run::GraphRun;
use crate::storage::{BundleStorage, RepoRef};

/// Upper bound for the confidence of a resolved import.
pub const RESOLVED_CONFIDENCE_CAP: f64 = 0.85;

/// Resolution is one heuristic hop beyond extraction.
pub const RESOLUTION_PENALTY: f64 = 0.05;

pub const RESOLUTION_NOTE: &str = "module resolution is best-effort";

/// A repository's path index plus its per-request resolution memo.
pub struct RepoIndex {
    pub repo: RepoRef,
    pub index: PathIndex,
    pub ctx: ResolveContext,
}

impl RepoIndex {
    /// List the repository's files and read every `go.mod` among them.
    pub async fn build(storage: &dyn BundleStorage, repo: &RepoRef) -> anyhow::Result<Self> {
        let files = storage.repo_files(repo)?;
        let mut builder = PathIndex::builder();
        for file in &files {
            if file == "go.mod" || file.ends_with("/go.mod") {
                match storage.read_file(&repo.file(file)).await {
                    Ok(content) => {
                        builder.add_go_mod(file, &content);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to read {}/{}: {}", repo, file, e);
                        builder.add_file(file);
                    }
                }
            } else {
                builder.add_file(file);
            }
        }
        let index = builder.build();
        tracing::debug!(
            "Indexed {}: {} files, {} go modules",
            repo,
            index.len(),
            index.go_module_count()
        );
        Ok(RepoIndex {
            repo: repo.clone(),
            index,
            ctx: ResolveContext::new(),
        })
    }

    pub fn resolve(&mut self, language: SourceLanguage, importer: &str, specifier: &str) -> Option<String> {
        language.resolve(importer, specifier, &self.index, &mut self.ctx)
    }
}

pub fn resolved_confidence(raw: f64) -> f64 {
    (raw - RESOLUTION_PENALTY).clamp(0.0, RESOLVED_CONFIDENCE_CAP)
}

/// Add the import evidence of `file` to the run.
///
/// Targeted runs record every `imports` edge plus resolved edges; global runs
/// record resolved edges only. Returns false once the budget stops the run.
pub async fn add_file_imports(
    run: &mut GraphRun,
    storage: &dyn BundleStorage,
    extractor: &ImportExtractor,
    repo_index: &mut RepoIndex,
    file: &BundlePath,
    content: &str,
) -> bool {
    let Some(language) = SourceLanguage::from_path(&file.rel_path) else {
        return true;
    };
    let file_path = file.to_string();
    let extraction = extractor.extract(&file_path, content).await;
    if extraction.fell_back {
        run.stats.parser_fallbacks += 1;
    }

    let from_id = file_node_id(&file_path);
    if run.graph.upsert_node(GraphNode::file(&file_path)).is_none() {
        return false;
    }

    let lines: Vec<&str> = content.lines().collect();
    for import in extraction.imports {
        if !run.graph.checkpoint() {
            return false;
        }
        let line = lines
            .get(import.range.start_line.saturating_sub(1) as usize)
            .copied()
            .unwrap_or_default();
        let source = SourceRef::new(
            &file_path,
            import.range,
            storage.uri(&file_path, &import.range),
            line,
        );

        if run.mode == GraphMode::Targeted {
            let module_id = module_node_id(&import.module);
            if run.graph.upsert_node(GraphNode::module(&import.module)).is_some() {
                run.graph.push_edge(EvidenceItem::edge(
                    EdgeType::Imports,
                    &from_id,
                    &module_id,
                    import.method,
                    import.confidence,
                    source.clone(),
                ));
            }
        }

        let Some(target_rel) = repo_index.resolve(language, &file.rel_path, &import.module) else {
            run.stats.unresolved_imports += 1;
            continue;
        };
        let target_path = file.with_rel_path(&target_rel).to_string();
        if target_path == file_path {
            continue;
        }
        if run.graph.upsert_node(GraphNode::file(&target_path)).is_none() {
            continue;
        }
        run.graph.push_edge(
            EvidenceItem::edge(
                EdgeType::ImportsResolved,
                &from_id,
                &file_node_id(&target_path),
                Method::Heuristic,
                resolved_confidence(import.confidence),
                source,
            )
            .with_note(RESOLUTION_NOTE)
            .with_note(format!("resolved `{}` to {}", import.module, target_rel)),
        );
    }
    !run.graph.budget().is_truncated()
}
