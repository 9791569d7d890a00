//! Global mode: scan every code file in a bundle, with a cached result

use rootwork_core::{
    Budget, DependencyGraphResult, GraphMode, GraphOptions, Warning, WarningCode, load_graph,
    save_graph,
};
use rootwork_indexer::ImportExtractor;

use crate::imports::{RepoIndex, add_file_imports};
use crate::run::{GraphRun, RunPhase};
use crate::storage::BundleStorage;

/// Serve the cached global graph unless `force` is set or caching is off;
/// otherwise scan and persist.
pub async fn global_graph(
    storage: &dyn BundleStorage,
    extractor: &ImportExtractor,
    options: GraphOptions,
    force: bool,
    use_cache: bool,
) -> DependencyGraphResult {
    let derived = storage.derived_dir();
    let mut cache_warnings = Vec::new();

    if use_cache && !force {
        match load_graph(&derived) {
            Ok(Some(mut cached)) => {
                tracing::info!(
                    "[{}] Serving cached global graph from {}",
                    storage.bundle_id(),
                    cached.meta.generated_at
                );
                let message = format!(
                    "served cached global graph generated at {}; pass force to recompute",
                    cached.meta.generated_at
                );
                cached
                    .signals
                    .warnings
                    .push(Warning::new(WarningCode::CacheHit, message));
                return cached;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Ignoring unreadable graph cache: {:#}", e);
                cache_warnings.push(Warning::new(
                    WarningCode::CacheReadFailed,
                    format!("cached global graph was unreadable and was recomputed: {e}"),
                ));
            }
        }
    }

    let mut result = scan_bundle(storage, extractor, options).await;

    if use_cache {
        tracing::debug!("[{}] global graph: {}", storage.bundle_id(), RunPhase::PersistingCache);
        if let Err(e) = save_graph(&result, &derived) {
            tracing::warn!("Failed to persist global graph cache: {:#}", e);
            cache_warnings.push(Warning::new(
                WarningCode::CacheWriteFailed,
                format!("global graph could not be cached: {e}"),
            ));
        }
    }
    result.signals.warnings.extend(cache_warnings);
    result
}

/// Walk repositories in order and record resolved imports between bundle files.
pub async fn scan_bundle(
    storage: &dyn BundleStorage,
    extractor: &ImportExtractor,
    options: GraphOptions,
) -> DependencyGraphResult {
    let mut run = GraphRun::new(storage.bundle_id(), GraphMode::Global, Budget::new(options));

    let repos = match storage.list_repos().await {
        Ok(repos) => repos,
        Err(e) => {
            tracing::warn!("Failed to list repositories: {:#}", e);
            run.warn(
                WarningCode::FileReadFailed,
                format!("repositories could not be listed: {e}"),
            );
            Vec::new()
        }
    };

    'repos: for repo in repos {
        let mut repo_index: Option<RepoIndex> = None;
        for rel in storage.code_files(&repo) {
            if !run.graph.checkpoint() || !run.graph.admit_file() {
                break 'repos;
            }
            if repo_index.is_none() {
                match RepoIndex::build(storage, &repo).await {
                    Ok(index) => repo_index = Some(index),
                    Err(e) => {
                        tracing::warn!("Skipping {}: {:#}", repo, e);
                        run.warn(
                            WarningCode::FileReadFailed,
                            format!("repository {repo} could not be indexed: {e}"),
                        );
                        continue 'repos;
                    }
                }
            }
            let Some(index) = repo_index.as_mut() else {
                continue 'repos;
            };

            let path = repo.file(&rel);
            let content = match storage.read_file(&path).await {
                Ok(content) => content,
                Err(e) => {
                    run.record_read_failure(&path.to_string(), &e);
                    continue;
                }
            };
            run.stats.files_read += 1;
            run.enter(RunPhase::ResolvingImports);
            if !add_file_imports(&mut run, storage, extractor, index, &path, &content).await {
                break 'repos;
            }
        }
    }

    run.finish(None, None)
}
