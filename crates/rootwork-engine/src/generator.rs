//! Graph generator: entry point for targeted and global requests

use std::sync::Arc;

use rootwork_core::{
    Budget, BundlePath, DependencyGraphResult, EngineConfig, GraphError, GraphMode, GraphNode,
    TargetRef,
};
use rootwork_indexer::{ImportExtractor, SourceLanguage};

use crate::callers::{definition_range, discover_callers};
use crate::global::global_graph;
use crate::imports::{RepoIndex, add_file_imports};
use crate::request::GraphRequest;
use crate::run::{GraphRun, RunPhase};
use crate::search::SearchBackend;
use crate::storage::{BundleStorage, BundleStore, RepoRef};

/// Builds dependency graphs for bundles held by a [`BundleStore`].
///
/// Holds no per-request state; one generator can serve concurrent requests.
pub struct GraphGenerator {
    store: Arc<dyn BundleStore>,
    search: Arc<dyn SearchBackend>,
    extractor: ImportExtractor,
    config: EngineConfig,
}

impl GraphGenerator {
    pub fn new(
        store: Arc<dyn BundleStore>,
        search: Arc<dyn SearchBackend>,
        extractor: ImportExtractor,
        config: EngineConfig,
    ) -> Self {
        GraphGenerator {
            store,
            search,
            extractor,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub async fn generate(&self, request: GraphRequest) -> Result<DependencyGraphResult, GraphError> {
        let options = request.options.unwrap_or(self.config.limits);
        options.validate()?;
        if request.bundle_id.trim().is_empty() {
            return Err(GraphError::InvalidRequest("bundleId must not be empty".to_string()));
        }

        let storage = match self.store.open(&request.bundle_id).await {
            Ok(Some(storage)) => storage,
            Ok(None) => return Err(GraphError::BundleNotFound(request.bundle_id)),
            Err(e) => {
                tracing::warn!("Failed to open bundle {}: {:#}", request.bundle_id, e);
                return Err(GraphError::BundleNotFound(request.bundle_id));
            }
        };

        match request.target {
            Some(target) => self.targeted(storage.as_ref(), target, Budget::new(options)).await,
            None => {
                tracing::info!("[{}] Generating global graph", request.bundle_id);
                Ok(global_graph(
                    storage.as_ref(),
                    &self.extractor,
                    options,
                    request.force,
                    self.config.cache.enabled,
                )
                .await)
            }
        }
    }

    async fn targeted(
        &self,
        storage: &dyn BundleStorage,
        target: TargetRef,
        budget: Budget,
    ) -> Result<DependencyGraphResult, GraphError> {
        let path = BundlePath::parse(&target.file)?;
        let file_path = path.to_string();
        tracing::info!(
            "[{}] Generating targeted graph for {}{}",
            storage.bundle_id(),
            file_path,
            target
                .symbol
                .as_deref()
                .map(|s| format!(" ({s})"))
                .unwrap_or_default()
        );

        let content = match storage.read_file(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(GraphError::TargetNotFound {
                    bundle_id: storage.bundle_id().to_string(),
                    path: file_path,
                });
            }
            Err(e) => {
                return Err(GraphError::TargetUnreadable {
                    path: file_path,
                    source: e,
                });
            }
        };

        let mut run = GraphRun::new(storage.bundle_id(), GraphMode::Targeted, budget);
        if run.graph.admit_file() {
            run.stats.files_read += 1;
        }
        run.remember(&path, &content);

        let repo = RepoRef::of(&path);
        let mut repo_index = match RepoIndex::build(storage, &repo).await {
            Ok(index) => index,
            Err(e) => {
                tracing::warn!("Failed to index {}: {:#}", repo, e);
                return Err(GraphError::TargetNotFound {
                    bundle_id: storage.bundle_id().to_string(),
                    path: file_path,
                });
            }
        };

        run.graph.upsert_node(GraphNode::file(&file_path));
        if let Some(symbol) = target.symbol.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            run.graph.upsert_node(target_symbol_node(symbol, &path, &content));
        }

        run.enter(RunPhase::ResolvingImports);
        add_file_imports(
            &mut run,
            storage,
            &self.extractor,
            &mut repo_index,
            &path,
            &content,
        )
        .await;

        if !run.graph.budget().is_truncated() {
            discover_callers(
                &mut run,
                storage,
                self.search.as_ref(),
                &path,
                target.symbol.as_deref(),
            )
            .await;
        }

        Ok(run.finish(Some(path.repo_key()), Some(target)))
    }
}

/// The target symbol, placed at its declaration when one is found.
fn target_symbol_node(symbol: &str, path: &BundlePath, content: &str) -> GraphNode {
    let mut node = GraphNode::symbol(symbol, &path.to_string());
    if let Some(language) = SourceLanguage::from_path(&path.rel_path) {
        node = node.with_attr("language", language.as_str());
    }
    if let Some(range) = definition_range(content, symbol) {
        node = node.with_range(range);
    }
    node
}
