//! CLI command implementations

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use rootwork_core::{CONFIG_FILE, EngineConfig, GraphOptions};
use rootwork_engine::{
    BundleStore, FsBundleStore, GraphGenerator, GraphRequest, ScanSearch, SearchBackend,
};
use rootwork_indexer::{ImportExtractor, TreeSitterParser};

/// Per-invocation limit overrides; unset fields keep the configured value.
#[derive(Debug, Default)]
pub struct LimitOverrides {
    pub max_files: Option<usize>,
    pub max_nodes: Option<usize>,
    pub max_edges: Option<usize>,
    pub time_budget_ms: Option<u64>,
}

impl LimitOverrides {
    fn apply(&self, mut options: GraphOptions) -> GraphOptions {
        if let Some(v) = self.max_files {
            options.max_files = v;
        }
        if let Some(v) = self.max_nodes {
            options.max_nodes = v;
        }
        if let Some(v) = self.max_edges {
            options.max_edges = v;
        }
        if let Some(v) = self.time_budget_ms {
            options.time_budget_ms = v;
        }
        options
    }
}

pub struct GraphArgs {
    pub bundle: String,
    pub file: Option<String>,
    pub symbol: Option<String>,
    pub force: bool,
    pub limits: LimitOverrides,
    pub no_parser: bool,
    pub compact: bool,
}

fn load_config(config: Option<PathBuf>) -> anyhow::Result<EngineConfig> {
    let path = config.unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let mut config = EngineConfig::load(&path)?;
    config.apply_env()?;
    Ok(config)
}

pub async fn graph(store_root: PathBuf, config: Option<PathBuf>, args: GraphArgs) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let options = args.limits.apply(config.limits);

    let store: Arc<dyn BundleStore> = Arc::new(FsBundleStore::new(&store_root));
    let search: Arc<dyn SearchBackend> = Arc::new(ScanSearch::new(store.clone()));
    let extractor = if args.no_parser {
        ImportExtractor::heuristic_only()
    } else {
        ImportExtractor::new(Arc::new(TreeSitterParser::default()))
    };
    let generator = GraphGenerator::new(store, search, extractor, config);

    let request = match args.file {
        Some(file) => GraphRequest::targeted(&args.bundle, &file, args.symbol.as_deref()),
        None => GraphRequest::global(&args.bundle),
    }
    .with_options(options)
    .forced(args.force);

    let result = generator
        .generate(request)
        .await
        .with_context(|| format!("[{}] graph request failed", args.bundle))?;

    let json = if args.compact {
        serde_json::to_string(&result)?
    } else {
        serde_json::to_string_pretty(&result)?
    };
    println!("{json}");
    Ok(())
}

pub fn clear(store_root: PathBuf, bundle_id: &str) -> anyhow::Result<()> {
    let store = FsBundleStore::new(&store_root);
    let bundle = store
        .bundle(bundle_id)
        .with_context(|| format!("bundle `{}` not found under {}", bundle_id, store_root.display()))?;

    tracing::info!("Clearing graph cache for bundle {}", bundle_id);
    rootwork_core::clear_cache(&bundle.dir().join("derived"))?;
    tracing::info!("Cache cleared");
    Ok(())
}
