//! Rootwork CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "rootwork")]
#[command(about = "Evidence-backed dependency graphs for source bundles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding one sub-directory per bundle
    #[arg(short, long, default_value = ".", global = true)]
    store: PathBuf,

    /// Engine config file (defaults to rootwork.toml in the current directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a dependency graph and print it as JSON
    Graph {
        /// Bundle id under the store directory
        bundle: String,

        /// Bundle-relative target file (repos/<owner>/<repo>/norm/<path>); omit for a global graph
        #[arg(short, long)]
        file: Option<String>,

        /// Symbol defined in the target file whose callers should be found
        #[arg(long, requires = "file")]
        symbol: Option<String>,

        /// Recompute the global graph even if a cached one exists
        #[arg(long)]
        force: bool,

        #[arg(long)]
        max_files: Option<usize>,

        #[arg(long)]
        max_nodes: Option<usize>,

        #[arg(long)]
        max_edges: Option<usize>,

        #[arg(long)]
        time_budget_ms: Option<u64>,

        /// Use regex extraction only
        #[arg(long)]
        no_parser: bool,

        /// Print compact JSON
        #[arg(long)]
        compact: bool,
    },
    /// Remove the cached global graph of a bundle
    Clear {
        bundle: String,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the JSON document
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "rootwork={log_level},rootwork_core={log_level},rootwork_indexer={log_level},rootwork_engine={log_level}"
        )))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Graph {
            bundle,
            file,
            symbol,
            force,
            max_files,
            max_nodes,
            max_edges,
            time_budget_ms,
            no_parser,
            compact,
        } => {
            let args = commands::GraphArgs {
                bundle,
                file,
                symbol,
                force,
                limits: commands::LimitOverrides {
                    max_files,
                    max_nodes,
                    max_edges,
                    time_budget_ms,
                },
                no_parser,
                compact,
            };
            commands::graph(cli.store, cli.config, args).await
        }
        Commands::Clear { bundle } => commands::clear(cli.store, &bundle),
        Commands::Version => {
            println!("rootwork v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
