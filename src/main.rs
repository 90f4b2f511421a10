//! Social Graph Crawler - Main Binary
//!
//! Crawls the social graph around a seed user into Neo4j and logs analytics.

use anyhow::{Context, Result};
use clap::Parser;
use social_graph_crawler::pipeline::{self, RunOptions};
use social_graph_crawler::{AppState, Config};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_SEED_USER: i64 = 274881868;

#[derive(Parser)]
#[command(name = "crawler")]
#[command(about = "Crawl a social graph into Neo4j and report on it")]
struct Cli {
    /// Seed user id
    #[arg(long, default_value_t = DEFAULT_SEED_USER)]
    user_id: i64,

    /// Hops to explore from the seed (overrides config)
    #[arg(long)]
    depth: Option<i32>,

    /// Log filter, e.g. "debug" or "info,social_graph_crawler=trace" (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// YAML config file
    #[arg(long, default_value = "crawler.yaml")]
    config: PathBuf,

    /// Re-explore users on every path that reaches them
    #[arg(long)]
    no_dedupe: bool,

    /// Debugging aid: keep the existing graph instead of clearing it first
    #[arg(long)]
    keep_graph: bool,

    /// Print the analytics report as JSON on stdout
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// Config defaults with the command-line overrides applied
    fn run_options(&self, config: &Config) -> RunOptions {
        let mut options = RunOptions::from_config(self.user_id, config);
        if let Some(depth) = self.depth {
            options.depth = depth;
        }
        options.dedupe &= !self.no_dedupe;
        options.clear = !self.keep_graph;
        options
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_level.as_deref(), cli.log_file.as_deref())?;

    let config = Config::from_yaml_and_env(Some(cli.config.as_path()))?;
    let state = AppState::new(config).await?;
    tracing::info!("Connected to Neo4j");

    let options = cli.run_options(&state.config);

    let summary = pipeline::run(&state, &options).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

/// Install the global subscriber; the returned guard flushes file logs on drop.
fn init_tracing(level: Option<&str>, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level.to_lowercase())
            .with_context(|| format!("Invalid log level: {}", level))?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "info,social_graph_crawler=info".into()),
    };

    let Some(path) = log_file else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();

    Ok(Some(guard))
}
