//! One full run: clear, crawl, analyze

use crate::analytics::AnalyticsReport;
use crate::crawler::{CrawlOptions, CrawlStats, Crawler};
use crate::neo4j::models::GraphCounts;
use crate::{AppState, Config};
use anyhow::{Context, Result};
use serde::Serialize;

/// Parameters of a single run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub seed_user_id: i64,
    pub depth: i32,
    pub dedupe: bool,
    /// Clear the graph before crawling
    pub clear: bool,
}

impl RunOptions {
    /// Options for crawling `seed_user_id` with the configured depth and dedupe, clearing first
    pub fn from_config(seed_user_id: i64, config: &Config) -> Self {
        Self {
            seed_user_id,
            depth: config.crawl_depth,
            dedupe: config.crawl_dedupe,
            clear: true,
        }
    }
}

/// Everything a run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub crawl: CrawlStats,
    pub counts: GraphCounts,
    pub report: AnalyticsReport,
}

/// Run the whole pipeline against the services in `state`.
pub async fn run(state: &AppState, options: &RunOptions) -> Result<RunSummary> {
    if options.clear {
        state
            .graph
            .clear_all()
            .await
            .context("Could not start from an empty graph")?;
    }

    tracing::info!(
        seed = options.seed_user_id,
        depth = options.depth,
        dedupe = options.dedupe,
        "Starting crawl"
    );
    let crawler = Crawler::new(
        state.api.clone(),
        state.graph.clone(),
        CrawlOptions {
            dedupe: options.dedupe,
        },
    );
    let crawl = crawler.visit(options.seed_user_id, options.depth).await?;

    let counts = state.graph.counts().await?;
    tracing::info!(
        visited = crawl.persons_visited,
        skipped = crawl.persons_skipped,
        failed = crawl.profiles_failed,
        api_calls = crawl.api_calls,
        persons = counts.persons,
        groups = counts.groups,
        follows = counts.follows,
        subscriptions = counts.subscriptions,
        "Crawl saved to the graph"
    );

    let report = AnalyticsReport::collect(state.graph.as_ref()).await?;
    report.log();

    Ok(RunSummary {
        crawl,
        counts,
        report,
    })
}
