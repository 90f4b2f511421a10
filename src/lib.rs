//! Social Graph Crawler
//!
//! Crawls a social network API from a seed user and stores what it finds in
//! Neo4j:
//! - `vk`: API client with rate-limit retry, payload models
//! - `neo4j`: graph store (merge-by-id writes, analytics queries)
//! - `crawler`: bounded-depth traversal
//! - `analytics`: the post-crawl report
//! - `pipeline`: one full clear / crawl / analyze run

pub mod analytics;
pub mod crawler;
pub mod neo4j;
pub mod pipeline;
pub mod vk;


use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub api: ApiYamlConfig,
    pub neo4j: Neo4jYamlConfig,
    pub crawl: CrawlYamlConfig,
}

/// Remote API section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiYamlConfig {
    pub url: String,
    pub version: String,
    pub access_token: Option<String>,
    pub timeout_secs: u64,
    pub rate_limit_delay_ms: u64,
}

impl Default for ApiYamlConfig {
    fn default() -> Self {
        Self {
            url: "https://api.vk.com/method/".into(),
            version: "5.131".into(),
            access_token: None,
            timeout_secs: 30,
            rate_limit_delay_ms: 1000,
        }
    }
}

/// Neo4j configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Neo4jYamlConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
}

impl Default for Neo4jYamlConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".into(),
            user: "neo4j".into(),
            password: "neo4j".into(),
        }
    }
}

/// Crawl configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlYamlConfig {
    pub depth: i32,
    pub dedupe: bool,
}

impl Default for CrawlYamlConfig {
    fn default() -> Self {
        Self {
            depth: crawler::DEFAULT_DEPTH,
            dedupe: true,
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_version: String,
    pub access_token: String,
    pub api_timeout_secs: u64,
    pub rate_limit_delay_ms: u64,
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,
    pub crawl_depth: i32,
    pub crawl_dedupe: bool,
}

impl Config {
    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "crawler.yaml" in CWD. A missing file
    /// falls back to env vars / defaults. The access token has no default.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        let access_token = std::env::var("ACCESS_TOKEN")
            .ok()
            .or(yaml.api.access_token)
            .unwrap_or_default();
        if access_token.trim().is_empty() {
            bail!("ACCESS_TOKEN is not set (env var or api.access_token in the config file)");
        }

        Ok(Self {
            api_url: std::env::var("API_URL").unwrap_or(yaml.api.url),
            api_version: std::env::var("API_VERSION").unwrap_or(yaml.api.version),
            access_token,
            api_timeout_secs: env_parse("API_TIMEOUT_SECS").unwrap_or(yaml.api.timeout_secs),
            rate_limit_delay_ms: env_parse("RATE_LIMIT_DELAY_MS")
                .unwrap_or(yaml.api.rate_limit_delay_ms),
            neo4j_uri: std::env::var("NEO4J_URL").unwrap_or(yaml.neo4j.uri),
            neo4j_user: std::env::var("NEO4J_USER").unwrap_or(yaml.neo4j.user),
            neo4j_password: std::env::var("NEO4J_PASSWORD").unwrap_or(yaml.neo4j.password),
            crawl_depth: env_parse("CRAWL_DEPTH").unwrap_or(yaml.crawl.depth),
            crawl_dedupe: std::env::var("CRAWL_DEDUPE")
                .ok()
                .and_then(|s| parse_bool(&s))
                .unwrap_or(yaml.crawl.dedupe),
        })
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("crawler.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

fn env_parse<T: std::str::FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok().and_then(|s| s.trim().parse().ok())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub graph: Arc<dyn neo4j::GraphStore>,
    pub api: Arc<dyn vk::SocialApi>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state with all services initialized
    pub async fn new(config: Config) -> Result<Self> {
        let graph = Arc::new(
            neo4j::Neo4jClient::new(
                &config.neo4j_uri,
                &config.neo4j_user,
                &config.neo4j_password,
            )
            .await?,
        );

        let api = Arc::new(
            vk::VkClient::from_config(&config).context("Failed to create API client")?,
        );

        Ok(Self {
            graph,
            api,
            config: Arc::new(config),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
