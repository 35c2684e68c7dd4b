use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub context: ContextConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OracleConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}
fn default_max_output_tokens() -> u32 {
    1000
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    1
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    #[serde(default = "default_max_requests")]
    pub max_requests: usize,
    #[serde(default = "default_window_secs")]
    pub window_secs: i64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

fn default_max_requests() -> usize {
    100
}
fn default_window_secs() -> i64 {
    3600
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContextConfig {
    #[serde(default = "default_window_turns")]
    pub window_turns: usize,
    #[serde(default = "default_answer_prefix_chars")]
    pub answer_prefix_chars: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            window_turns: default_window_turns(),
            answer_prefix_chars: default_answer_prefix_chars(),
        }
    }
}

fn default_window_turns() -> usize {
    3
}
fn default_answer_prefix_chars() -> usize {
    300
}

impl Config {
    /// A minimal config for tests and tooling that never reads a real
    /// config file.
    pub fn minimal() -> Self {
        Self {
            db: DbConfig {
                path: PathBuf::from(":memory:"),
            },
            server: ServerConfig {
                bind: "127.0.0.1:7310".to_string(),
            },
            oracle: OracleConfig::default(),
            rate_limit: RateLimitConfig::default(),
            context: ContextConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.rate_limit.max_requests == 0 {
        anyhow::bail!("rate_limit.max_requests must be > 0");
    }
    if config.rate_limit.window_secs <= 0 {
        anyhow::bail!("rate_limit.window_secs must be > 0");
    }
    if config.oracle.max_output_tokens == 0 {
        anyhow::bail!("oracle.max_output_tokens must be > 0");
    }
    if config.context.window_turns == 0 {
        anyhow::bail!("context.window_turns must be > 0");
    }

    Ok(config)
}
