use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::runner::apifox::ApifoxSettings;

/// Environment variable consulted for the webhook URL when neither the CLI
/// nor the config file sets one.
pub const WEBHOOK_ENV: &str = "APIFOX_CI_WEBHOOK";

pub const DEFAULT_CONFIG_PATH: &str = "apifox-ci.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "apifox-ci",
    version,
    about = "Run Apifox test suites and post a summary to a chat webhook"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: apifox-ci.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Append per-suite JSONL events to this file
    #[arg(long, global = true)]
    pub trace_file: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every configured suite and notify
    Run {
        /// Suite to run; repeat to run several. Replaces the configured list.
        #[arg(long = "suite")]
        suites: Vec<String>,

        /// Webhook URL (overrides config and environment)
        #[arg(long)]
        webhook: Option<String>,

        /// Print the card JSON instead of sending it
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Directory the Apifox CLI writes reports into
        #[arg(long)]
        report_dir: Option<String>,

        /// Per-suite timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Summarize existing JSON reports without running anything
    Analyse {
        /// Report names or paths (`.json` is appended when missing)
        #[arg(required = true)]
        reports: Vec<String>,

        /// Also send the notification
        #[arg(long, default_value_t = false)]
        notify: bool,

        /// Webhook URL (overrides config and environment)
        #[arg(long)]
        webhook: Option<String>,

        /// Print the card JSON instead of sending it
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Directory relative report names are looked up in
        #[arg(long)]
        report_dir: Option<String>,
    },

    /// Print the webhook card that existing reports would produce
    Card {
        /// Report names or paths (`.json` is appended when missing)
        #[arg(required = true)]
        reports: Vec<String>,

        /// Directory relative report names are looked up in
        #[arg(long)]
        report_dir: Option<String>,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `apifox-ci.yaml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Suite identifiers passed to `apifox run`, in run order
    #[serde(default)]
    pub suites: Vec<String>,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default = "default_bin")]
    pub bin: String,

    #[serde(default = "default_reporters")]
    pub reporters: String,

    #[serde(default = "default_report_dir")]
    pub report_dir: String,

    pub working_dir: Option<String>,

    pub timeout_secs: Option<u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            bin: default_bin(),
            reporters: default_reporters(),
            report_dir: default_report_dir(),
            working_dir: None,
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

// Serde default helpers
fn default_bin() -> String { "apifox".to_string() }
fn default_reporters() -> String { "json,cli".to_string() }
fn default_report_dir() -> String { "apifox-reports".to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if the file is missing;
/// a malformed file is reported and also falls back to defaults.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    match std::fs::read_to_string(config_path) {
        Ok(content) => parse_config(&content).unwrap_or_else(|e| {
            tracing::warn!(path = config_path, error = %e, "malformed config file; using defaults");
            AppConfig::default()
        }),
        Err(_) => {
            tracing::debug!(path = config_path, "no config file; using defaults");
            AppConfig::default()
        }
    }
}

pub fn parse_config(content: &str) -> Result<AppConfig, serde_yaml::Error> {
    // An empty file deserializes to null rather than an empty mapping.
    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    serde_yaml::from_str(content)
}

// ============================================================================
// Config Builders (merge CLI args with config file)
// ============================================================================

/// Build runner settings from the config file plus CLI overrides.
pub fn build_runner_settings(
    config: &RunnerConfig,
    report_dir: Option<&str>,
    timeout_secs: Option<u64>,
) -> ApifoxSettings {
    ApifoxSettings {
        bin: config.bin.clone(),
        reporters: config.reporters.clone(),
        report_dir: PathBuf::from(report_dir.unwrap_or(&config.report_dir)),
        working_dir: config.working_dir.as_ref().map(PathBuf::from),
        timeout: timeout_secs.or(config.timeout_secs).map(Duration::from_secs),
    }
}

/// Directory holding reports for `analyse` and `card`: the CLI override or
/// the configured report dir, under the working dir when one is set.
pub fn resolve_report_dir(config: &RunnerConfig, report_dir: Option<&str>) -> PathBuf {
    build_runner_settings(config, report_dir, None).report_root()
}

/// Suites to run: CLI list when given, else the configured list.
pub fn resolve_suites(cli_suites: &[String], config: &AppConfig) -> Vec<String> {
    let suites = if cli_suites.is_empty() {
        &config.suites
    } else {
        cli_suites
    };
    suites
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Webhook URL: CLI > config > environment. Empty values count as unset.
pub fn resolve_webhook(cli_webhook: Option<&str>, config: &AppConfig) -> Option<String> {
    let non_empty = |url: String| (!url.trim().is_empty()).then_some(url);
    cli_webhook
        .map(str::to_string)
        .and_then(non_empty)
        .or_else(|| config.webhook.url.clone().and_then(non_empty))
        .or_else(|| std::env::var(WEBHOOK_ENV).ok().and_then(non_empty))
}
