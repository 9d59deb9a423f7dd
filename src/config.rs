use crate::updater::ApiIds;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line options.
#[derive(Debug, Parser)]
#[command(name = "stage-throttler", version, about)]
pub struct Cli {
    /// Path to the YAML service descriptor
    #[arg(long, default_value = "service.yml")]
    pub descriptor: PathBuf,

    /// Deployment stage, overriding the descriptor's provider stage
    #[arg(long)]
    pub stage: Option<String>,

    /// Deployment region, overriding the descriptor's provider region
    #[arg(long)]
    pub region: Option<String>,

    /// Identifier of the deployed REST API (falls back to REST_API_ID)
    #[arg(long)]
    pub rest_api_id: Option<String>,

    /// Identifier of the deployed HTTP API (falls back to HTTP_API_ID)
    #[arg(long)]
    pub http_api_id: Option<String>,

    /// Gateway management endpoint URL (falls back to GATEWAY_ENDPOINT_URL)
    #[arg(long)]
    pub endpoint_url: Option<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply the descriptor's throttling settings to the deployed stage
    Update,
    /// Remove endpoint-specific overrides so stage defaults take over
    Reset,
}

/// Stage and region overrides applied field-by-field over the
/// descriptor's provider block.
#[derive(Debug, Clone, Default)]
pub struct StageOverrides {
    pub stage: Option<String>,
    pub region: Option<String>,
}

impl Cli {
    pub fn overrides(&self) -> StageOverrides {
        StageOverrides {
            stage: self.stage.clone(),
            region: self.region.clone(),
        }
    }

    pub fn api_ids(&self) -> ApiIds {
        ApiIds {
            rest_api_id: or_env(&self.rest_api_id, "REST_API_ID"),
            http_api_id: or_env(&self.http_api_id, "HTTP_API_ID"),
        }
    }

    pub fn endpoint_url(&self) -> Option<String> {
        or_env(&self.endpoint_url, "GATEWAY_ENDPOINT_URL")
    }
}

fn or_env(explicit: &Option<String>, key: &str) -> Option<String> {
    explicit
        .clone()
        .or_else(|| std::env::var(key).ok().filter(|value| !value.is_empty()))
}
