use anyhow::Result;
use clap::Parser;
use stage_throttler::config::{Cli, Command};
use stage_throttler::descriptor::ServiceDescriptor;
use stage_throttler::gateway::HttpGatewayClient;
use stage_throttler::{settings, updater};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("stage_throttler={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let descriptor = ServiceDescriptor::from_yaml_file(&cli.descriptor)?;

    let Some(settings) = settings::resolve(&descriptor, &cli.overrides()) else {
        tracing::warn!("Throttling settings not found, no action will be performed.");
        return Ok(());
    };

    tracing::info!(
        "Reconciling throttling settings for stage {} in {}",
        settings.stage,
        settings.region
    );

    let endpoint_url = cli.endpoint_url().ok_or_else(|| {
        anyhow::anyhow!("no gateway endpoint configured; pass --endpoint-url or set GATEWAY_ENDPOINT_URL")
    })?;
    let client = HttpGatewayClient::new(endpoint_url);
    let ids = cli.api_ids();

    match cli.command {
        Command::Update => {
            updater::update_stage_throttling(&settings, &descriptor, &ids, &client).await?
        }
        Command::Reset => {
            updater::reset_endpoint_settings(&settings, &descriptor, &ids, &client).await?
        }
    }

    Ok(())
}
