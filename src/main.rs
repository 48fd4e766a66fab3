use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hysplit_fetch::{HysplitClient, HysplitConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hysplit_fetch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = HysplitConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(
        base_url = %config.base_url,
        output_dir = %config.output_dir.display(),
        "Starting HYSPLIT job submission"
    );

    let client = HysplitClient::with_config(config).context("Failed to initialize client")?;
    let archive = client.run().await.context("HYSPLIT run failed")?;

    tracing::info!(
        job_id = %archive.job_id,
        path = %archive.path.display(),
        bytes = archive.bytes.len(),
        "Result download successful"
    );
    Ok(())
}
