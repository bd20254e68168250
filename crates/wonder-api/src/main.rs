//! Binary entrypoint for the WonderBot API server.
use tracing_subscriber::EnvFilter;
use wonder_api::{run, ServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let config = ServiceConfig::from_env()?;
    run(config).await
}
