use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tubedraft::config::AppConfig;
use tubedraft::routes::{router, AppState};

#[derive(Parser, Debug)]
#[command(
    name = "tubedraft",
    version,
    about = "Draft YouTube metadata and upload videos to a fixed channel"
)]
struct Args {
    #[arg(
        short,
        long,
        value_name = "PORT",
        help = "Listen port, overrides PORT from the environment"
    )]
    port: Option<u16>,

    #[arg(
        long,
        value_name = "HOST",
        help = "Bind address, overrides HOST from the environment"
    )]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = AppConfig::from_env()?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(host) = args.host {
        config.host = host;
    }

    // Metadata generation works without OAuth material; uploads will fail per
    // request until the deployment is completed.
    if let Err(err) = config.youtube.credentials() {
        tracing::warn!(%err, "uploads disabled until OAuth configuration is complete");
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let app = router(Arc::new(AppState { config }));

    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
