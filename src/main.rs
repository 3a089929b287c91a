//! media-dl server binary

use clap::Parser;
use media_dl::{Config, MediaQueue, api, wait_for_signal};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "media-dl", version, about = "Sequential batch media download queue over yt-dlp")]
struct Cli {
    /// TOML configuration file; defaults apply to anything it omits
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Address the HTTP API listens on, overriding the configuration file
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Explicit yt-dlp executable, overriding the configuration file
    #[arg(long)]
    yt_dlp: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("media_dl=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_toml_file(path)?,
        None => Config::default(),
    };
    if let Some(bind) = cli.bind {
        config.server.api.bind_address = bind;
    }
    if let Some(path) = cli.yt_dlp {
        config.tools.yt_dlp_path = Some(path);
    }

    let queue = MediaQueue::new(config).await?;
    let _reaper = queue.start_reaper();

    api::serve_with_shutdown(queue.clone(), queue.get_config(), wait_for_signal()).await?;

    tracing::info!("API server stopped, cleaning up tasks");
    queue.shutdown().await?;
    Ok(())
}
