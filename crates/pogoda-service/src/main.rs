//! Pogoda - server-rendered weather lookup.
//!
//! Run with: `cargo run -p pogoda-service`

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use pogoda_service::{AppState, Config};
use pogoda_store::Store;

/// Pogoda - weather lookup web service.
#[derive(Parser, Debug)]
#[command(name = "pogoda-service")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address (overrides config).
    #[arg(short, long)]
    bind: Option<String>,

    /// Database path (overrides config).
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Directory served under /static (overrides config).
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pogoda_service=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default().unwrap_or_default(),
    };

    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(db_path) = args.database {
        config.storage.path = db_path;
    }
    if let Some(dir) = args.static_dir {
        config.server.static_dir = Some(dir);
    }

    config.validate()?;

    let store = Store::open(&config.storage.path)?;
    let addr: SocketAddr = config.server.bind.parse()?;
    let static_dir = config.server.static_dir.clone();

    info!(
        "Geocoding via {}, forecasts via {}",
        config.geocoding.base_url, config.forecast.base_url
    );
    let state = AppState::with_http_providers(store, &config)?;

    if let Some(dir) = &static_dir {
        info!("Serving static files from {}", dir.display());
    }
    let app = pogoda_service::app(state, static_dir.as_deref());

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
