use anyhow::Result;
use clap::Parser;
use tracing::info;
use tutorium::{create_router, AppState, Config, SqliteStore};

#[derive(Debug, Parser)]
#[command(name = "tutorium", about = "Voice tutoring session service")]
struct Cli {
    /// Config file to load (without extension)
    #[arg(long, default_value = "config/tutorium")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Voice engine NATS: {}", cfg.voice.nats_url);

    let store = SqliteStore::connect(&cfg.database.url).await?;
    let state = AppState::new(store, cfg.voice.nats_url.clone());

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, create_router(state)).await?;

    Ok(())
}
