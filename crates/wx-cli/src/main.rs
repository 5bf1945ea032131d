//! wx - weather observation ingestion, aggregation, and read API
//!
//! Three entry points over one store: `ingest` loads per-station files,
//! `analyze` recomputes yearly statistics, `serve` runs the HTTP API.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;
use url::Url;

use wx_api::StaticTokenAuth;
use wx_config::AppConfig;
use wx_db::DbClient;
use wx_fetch::HttpZipFetcher;
use wx_ingest::IngestEngine;
use wx_stats::StatsEngine;

#[derive(Parser)]
#[command(name = "wx")]
#[command(about = "Weather observation ingestion, aggregation, and read API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest per-station observation files into the store
    Ingest {
        #[arg(long, help = "Directory of per-station data files")]
        data_dir: Option<PathBuf>,
    },

    /// Recompute yearly per-station statistics
    Analyze,

    /// Serve the read API
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    wx_obs::init("wx");

    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = DbClient::new(&config.database_url())
        .await
        .context("Failed to connect to database")?;
    db.ping().await.context("Database ping failed")?;
    db.init_schema()
        .await
        .context("Failed to initialize schema")?;
    info!("connected to database");

    match cli.command {
        Commands::Ingest { data_dir } => {
            let data_dir = data_dir.unwrap_or_else(|| PathBuf::from(config.data_dir()));
            let url = Url::parse(&config.dataset_url()).context("Invalid dataset URL")?;
            let fetcher = HttpZipFetcher::new(url).context("Failed to build dataset fetcher")?;

            let report = IngestEngine::new(db)
                .ingest_dir(&data_dir, Some(&fetcher))
                .await
                .context("Ingestion failed")?;
            info!(%report, "ingest finished");
        }
        Commands::Analyze => {
            let report = StatsEngine::new(db)
                .compute_station_year_stats()
                .await
                .context("Statistics calculation failed")?;
            info!(%report, "analyze finished");
        }
        Commands::Serve => {
            let auth = Arc::new(StaticTokenAuth::new(config.auth_tokens()));
            let (app, state) = wx_api::build_app(db, auth);

            let addr: SocketAddr = config
                .http_bind()
                .parse()
                .context("Invalid HTTP bind address")?;
            let listener = TcpListener::bind(addr)
                .await
                .context("failed to bind TCP listener")?;

            // Mark ready just before serving
            wx_api::set_ready(&state, true);

            info!(%addr, "HTTP server listening");
            axum::serve(listener, app).await.context("server error")?;
        }
    }

    Ok(())
}
