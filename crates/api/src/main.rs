//! GreenFi API server binary

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use api::{ApiServer, ServiceConfig};
use clap::Parser;
use dotenvy::dotenv;
use mirror::MirrorConfig;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[clap(name = "greenfi-api")]
#[clap(about = "GreenFi API - off-chain mirror of project, stake and withdrawal events")]
struct Args {
    /// Database connection URL, e.g. mysql://root:pw@localhost/greenfi_db
    #[clap(long, env = "DATABASE_URL")]
    database_url: String,

    /// Listen address for the HTTP server
    #[clap(long, default_value = "0.0.0.0:3000", env = "LISTEN_ADDR")]
    listen_addr: SocketAddr,

    /// Directory holding the frontend (index.html and assets)
    #[clap(long, default_value = "./frontend", env = "STATIC_DIR")]
    static_dir: PathBuf,

    /// Maximum pooled database connections
    #[clap(long, default_value_t = 10, env = "DB_MAX_CONNECTIONS")]
    db_max_connections: u32,

    /// Connections kept open while idle
    #[clap(long, default_value_t = 1, env = "DB_MIN_CONNECTIONS")]
    db_min_connections: u32,

    /// Serve Prometheus metrics on this address
    #[clap(long, env = "METRICS_ADDR")]
    metrics_addr: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    let _log_guard = monitoring::init_logging()?;
    monitoring::init_monitoring()?;

    info!("🌿 Starting GreenFi API server");
    info!("Listen address: {}", args.listen_addr);

    let config = ServiceConfig::new(args.database_url, args.listen_addr)
        .with_static_dir(args.static_dir)
        .with_metrics_addr(args.metrics_addr)
        .with_mirror(
            MirrorConfig::new()
                .with_max_connections(args.db_max_connections)
                .with_min_connections(args.db_min_connections),
        );

    let server = match ApiServer::new(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("❌ Cannot start server without database connection: {}", e);
            return Err(e);
        }
    };

    server.run().await
}
