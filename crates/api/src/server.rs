//! API server runner

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use mirror::MirrorDatabase;
use tracing::{error, info};

use crate::config::{ServiceConfig, mask_url};
use crate::routes;
use crate::state::AppState;

/// Connected, schema-initialised API server
pub struct ApiServer {
    config: ServiceConfig,
    db: Arc<MirrorDatabase>,
}

impl ApiServer {
    /// Connect to the mirror database and make sure the schema exists
    pub async fn new(config: ServiceConfig) -> Result<Self> {
        config.validate().map_err(|e| anyhow::anyhow!(e))?;

        info!("🗄️  Database: {}", mask_url(&config.database_url));
        let db = MirrorDatabase::new(&config.database_url, &config.mirror).await?;
        db.init_schema().await?;

        Ok(Self {
            config,
            db: Arc::new(db),
        })
    }

    pub fn database(&self) -> &Arc<MirrorDatabase> {
        &self.db
    }

    pub fn router(&self) -> Router {
        routes::app(AppState::new(self.db.clone()), &self.config.static_dir)
    }

    /// Serve until Ctrl-C or SIGTERM, then close the pool
    pub async fn run(self) -> Result<()> {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(self.config.listen_addr).await?;

        if let Some(metrics_addr) = self.config.metrics_addr {
            tokio::spawn(async move {
                if let Err(e) = monitoring::start_metrics_server(metrics_addr).await {
                    error!("Metrics server failed: {}", e);
                }
            });
        }

        info!("🚀 Server running on http://{}", self.config.listen_addr);
        info!(
            "📁 Serving frontend from: {}",
            self.config.static_dir.display()
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        self.db.close().await?;
        info!("API server stopped");
        Ok(())
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Received shutdown signal");
}
