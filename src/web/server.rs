//! HTTP server assembly for depot.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::info;

use crate::auth::SessionStore;
use crate::config::Config;
use crate::db::Database;
use crate::file::BlobStore;
use crate::worker::ThumbnailWorker;
use crate::{DepotError, Result};

use super::handlers::AppState;
use super::router::{create_health_router, create_router};

/// Interval between expired-session sweeps.
const SESSION_SWEEP_INTERVAL_SECS: u64 = 3600;

/// The depot server: HTTP API plus the background thumbnail worker.
pub struct DepotServer {
    addr: SocketAddr,
    app_state: Arc<AppState>,
    cors_origins: Vec<String>,
}

impl DepotServer {
    /// Assemble the server from configuration.
    ///
    /// Opens (and migrates) the database and creates the blob storage
    /// root. The worker is not started until `run`.
    pub async fn new(config: &Config) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|_| {
                DepotError::Config(format!(
                    "invalid listen address {}:{}",
                    config.server.host, config.server.port
                ))
            })?;

        let db = Arc::new(Database::open(&config.database.path).await?);
        let blobs = BlobStore::new(&config.storage.root)?;
        info!("Blob storage initialized at: {}", config.storage.root);

        let app_state = Arc::new(AppState::new(
            db,
            blobs,
            Duration::from_secs(config.session.ttl_secs),
        ));

        Ok(Self {
            addr,
            app_state,
            cors_origins: config.server.cors_origins.clone(),
        })
    }

    /// Get the configured listen address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the background pieces: queue recovery, the thumbnail worker,
    /// and the periodic session sweep.
    async fn start_background_tasks(&self) -> Result<()> {
        // Jobs stranded by a previous run go back to pending before the
        // worker starts consuming
        self.app_state.queue.recover().await?;

        let worker = ThumbnailWorker::new(
            self.app_state.db.pool().clone(),
            self.app_state.blobs.clone(),
            self.app_state.queue.clone(),
        );
        tokio::spawn(worker.run());

        Self::start_session_sweep_task(self.app_state.sessions.clone());

        Ok(())
    }

    /// Periodically sweep expired sessions so the store stays bounded.
    fn start_session_sweep_task(sessions: Arc<SessionStore>) {
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(SESSION_SWEEP_INTERVAL_SECS));

            // Skip the first immediate tick
            interval.tick().await;

            loop {
                interval.tick().await;
                sessions.cleanup();
            }
        });
    }

    /// Run the server.
    pub async fn run(self) -> Result<()> {
        self.start_background_tasks().await?;

        let router =
            create_router(self.app_state, &self.cors_origins).merge(create_health_router());

        let listener = TcpListener::bind(self.addr).await?;
        info!("depot listening on http://{}", listener.local_addr()?);

        axum::serve(listener, router).await?;
        Ok(())
    }

    /// Run the server in the background and return the bound address.
    ///
    /// Useful for tests binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr> {
        self.start_background_tasks().await?;

        let router =
            create_router(self.app_state, &self.cors_origins).merge(create_health_router());

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        info!("depot listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, ServerConfig, StorageConfig};

    fn test_config(dir: &std::path::Path) -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec![],
            },
            database: DatabaseConfig {
                path: dir.join("depot.db").to_string_lossy().into_owned(),
            },
            storage: StorageConfig {
                root: dir.join("blobs").to_string_lossy().into_owned(),
            },
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_server_new() {
        let dir = tempfile::TempDir::new().unwrap();
        let server = DepotServer::new(&test_config(dir.path())).await.unwrap();

        assert_eq!(server.addr().ip().to_string(), "127.0.0.1");
        assert!(dir.path().join("blobs").exists());
    }

    #[tokio::test]
    async fn test_server_rejects_bad_address() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = test_config(dir.path());
        config.server.host = "not an address".to_string();

        let result = DepotServer::new(&config).await;
        assert!(matches!(result, Err(DepotError::Config(_))));
    }

    #[tokio::test]
    async fn test_server_serves_health() {
        let dir = tempfile::TempDir::new().unwrap();
        let server = DepotServer::new(&test_config(dir.path())).await.unwrap();
        let addr = server.run_with_addr().await.unwrap();

        let stream = tokio::net::TcpStream::connect(addr).await;
        assert!(stream.is_ok());
    }
}
