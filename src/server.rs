use crate::config::Config;
use crate::core_ftpcommand::handlers::HandlerRegistry;
use crate::core_network::network::{self, ConnectionContext};
use crate::core_reply::ReplyCatalog;
use anyhow::{Context, Result};
use log::{error, info};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// A mock FTP server bound to one control port.
///
/// The registry is shared with every connection; tests replace handlers on
/// it while the server runs.
pub struct FtpServer {
    config: Arc<Config>,
    registry: Arc<HandlerRegistry>,
    catalog: Arc<ReplyCatalog>,
    local_addr: Option<SocketAddr>,
    shutdown: Option<broadcast::Sender<()>>,
    accept_task: Option<JoinHandle<()>>,
}

impl FtpServer {
    pub fn new(config: Config, registry: HandlerRegistry, catalog: ReplyCatalog) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            catalog: Arc::new(catalog),
            local_addr: None,
            shutdown: None,
            accept_task: None,
        }
    }

    /// Builds the catalog and the registry for the configured mode.
    pub fn from_config(config: Config) -> Result<Self> {
        let catalog = config.build_catalog()?;
        let registry = config.build_registry()?;
        Ok(Self::new(config, registry, catalog))
    }

    /// Binds the control listener and starts accepting connections. Port 0
    /// picks an ephemeral port; the bound address is returned.
    pub async fn start(&mut self) -> io::Result<SocketAddr> {
        if let Some(addr) = self.local_addr {
            return Ok(addr);
        }

        let server = &self.config.server;
        let bind_addr = SocketAddr::new(server.listen_address, server.listen_port);
        let listener = TcpListener::bind(bind_addr).await?;
        let addr = listener.local_addr()?;
        info!("Server listening on {} ({:?} mode)", addr, server.mode);

        let (shutdown, receiver) = broadcast::channel(1);
        let context = Arc::new(ConnectionContext {
            registry: Arc::clone(&self.registry),
            catalog: Arc::clone(&self.catalog),
            config: Arc::clone(&self.config),
        });
        self.accept_task = Some(tokio::spawn(network::accept_connections(
            listener, context, receiver,
        )));
        self.shutdown = Some(shutdown);
        self.local_addr = Some(addr);
        Ok(addr)
    }

    /// Closes the listener and terminates every open connection, including
    /// ones blocked in a transfer. Does nothing when not started.
    pub async fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            // No receiver means the accept task is already gone.
            let _ = shutdown.send(());
        }
        if let Some(task) = self.accept_task.take() {
            if let Err(e) = task.await {
                error!("Accept task failed: {}", e);
            }
        }
        self.local_addr = None;
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Drop for FtpServer {
    fn drop(&mut self) {
        if let Some(task) = self.accept_task.take() {
            task.abort();
        }
    }
}

/// Runs the server until Ctrl-C.
pub async fn run(config: Config) -> Result<()> {
    let mut server = FtpServer::from_config(config)?;
    server.start().await.context("Failed to start server")?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown requested");
    server.stop().await;
    Ok(())
}
