use log::debug;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

#[derive(Error, Debug)]
pub enum DataConnectionError {
    #[error("No PORT or PASV command was issued before the transfer")]
    NotConfigured,

    #[error("Data connection is not open")]
    NotOpen,

    #[error("Timed out after {0:?} waiting for the data connection")]
    Timeout(Duration),

    #[error("Data connection I/O error: {0}")]
    Io(#[from] io::Error),
}

/// How the next data connection is established.
#[derive(Debug)]
pub enum DataMode {
    /// PORT: connect out to the client.
    Active(SocketAddr),
    /// PASV: accept on a listener bound by the server.
    Passive(TcpListener),
}

impl DataMode {
    pub fn is_passive(&self) -> bool {
        matches!(self, DataMode::Passive(_))
    }
}

/// Establishes a data connection for `mode`, giving up after `limit`.
pub async fn establish(mode: &DataMode, limit: Duration) -> Result<TcpStream, DataConnectionError> {
    let attempt = async {
        match mode {
            DataMode::Active(addr) => {
                debug!("Connecting to client data port {}", addr);
                TcpStream::connect(addr).await
            }
            DataMode::Passive(listener) => {
                let (stream, addr) = listener.accept().await?;
                debug!("Accepted data connection from: {}", addr);
                Ok(stream)
            }
        }
    };

    match timeout(limit, attempt).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(DataConnectionError::Timeout(limit)),
    }
}
