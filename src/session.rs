use crate::core_auth::UserAccount;
use crate::core_network::data::{establish, DataConnectionError, DataMode};
use crate::core_reply::{format_reply, ReplyCatalog};
use log::{debug, warn};
use std::collections::HashMap;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const DEFAULT_DATA_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_TRANSFER_BUFFER_SIZE: usize = 64 * 1024;

/// Login progress of a control connection. There is no way back to
/// `Unauthenticated` short of a new connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    UsernameProvided,
    Authenticated,
}

/// State of one control connection.
///
/// A session is owned by the task serving its connection and is handed to
/// every handler as `&mut Session`. Replies go out through the control writer;
/// file contents go through the data connection opened per transfer.
pub struct Session {
    writer: Box<dyn AsyncWrite + Send + Unpin>,
    catalog: Arc<ReplyCatalog>,
    client_addr: Option<SocketAddr>,
    local_ip: IpAddr,
    data_timeout: Duration,
    transfer_buffer_size: usize,
    auth_state: AuthState,
    pub username: Option<String>,
    pub account: Option<UserAccount>,
    pub current_dir: String,
    pub type_: String,         // The primary transfer type (A, E, I, L)
    pub byte_size: Option<u8>, // The byte size for TYPE L (None if not applicable)
    attributes: HashMap<String, String>,
    data_mode: Option<DataMode>,
    data_connection: Option<TcpStream>,
    closed: bool,
}

impl Session {
    pub fn new<W>(writer: W, catalog: Arc<ReplyCatalog>) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            writer: Box::new(writer),
            catalog,
            client_addr: None,
            local_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            data_timeout: DEFAULT_DATA_TIMEOUT,
            transfer_buffer_size: DEFAULT_TRANSFER_BUFFER_SIZE,
            auth_state: AuthState::Unauthenticated,
            username: None,
            account: None,
            current_dir: String::from("/"),
            type_: "A".to_string(), // Default transfer type is ASCII
            byte_size: None,
            attributes: HashMap::new(),
            data_mode: None,
            data_connection: None,
            closed: false,
        }
    }

    /// Sets the peer address and the local address advertised in PASV replies.
    pub fn with_addresses(mut self, client_addr: SocketAddr, local_ip: IpAddr) -> Self {
        self.client_addr = Some(client_addr);
        self.local_ip = local_ip;
        self
    }

    pub fn with_data_timeout(mut self, data_timeout: Duration) -> Self {
        self.data_timeout = data_timeout;
        self
    }

    pub fn with_transfer_buffer_size(mut self, size: usize) -> Self {
        self.transfer_buffer_size = size.max(1);
        self
    }

    pub fn client_addr(&self) -> Option<SocketAddr> {
        self.client_addr
    }

    pub fn client_host(&self) -> Option<IpAddr> {
        self.client_addr.map(|addr| addr.ip())
    }

    pub fn local_ip(&self) -> IpAddr {
        self.local_ip
    }

    pub fn catalog(&self) -> &ReplyCatalog {
        &self.catalog
    }

    // Replies

    pub async fn send_reply(&mut self, code: u16, text: &str) -> io::Result<()> {
        let reply = format_reply(code, text);
        debug!("Sending reply: {}", reply.trim_end());
        self.writer.write_all(reply.as_bytes()).await?;
        self.writer.flush().await
    }

    /// Sends the catalog text for `code` with its placeholders filled from
    /// `args`.
    pub async fn send_catalog_reply(&mut self, code: u16, args: &[&str]) -> io::Result<()> {
        let text = self.catalog.format(code, args);
        self.send_reply(code, &text).await
    }

    // Authentication

    pub fn auth_state(&self) -> AuthState {
        self.auth_state
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_state == AuthState::Authenticated
    }

    /// Records the name sent with USER.
    pub fn set_username(&mut self, username: &str) {
        self.username = Some(username.to_string());
        if self.auth_state == AuthState::Unauthenticated {
            self.auth_state = AuthState::UsernameProvided;
        }
    }

    /// Marks the session logged in; with an account, moves to its home
    /// directory.
    pub fn login(&mut self, account: Option<UserAccount>) {
        if let Some(account) = &account {
            self.username = Some(account.username.clone());
            self.current_dir = account.home_directory.clone();
        }
        self.account = account;
        self.auth_state = AuthState::Authenticated;
    }

    /// Groups of the logged-in account; empty without one.
    pub fn groups(&self) -> &[String] {
        self.account
            .as_ref()
            .map(|account| account.groups.as_slice())
            .unwrap_or(&[])
    }

    // Generic per-session attributes

    pub fn set_attribute(&mut self, key: &str, value: &str) {
        self.attributes.insert(key.to_string(), value.to_string());
    }

    pub fn get_attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn remove_attribute(&mut self, key: &str) -> Option<String> {
        self.attributes.remove(key)
    }

    // Data connection

    pub fn data_mode(&self) -> Option<&DataMode> {
        self.data_mode.as_ref()
    }

    pub fn has_data_connection(&self) -> bool {
        self.data_connection.is_some()
    }

    /// Active mode: the next transfer connects out to `addr`.
    pub fn set_active_mode(&mut self, addr: SocketAddr) {
        self.data_mode = Some(DataMode::Active(addr));
    }

    /// Passive mode: binds an ephemeral listener on the local address and
    /// returns its address.
    pub async fn enter_passive_mode(&mut self) -> io::Result<SocketAddr> {
        let listener = TcpListener::bind((self.local_ip, 0)).await?;
        let addr = listener.local_addr()?;
        debug!("PASV listener set up on {}", addr);
        self.data_mode = Some(DataMode::Passive(listener));
        Ok(addr)
    }

    pub async fn open_data_connection(&mut self) -> Result<(), DataConnectionError> {
        let mode = self
            .data_mode
            .as_ref()
            .ok_or(DataConnectionError::NotConfigured)?;
        let stream = establish(mode, self.data_timeout).await?;
        self.data_connection = Some(stream);
        Ok(())
    }

    /// Reads the open data connection until the client closes it.
    pub async fn read_data(&mut self) -> Result<Vec<u8>, DataConnectionError> {
        let buffer_size = self.transfer_buffer_size;
        let stream = self
            .data_connection
            .as_mut()
            .ok_or(DataConnectionError::NotOpen)?;

        let mut contents = Vec::new();
        let mut buffer = vec![0; buffer_size];
        loop {
            let bytes_read = stream.read(&mut buffer).await?;
            if bytes_read == 0 {
                break;
            }
            contents.extend_from_slice(&buffer[..bytes_read]);
        }
        debug!("Received {} bytes on data connection", contents.len());
        Ok(contents)
    }

    pub async fn write_data(&mut self, data: &[u8]) -> Result<(), DataConnectionError> {
        let stream = self
            .data_connection
            .as_mut()
            .ok_or(DataConnectionError::NotOpen)?;
        stream.write_all(data).await?;
        stream.flush().await?;
        Ok(())
    }

    /// Closes the data connection if one is open. A passive listener serves a
    /// single transfer, so it is dropped along with the stream it accepted; a
    /// listener nobody has connected to yet stays for the next command.
    pub async fn close_data_connection(&mut self) {
        let Some(mut stream) = self.data_connection.take() else {
            return;
        };
        if let Err(e) = stream.shutdown().await {
            warn!("Error shutting down data stream: {}", e);
        }
        if self.data_mode.as_ref().map(DataMode::is_passive).unwrap_or(false) {
            self.data_mode = None;
        }
    }

    // Lifecycle

    /// Ends the session once the current command has been answered.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
