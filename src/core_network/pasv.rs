use crate::core_ftpcommand::command::Command;
use crate::core_ftpcommand::handlers::{CommandHandler, HandlerError};
use crate::core_ftpcommand::invocation::{InvocationHistory, InvocationRecord};
use crate::core_network::port::encode_host_and_port;
use crate::core_reply::codes;
use crate::session::Session;
use async_trait::async_trait;
use log::{debug, error};
use std::net::{IpAddr, Ipv4Addr, SocketAddrV4};

/// Handles the PASV (Passive Mode) FTP command.
///
/// Binds an ephemeral listener on the session's local address and advertises
/// it with `227 Entering Passive Mode (h1,h2,h3,h4,p1,p2).`. The client's
/// connection is accepted by the next transfer command.
#[derive(Debug, Default)]
pub struct PasvCommandHandler {
    history: InvocationHistory,
}

impl PasvCommandHandler {
    pub fn new() -> Self {
        Self::default()
    }
}

fn advertised_ip(ip: IpAddr) -> Ipv4Addr {
    match ip {
        IpAddr::V4(ip) => ip,
        IpAddr::V6(ip) => ip.to_ipv4_mapped().unwrap_or(Ipv4Addr::LOCALHOST),
    }
}

#[async_trait]
impl CommandHandler for PasvCommandHandler {
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        self.history
            .push(InvocationRecord::new(command, session.client_host()));

        let addr = match session.enter_passive_mode().await {
            Ok(addr) => addr,
            Err(e) => {
                error!("Failed to set up passive listener: {}", e);
                session
                    .send_catalog_reply(codes::CANT_OPEN_DATA_CONNECTION, &[])
                    .await?;
                return Ok(());
            }
        };

        let advertised = SocketAddrV4::new(advertised_ip(session.local_ip()), addr.port());
        let encoded = encode_host_and_port(advertised);
        debug!("PASV response sent to client: {}", encoded);
        session
            .send_catalog_reply(codes::ENTERING_PASSIVE_MODE, &[encoded.as_str()])
            .await?;
        Ok(())
    }

    fn invocations(&self) -> Option<&InvocationHistory> {
        Some(&self.history)
    }
}
