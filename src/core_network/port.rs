use crate::core_ftpcommand::command::{Command, ParameterError};
use crate::core_ftpcommand::handlers::{CommandHandler, HandlerError};
use crate::core_ftpcommand::invocation::{InvocationHistory, InvocationRecord};
use crate::core_ftpcommand::utils::reply_parameter_error;
use crate::core_reply::codes;
use crate::session::Session;
use async_trait::async_trait;
use log::info;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

/// Parses the `h1,h2,h3,h4,p1,p2` host/port encoding used by PORT and PASV.
/// The port is `p1 * 256 + p2`.
pub fn parse_host_and_port<S: AsRef<str>>(params: &[S]) -> Result<SocketAddrV4, ParameterError> {
    if params.len() != 6 {
        return Err(ParameterError::Invalid {
            value: params
                .iter()
                .map(|p| p.as_ref())
                .collect::<Vec<_>>()
                .join(","),
            reason: format!("expected 6 comma separated numbers, got {}", params.len()),
        });
    }

    let mut numbers = [0u8; 6];
    for (slot, param) in numbers.iter_mut().zip(params) {
        let value = param.as_ref().trim();
        *slot = value.parse::<u8>().map_err(|_| ParameterError::Invalid {
            value: value.to_string(),
            reason: "not a number between 0 and 255".to_string(),
        })?;
    }

    let ip = Ipv4Addr::new(numbers[0], numbers[1], numbers[2], numbers[3]);
    let port = (numbers[4] as u16) << 8 | numbers[5] as u16;
    Ok(SocketAddrV4::new(ip, port))
}

/// Inverse of [`parse_host_and_port`].
pub fn encode_host_and_port(addr: SocketAddrV4) -> String {
    let [h1, h2, h3, h4] = addr.ip().octets();
    let port = addr.port();
    format!("{},{},{},{},{},{}", h1, h2, h3, h4, port >> 8, port & 0xff)
}

/// Handles the PORT (Active Mode) FTP command.
///
/// Only records the client's data endpoint; the connection itself is opened
/// by the next transfer command.
#[derive(Debug, Default)]
pub struct PortCommandHandler {
    history: InvocationHistory,
}

impl PortCommandHandler {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommandHandler for PortCommandHandler {
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        let addr = match parse_host_and_port(command.params()) {
            Ok(addr) => addr,
            Err(e) => return reply_parameter_error(session, e).await,
        };

        info!("Received PORT command with IP: {} and port: {}", addr.ip(), addr.port());
        let mut record = InvocationRecord::new(command, session.client_host());
        record.set("host", addr.ip().to_string());
        record.set("port", addr.port().to_string());
        self.history.push(record);

        session.set_active_mode(SocketAddr::V4(addr));
        session.send_catalog_reply(codes::COMMAND_OK, &[]).await?;
        Ok(())
    }

    fn invocations(&self) -> Option<&InvocationHistory> {
        Some(&self.history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_value() {
        let addr = parse_host_and_port(&["192", "168", "0", "10", "4", "1"]).unwrap();
        assert_eq!(addr.ip(), &Ipv4Addr::new(192, 168, 0, 10));
        assert_eq!(addr.port(), 1025);
    }

    #[test]
    fn test_round_trip_all_ports() {
        let ip = Ipv4Addr::new(10, 0, 0, 1);
        for port in 0..=u16::MAX {
            let addr = SocketAddrV4::new(ip, port);
            let encoded = encode_host_and_port(addr);
            let params: Vec<&str> = encoded.split(',').collect();
            assert_eq!(parse_host_and_port(&params).unwrap(), addr);
        }
    }

    #[test]
    fn test_round_trip_all_octets() {
        for octet in 0..=u8::MAX {
            for position in 0..4 {
                let mut octets = [1u8, 2, 3, 4];
                octets[position] = octet;
                let addr = SocketAddrV4::new(Ipv4Addr::from(octets), 21);
                let encoded = encode_host_and_port(addr);
                let params: Vec<&str> = encoded.split(',').collect();
                assert_eq!(parse_host_and_port(&params).unwrap(), addr);
            }
        }
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(parse_host_and_port(&["127", "0", "0", "1", "4"]).is_err());
        assert!(parse_host_and_port(&["127", "0", "0", "1", "4", "1", "9"]).is_err());
        assert!(parse_host_and_port(&["256", "0", "0", "1", "4", "1"]).is_err());
        assert!(parse_host_and_port(&["a", "0", "0", "1", "4", "1"]).is_err());
        assert!(parse_host_and_port(&["127", "0", "0", "1", "-1", "1"]).is_err());
        assert!(parse_host_and_port::<&str>(&[]).is_err());
    }
}
