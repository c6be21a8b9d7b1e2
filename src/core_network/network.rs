use crate::config::Config;
use crate::core_ftpcommand::command::Command;
use crate::core_ftpcommand::handlers::HandlerRegistry;
use crate::core_reply::{codes, ReplyCatalog};
use crate::session::Session;
use futures_util::FutureExt;
use log::{debug, error, info, warn};
use std::any::Any;
use std::io;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinSet;

/// Longest command line accepted, newline included.
pub const MAX_COMMAND_LINE: u64 = 8 * 1024;

/// Everything a connection task shares with the rest of the server.
pub struct ConnectionContext {
    pub registry: Arc<HandlerRegistry>,
    pub catalog: Arc<ReplyCatalog>,
    pub config: Arc<Config>,
}

/// Accepts control connections until `shutdown` fires, then aborts every
/// connection task still running.
pub async fn accept_connections(
    listener: TcpListener,
    context: Arc<ConnectionContext>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            _ = shutdown.recv() => break,
            accepted = listener.accept() => match accepted {
                Ok((socket, addr)) => {
                    info!("New connection from {}", addr);
                    let context = Arc::clone(&context);
                    connections.spawn(async move {
                        if let Err(e) = handle_connection(socket, addr, context).await {
                            debug!("Control connection to {} failed: {}", addr, e);
                        }
                        info!("Connection closed for {}", addr);
                    });
                }
                Err(e) => error!("Failed to accept connection: {}", e),
            },
            Some(finished) = connections.join_next(), if !connections.is_empty() => {
                if let Err(e) = finished {
                    error!("Connection task failed: {}", e);
                }
            }
        }
    }

    drop(listener);
    connections.shutdown().await;
    info!("Server stopped");
}

/// Serves one control connection: greeting, then read, parse and dispatch
/// until QUIT, EOF or a control socket failure.
pub async fn handle_connection(
    socket: TcpStream,
    client_addr: SocketAddr,
    context: Arc<ConnectionContext>,
) -> io::Result<()> {
    let server = &context.config.server;
    let local_ip = match server.pasv_address {
        Some(ip) => ip,
        None => socket.local_addr()?.ip(),
    };

    let (reader, writer) = socket.into_split();
    let mut session = Session::new(writer, Arc::clone(&context.catalog))
        .with_addresses(client_addr, local_ip)
        .with_data_timeout(Duration::from_secs(server.data_accept_timeout_secs))
        .with_transfer_buffer_size(server.transfer_buffer_size);
    session.send_catalog_reply(codes::SERVICE_READY, &[]).await?;

    let mut reader = BufReader::new(reader);
    serve_commands(&mut reader, &mut session, &context.registry, client_addr).await
}

/// The command loop of a control connection. After each command any data
/// connection it opened is closed.
pub async fn serve_commands<R>(
    reader: &mut R,
    session: &mut Session,
    registry: &HandlerRegistry,
    client_addr: SocketAddr,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut buffer = Vec::new();

    loop {
        buffer.clear();
        let n = (&mut *reader)
            .take(MAX_COMMAND_LINE)
            .read_until(b'\n', &mut buffer)
            .await?;
        if n == 0 {
            info!("Client {} disconnected", client_addr);
            break;
        }
        if n as u64 == MAX_COMMAND_LINE && !buffer.ends_with(b"\n") {
            warn!(
                "Command line from {} exceeds {} bytes",
                client_addr, MAX_COMMAND_LINE
            );
            session.send_catalog_reply(codes::SYNTAX_ERROR, &[]).await?;
            if !skip_line(reader).await? {
                break;
            }
            continue;
        }

        let line = String::from_utf8_lossy(&buffer);
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                warn!("Rejecting line from {}: {}", client_addr, e);
                session.send_catalog_reply(codes::SYNTAX_ERROR, &[]).await?;
                continue;
            }
        };
        debug!("Received command from {}: {}", client_addr, command);

        dispatch(registry, &command, session).await?;
        session.close_data_connection().await;

        if session.is_closed() {
            break;
        }
    }
    Ok(())
}

/// Discards input up to and including the next newline. Returns false on EOF.
async fn skip_line<R>(reader: &mut R) -> io::Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let (consumed, found) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                return Ok(false);
            }
            match available.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (available.len(), false),
            }
        };
        reader.consume(consumed);
        if found {
            return Ok(true);
        }
    }
}

/// Runs the handler bound to the command's verb. A handler error or panic is
/// logged and answered with 451; only a failure to send that reply is
/// returned.
pub async fn dispatch(
    registry: &HandlerRegistry,
    command: &Command,
    session: &mut Session,
) -> io::Result<()> {
    let handler = registry.get_handler(command.verb());
    let outcome = AssertUnwindSafe(handler.handle(command, session))
        .catch_unwind()
        .await;

    let failure = match outcome {
        Ok(Ok(())) => return Ok(()),
        Ok(Err(e)) => e.to_string(),
        Err(panic) => format!("handler panicked: {}", panic_message(panic.as_ref())),
    };
    error!("Error handling command {}: {}", command.verb(), failure);
    session.send_catalog_reply(codes::LOCAL_ERROR, &[]).await
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown cause"
    }
}
