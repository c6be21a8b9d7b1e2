use crate::core_ftpcommand::command::ParameterError;
use crate::core_ftpcommand::handlers::HandlerError;
use crate::core_reply::codes;
use crate::session::Session;
use log::{error, warn};

/// Answers a parameter extraction failure with 501.
pub async fn reply_parameter_error(
    session: &mut Session,
    err: ParameterError,
) -> Result<(), HandlerError> {
    warn!("Rejecting command parameters: {}", err);
    session
        .send_catalog_reply(codes::SYNTAX_ERROR_IN_PARAMETERS, &[])
        .await?;
    Ok(())
}

/// Sends 530 and returns false when the session is not logged in.
pub async fn verify_logged_in(session: &mut Session) -> Result<bool, HandlerError> {
    if session.is_authenticated() {
        return Ok(true);
    }
    warn!("Command rejected, session is not logged in");
    session.send_catalog_reply(codes::NOT_LOGGED_IN, &[]).await?;
    Ok(false)
}

/// Inbound half of STOR/APPE/STOU: 150, open, read to EOF, close.
///
/// Returns `None` when the transfer failed; the matching 425/426 reply has
/// then already been sent. The caller sends the completion reply.
pub async fn receive_upload(session: &mut Session) -> Result<Option<Vec<u8>>, HandlerError> {
    session.send_catalog_reply(codes::FILE_STATUS_OK, &[]).await?;

    if let Err(e) = session.open_data_connection().await {
        error!("Failed to open data connection: {}", e);
        session.close_data_connection().await;
        session
            .send_catalog_reply(codes::CANT_OPEN_DATA_CONNECTION, &[])
            .await?;
        return Ok(None);
    }

    let received = session.read_data().await;
    session.close_data_connection().await;
    match received {
        Ok(contents) => Ok(Some(contents)),
        Err(e) => {
            error!("Error reading from data stream: {}", e);
            session.send_catalog_reply(codes::TRANSFER_ABORTED, &[]).await?;
            Ok(None)
        }
    }
}

/// Outbound half of RETR/LIST/NLST: 150, open, write `contents`, close.
///
/// Returns false when the transfer failed and a 425/426 reply was sent.
pub async fn send_download(session: &mut Session, contents: &[u8]) -> Result<bool, HandlerError> {
    session.send_catalog_reply(codes::FILE_STATUS_OK, &[]).await?;

    if let Err(e) = session.open_data_connection().await {
        error!("Failed to open data connection: {}", e);
        session.close_data_connection().await;
        session
            .send_catalog_reply(codes::CANT_OPEN_DATA_CONNECTION, &[])
            .await?;
        return Ok(false);
    }

    let sent = session.write_data(contents).await;
    session.close_data_connection().await;
    match sent {
        Ok(()) => Ok(true),
        Err(e) => {
            error!("Error sending data to client: {}", e);
            session.send_catalog_reply(codes::TRANSFER_ABORTED, &[]).await?;
            Ok(false)
        }
    }
}

/// Joins listing lines with CRLF, the line ending used on the data
/// connection for ASCII listings.
pub fn format_listing(lines: &[String]) -> Vec<u8> {
    lines
        .iter()
        .map(|line| format!("{}\r\n", line))
        .collect::<String>()
        .into_bytes()
}
