use crate::core_ftpcommand::command::Command;
use crate::core_ftpcommand::handlers::{CommandHandler, HandlerError};
use crate::core_ftpcommand::invocation::{InvocationHistory, InvocationRecord};
use crate::core_reply::codes;
use crate::session::Session;
use async_trait::async_trait;
use log::info;

/// Handles the QUIT FTP command.
///
/// Sends 221 and marks the session closed; the server loop drops the
/// connection once this handler returns.
#[derive(Debug, Default)]
pub struct QuitCommandHandler {
    history: InvocationHistory,
}

impl QuitCommandHandler {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommandHandler for QuitCommandHandler {
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        info!("Received QUIT command. Closing connection.");
        self.history
            .push(InvocationRecord::new(command, session.client_host()));
        session.close();
        session.send_catalog_reply(codes::CLOSING_CONTROL, &[]).await?;
        Ok(())
    }

    fn invocations(&self) -> Option<&InvocationHistory> {
        Some(&self.history)
    }
}
