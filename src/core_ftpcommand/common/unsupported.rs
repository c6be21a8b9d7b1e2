use crate::core_ftpcommand::command::Command;
use crate::core_ftpcommand::handlers::{CommandHandler, HandlerError};
use crate::core_ftpcommand::invocation::{InvocationHistory, InvocationRecord};
use crate::core_reply::codes;
use crate::session::Session;
use async_trait::async_trait;
use log::warn;

/// Fallback for every verb without a registered handler: always 502.
#[derive(Debug, Default)]
pub struct UnsupportedCommandHandler {
    history: InvocationHistory,
}

impl UnsupportedCommandHandler {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommandHandler for UnsupportedCommandHandler {
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        warn!("Unsupported command: {}", command.verb());
        self.history
            .push(InvocationRecord::new(command, session.client_host()));
        session
            .send_catalog_reply(codes::COMMAND_NOT_IMPLEMENTED, &[])
            .await?;
        Ok(())
    }

    fn invocations(&self) -> Option<&InvocationHistory> {
        Some(&self.history)
    }
}
