use crate::core_ftpcommand::command::Command;
use crate::core_ftpcommand::handlers::{CommandHandler, HandlerError};
use crate::core_ftpcommand::invocation::{InvocationHistory, InvocationRecord};
use crate::core_reply::codes;
use crate::session::Session;
use async_trait::async_trait;

/// Replies 200 and does nothing else. Also bound to ALLO, whose argument is
/// ignored.
#[derive(Debug, Default)]
pub struct NoopCommandHandler {
    text: Option<String>,
    history: InvocationHistory,
}

impl NoopCommandHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            history: InvocationHistory::new(),
        }
    }
}

#[async_trait]
impl CommandHandler for NoopCommandHandler {
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        self.history
            .push(InvocationRecord::new(command, session.client_host()));
        match &self.text {
            Some(text) => session.send_reply(codes::COMMAND_OK, text).await?,
            None => session.send_catalog_reply(codes::COMMAND_OK, &[]).await?,
        }
        Ok(())
    }

    fn invocations(&self) -> Option<&InvocationHistory> {
        Some(&self.history)
    }
}
