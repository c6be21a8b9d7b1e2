use crate::core_ftpcommand::command::Command;
use crate::core_ftpcommand::handlers::{CommandHandler, HandlerError};
use crate::core_ftpcommand::invocation::{InvocationHistory, InvocationRecord};
use crate::core_reply::codes;
use crate::session::Session;
use async_trait::async_trait;

/// Replies 214 with the configured help text. Multi-line text is sent as a
/// multi-line reply.
#[derive(Debug)]
pub struct HelpCommandHandler {
    help_text: String,
    history: InvocationHistory,
}

impl HelpCommandHandler {
    pub fn new(help_text: &str) -> Self {
        Self {
            help_text: help_text.to_string(),
            history: InvocationHistory::new(),
        }
    }
}

#[async_trait]
impl CommandHandler for HelpCommandHandler {
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        let mut record = InvocationRecord::new(command, session.client_host());
        if let Some(topic) = command.param(0) {
            record.set("topic", topic);
        }
        self.history.push(record);
        session
            .send_reply(codes::HELP_MESSAGE, &self.help_text)
            .await?;
        Ok(())
    }

    fn invocations(&self) -> Option<&InvocationHistory> {
        Some(&self.history)
    }
}
