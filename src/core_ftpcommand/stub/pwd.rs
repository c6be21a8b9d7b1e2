use super::StubReply;
use crate::core_ftpcommand::command::Command;
use crate::core_ftpcommand::handlers::{CommandHandler, HandlerError};
use crate::core_ftpcommand::invocation::{InvocationHistory, InvocationRecord};
use crate::core_reply::codes;
use crate::session::Session;
use async_trait::async_trait;

/// Stub PWD: always reports the configured directory, "/" by default.
#[derive(Debug)]
pub struct PwdStubHandler {
    directory: String,
    reply: StubReply,
    history: InvocationHistory,
}

impl PwdStubHandler {
    pub fn new() -> Self {
        Self {
            directory: "/".to_string(),
            reply: StubReply::new(codes::PATHNAME_CREATED),
            history: InvocationHistory::new(),
        }
    }

    pub fn with_directory(mut self, directory: &str) -> Self {
        self.directory = directory.to_string();
        self
    }
}

impl Default for PwdStubHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl_stub_reply_builders!(PwdStubHandler);

#[async_trait]
impl CommandHandler for PwdStubHandler {
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        self.history
            .push(InvocationRecord::new(command, session.client_host()));
        self.reply.send(session, &[self.directory.as_str()]).await?;
        Ok(())
    }

    fn invocations(&self) -> Option<&InvocationHistory> {
        Some(&self.history)
    }
}
