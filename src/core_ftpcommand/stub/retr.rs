use super::StubReply;
use crate::core_ftpcommand::command::Command;
use crate::core_ftpcommand::handlers::{CommandHandler, HandlerError};
use crate::core_ftpcommand::invocation::{InvocationHistory, InvocationRecord};
use crate::core_ftpcommand::utils::{reply_parameter_error, send_download};
use crate::core_reply::codes;
use crate::session::Session;
use async_trait::async_trait;

/// Stub RETR: sends the configured contents whatever the pathname.
#[derive(Debug)]
pub struct RetrStubHandler {
    file_contents: Vec<u8>,
    reply: StubReply,
    history: InvocationHistory,
}

impl RetrStubHandler {
    pub fn new() -> Self {
        Self {
            file_contents: Vec::new(),
            reply: StubReply::new(codes::TRANSFER_COMPLETE),
            history: InvocationHistory::new(),
        }
    }

    pub fn with_file_contents(mut self, contents: impl Into<Vec<u8>>) -> Self {
        self.file_contents = contents.into();
        self
    }
}

impl Default for RetrStubHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl_stub_reply_builders!(RetrStubHandler);

#[async_trait]
impl CommandHandler for RetrStubHandler {
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        let mut record = InvocationRecord::new(command, session.client_host());
        let pathname = match command.required_param(0) {
            Ok(pathname) => pathname,
            Err(e) => {
                self.history.push(record);
                return reply_parameter_error(session, e).await;
            }
        };
        record.set("pathname", pathname);
        self.history.push(record);

        if send_download(session, &self.file_contents).await? {
            self.reply.send(session, &[]).await?;
        }
        Ok(())
    }

    fn invocations(&self) -> Option<&InvocationHistory> {
        Some(&self.history)
    }
}
