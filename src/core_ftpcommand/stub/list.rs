use super::StubReply;
use crate::core_ftpcommand::command::Command;
use crate::core_ftpcommand::handlers::{CommandHandler, HandlerError};
use crate::core_ftpcommand::invocation::{InvocationHistory, InvocationRecord};
use crate::core_ftpcommand::utils::send_download;
use crate::core_reply::codes;
use crate::session::Session;
use async_trait::async_trait;

/// Stub LIST/NLST: sends the configured listing text as is.
#[derive(Debug)]
pub struct ListStubHandler {
    listing: String,
    reply: StubReply,
    history: InvocationHistory,
}

impl ListStubHandler {
    pub fn new() -> Self {
        Self {
            listing: String::new(),
            reply: StubReply::new(codes::TRANSFER_COMPLETE),
            history: InvocationHistory::new(),
        }
    }

    pub fn with_directory_listing(mut self, listing: &str) -> Self {
        self.listing = listing.to_string();
        self
    }
}

impl Default for ListStubHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl_stub_reply_builders!(ListStubHandler);

#[async_trait]
impl CommandHandler for ListStubHandler {
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        let mut record = InvocationRecord::new(command, session.client_host());
        if let Some(pathname) = command.param(0) {
            record.set("pathname", pathname);
        }
        self.history.push(record);

        if send_download(session, self.listing.as_bytes()).await? {
            self.reply.send(session, &[]).await?;
        }
        Ok(())
    }

    fn invocations(&self) -> Option<&InvocationHistory> {
        Some(&self.history)
    }
}
