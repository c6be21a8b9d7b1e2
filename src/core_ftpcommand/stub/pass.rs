use super::StubReply;
use crate::core_ftpcommand::command::Command;
use crate::core_ftpcommand::handlers::{CommandHandler, HandlerError};
use crate::core_ftpcommand::invocation::{InvocationHistory, InvocationRecord};
use crate::core_ftpcommand::utils::reply_parameter_error;
use crate::core_reply::codes;
use crate::session::Session;
use async_trait::async_trait;

/// Stub PASS: accepts any password (230) and records it.
#[derive(Debug)]
pub struct PassStubHandler {
    reply: StubReply,
    history: InvocationHistory,
}

impl PassStubHandler {
    pub fn new() -> Self {
        Self {
            reply: StubReply::new(codes::USER_LOGGED_IN),
            history: InvocationHistory::new(),
        }
    }
}

impl Default for PassStubHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl_stub_reply_builders!(PassStubHandler);

#[async_trait]
impl CommandHandler for PassStubHandler {
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        let mut record = InvocationRecord::new(command, session.client_host());
        let password = match command.required_param(0) {
            Ok(password) => password,
            Err(e) => {
                self.history.push(record);
                return reply_parameter_error(session, e).await;
            }
        };

        record.set("password", password);
        self.history.push(record);

        if self.reply.code == codes::USER_LOGGED_IN {
            session.login(None);
        }
        self.reply.send(session, &[]).await?;
        Ok(())
    }

    fn invocations(&self) -> Option<&InvocationHistory> {
        Some(&self.history)
    }
}
