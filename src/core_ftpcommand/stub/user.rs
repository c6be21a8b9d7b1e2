use super::StubReply;
use crate::core_ftpcommand::command::Command;
use crate::core_ftpcommand::handlers::{CommandHandler, HandlerError};
use crate::core_ftpcommand::invocation::{InvocationHistory, InvocationRecord};
use crate::core_ftpcommand::utils::reply_parameter_error;
use crate::core_reply::codes;
use crate::session::Session;
use async_trait::async_trait;
use log::info;

/// Stub USER: records the username and asks for a password (331).
#[derive(Debug)]
pub struct UserStubHandler {
    reply: StubReply,
    history: InvocationHistory,
}

impl UserStubHandler {
    pub fn new() -> Self {
        Self {
            reply: StubReply::new(codes::NEED_PASSWORD),
            history: InvocationHistory::new(),
        }
    }
}

impl Default for UserStubHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl_stub_reply_builders!(UserStubHandler);

#[async_trait]
impl CommandHandler for UserStubHandler {
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        let mut record = InvocationRecord::new(command, session.client_host());
        let username = match command.required_param(0) {
            Ok(username) => username,
            Err(e) => {
                self.history.push(record);
                return reply_parameter_error(session, e).await;
            }
        };
        info!("Received USER command with username: {}", username);

        record.set("username", username);
        self.history.push(record);

        session.set_username(username);
        self.reply.send(session, &[username]).await?;
        Ok(())
    }

    fn invocations(&self) -> Option<&InvocationHistory> {
        Some(&self.history)
    }
}
