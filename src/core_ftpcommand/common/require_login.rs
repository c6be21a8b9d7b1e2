use crate::core_ftpcommand::command::Command;
use crate::core_ftpcommand::handlers::{CommandHandler, HandlerError};
use crate::core_ftpcommand::invocation::InvocationHistory;
use crate::core_ftpcommand::utils::verify_logged_in;
use crate::session::Session;
use async_trait::async_trait;

/// Wraps a handler so it only runs for logged-in sessions; otherwise 530 is
/// sent and the session is left untouched.
pub struct RequireLogin<H> {
    inner: H,
}

impl<H> RequireLogin<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<H> CommandHandler for RequireLogin<H>
where
    H: CommandHandler,
{
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        if !verify_logged_in(session).await? {
            return Ok(());
        }
        self.inner.handle(command, session).await
    }

    fn invocations(&self) -> Option<&InvocationHistory> {
        self.inner.invocations()
    }
}
