use crate::core_ftpcommand::command::Command;
use crate::core_ftpcommand::handlers::{CommandHandler, HandlerError};
use crate::core_reply::codes;
use crate::session::Session;
use async_trait::async_trait;

#[derive(Debug, Default)]
pub struct PwdCommandHandler;

impl PwdCommandHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandHandler for PwdCommandHandler {
    async fn handle(&self, _command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        let current_dir = session.current_dir.clone();
        session
            .send_catalog_reply(codes::PATHNAME_CREATED, &[current_dir.as_str()])
            .await?;
        Ok(())
    }
}
