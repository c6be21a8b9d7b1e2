use crate::core_ftpcommand::command::Command;
use crate::core_ftpcommand::handlers::{CommandHandler, HandlerError};
use crate::core_ftpcommand::invocation::{InvocationHistory, InvocationRecord};
use crate::core_reply::codes;
use crate::session::Session;
use async_trait::async_trait;
use log::info;

/// Handles the SYST (System) FTP command.
///
/// The system name is configurable and defaults to "WINDOWS" so clients
/// parse listings as they would from a Windows-style server.
#[derive(Debug)]
pub struct SystCommandHandler {
    system_name: String,
    history: InvocationHistory,
}

impl SystCommandHandler {
    pub fn new(system_name: &str) -> Self {
        Self {
            system_name: system_name.to_string(),
            history: InvocationHistory::new(),
        }
    }
}

impl Default for SystCommandHandler {
    fn default() -> Self {
        Self::new("WINDOWS")
    }
}

#[async_trait]
impl CommandHandler for SystCommandHandler {
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        info!("Responding to SYST command with system type {}.", self.system_name);
        self.history
            .push(InvocationRecord::new(command, session.client_host()));
        session
            .send_catalog_reply(codes::SYSTEM_TYPE, &[self.system_name.as_str()])
            .await?;
        Ok(())
    }

    fn invocations(&self) -> Option<&InvocationHistory> {
        Some(&self.history)
    }
}
