use super::{resolve_pathname, verify_file};
use crate::core_fs::FileSystem;
use crate::core_ftpcommand::command::Command;
use crate::core_ftpcommand::handlers::{CommandHandler, HandlerError};
use crate::core_ftpcommand::utils::reply_parameter_error;
use crate::core_reply::codes;
use crate::session::Session;
use async_trait::async_trait;
use std::sync::Arc;

/// SIZE: `213 <bytes>` for a file.
pub struct SizeCommandHandler {
    filesystem: Arc<dyn FileSystem>,
}

impl SizeCommandHandler {
    pub fn new(filesystem: Arc<dyn FileSystem>) -> Self {
        Self { filesystem }
    }
}

#[async_trait]
impl CommandHandler for SizeCommandHandler {
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        let target = match resolve_pathname(command, session) {
            Ok(target) => target,
            Err(e) => return reply_parameter_error(session, e).await,
        };
        match verify_file(self.filesystem.as_ref(), &target) {
            Ok(entry) => {
                let size = entry.size.to_string();
                session
                    .send_catalog_reply(codes::FILE_STATUS, &[size.as_str()])
                    .await?;
                Ok(())
            }
            Err(rejection) => rejection.send(session).await,
        }
    }
}
