use super::{resolve_pathname, verify_access, verify_file, Rejection};
use crate::core_fs::{Access, FileSystem};
use crate::core_ftpcommand::command::Command;
use crate::core_ftpcommand::handlers::{CommandHandler, HandlerError};
use crate::core_ftpcommand::utils::{reply_parameter_error, send_download};
use crate::core_reply::codes;
use crate::session::Session;
use async_trait::async_trait;
use log::info;
use std::sync::Arc;

pub struct RetrCommandHandler {
    filesystem: Arc<dyn FileSystem>,
}

impl RetrCommandHandler {
    pub fn new(filesystem: Arc<dyn FileSystem>) -> Self {
        Self { filesystem }
    }

    fn contents(&self, session: &Session, target: &str) -> Result<Vec<u8>, Rejection> {
        let entry = verify_file(self.filesystem.as_ref(), target)?;
        verify_access(session, &entry, Access::Read)?;
        Ok(self.filesystem.read_file(target)?)
    }
}

#[async_trait]
impl CommandHandler for RetrCommandHandler {
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        let target = match resolve_pathname(command, session) {
            Ok(target) => target,
            Err(e) => return reply_parameter_error(session, e).await,
        };
        let contents = match self.contents(session, &target) {
            Ok(contents) => contents,
            Err(rejection) => return rejection.send(session).await,
        };

        if send_download(session, &contents).await? {
            info!("Sent {} bytes from {}", contents.len(), target);
            session
                .send_catalog_reply(codes::TRANSFER_COMPLETE, &[])
                .await?;
        }
        Ok(())
    }
}
