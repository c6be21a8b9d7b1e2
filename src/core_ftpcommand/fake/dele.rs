use super::{parent_directory, resolve_pathname, verify_access, verify_file, Rejection};
use crate::core_fs::{Access, FileSystem};
use crate::core_ftpcommand::command::Command;
use crate::core_ftpcommand::handlers::{CommandHandler, HandlerError};
use crate::core_ftpcommand::utils::reply_parameter_error;
use crate::core_reply::codes;
use crate::session::Session;
use async_trait::async_trait;
use log::info;
use std::sync::Arc;

pub struct DeleCommandHandler {
    filesystem: Arc<dyn FileSystem>,
}

impl DeleCommandHandler {
    pub fn new(filesystem: Arc<dyn FileSystem>) -> Self {
        Self { filesystem }
    }

    fn remove(&self, session: &Session, target: &str) -> Result<(), Rejection> {
        verify_file(self.filesystem.as_ref(), target)?;
        let parent = parent_directory(self.filesystem.as_ref(), target)?;
        verify_access(session, &parent, Access::Write)?;
        self.filesystem.delete(target)?;
        Ok(())
    }
}

#[async_trait]
impl CommandHandler for DeleCommandHandler {
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        let target = match resolve_pathname(command, session) {
            Ok(target) => target,
            Err(e) => return reply_parameter_error(session, e).await,
        };
        if let Err(rejection) = self.remove(session, &target) {
            return rejection.send(session).await;
        }
        info!("File deleted: {}", target);
        session.send_catalog_reply(codes::FILE_ACTION_OK, &[]).await?;
        Ok(())
    }
}
