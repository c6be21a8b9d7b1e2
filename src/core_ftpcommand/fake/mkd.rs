use super::{parent_directory, resolve_pathname, verify_access, Rejection};
use crate::core_fs::{Access, FileSystem, FileSystemError};
use crate::core_ftpcommand::command::Command;
use crate::core_ftpcommand::handlers::{CommandHandler, HandlerError};
use crate::core_ftpcommand::utils::reply_parameter_error;
use crate::core_reply::codes;
use crate::session::Session;
use async_trait::async_trait;
use log::info;
use std::sync::Arc;

/// MKD: creates a directory owned by the logged-in user. Needs write and
/// execute permission on the parent.
pub struct MkdCommandHandler {
    filesystem: Arc<dyn FileSystem>,
}

impl MkdCommandHandler {
    pub fn new(filesystem: Arc<dyn FileSystem>) -> Self {
        Self { filesystem }
    }

    fn create(&self, session: &Session, target: &str) -> Result<(), Rejection> {
        let parent = parent_directory(self.filesystem.as_ref(), target)?;
        if self.filesystem.exists(target) {
            return Err(FileSystemError::AlreadyExists(target.to_string()).into());
        }
        verify_access(session, &parent, Access::Write)?;
        verify_access(session, &parent, Access::Execute)?;
        self.filesystem
            .create_directory(target, session.username.as_deref())?;
        Ok(())
    }
}

#[async_trait]
impl CommandHandler for MkdCommandHandler {
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        let target = match resolve_pathname(command, session) {
            Ok(target) => target,
            Err(e) => return reply_parameter_error(session, e).await,
        };
        if let Err(rejection) = self.create(session, &target) {
            return rejection.send(session).await;
        }
        info!("Directory created: {}", target);
        session
            .send_reply(codes::PATHNAME_CREATED, &format!("\"{}\" created.", target))
            .await?;
        Ok(())
    }
}
