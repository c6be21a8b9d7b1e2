use super::{
    existing_entry, parent_directory, resolve_pathname, verify_access, Rejection,
};
use crate::core_fs::{Access, FileSystem};
use crate::core_ftpcommand::command::Command;
use crate::core_ftpcommand::handlers::{CommandHandler, HandlerError};
use crate::core_ftpcommand::utils::reply_parameter_error;
use crate::core_reply::codes;
use crate::session::Session;
use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;

/// Session attribute holding the source path between RNFR and RNTO.
pub const RENAME_FROM: &str = "rename_from";

pub struct RnfrCommandHandler {
    filesystem: Arc<dyn FileSystem>,
}

impl RnfrCommandHandler {
    pub fn new(filesystem: Arc<dyn FileSystem>) -> Self {
        Self { filesystem }
    }
}

#[async_trait]
impl CommandHandler for RnfrCommandHandler {
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        let source = match resolve_pathname(command, session) {
            Ok(source) => source,
            Err(e) => return reply_parameter_error(session, e).await,
        };
        let checked = existing_entry(self.filesystem.as_ref(), &source)
            .and_then(|entry| verify_access(session, &entry, Access::Read));
        if let Err(rejection) = checked {
            return rejection.send(session).await;
        }
        session.set_attribute(RENAME_FROM, &source);
        session
            .send_catalog_reply(codes::PENDING_FURTHER_INFO, &[])
            .await?;
        Ok(())
    }
}

pub struct RntoCommandHandler {
    filesystem: Arc<dyn FileSystem>,
}

impl RntoCommandHandler {
    pub fn new(filesystem: Arc<dyn FileSystem>) -> Self {
        Self { filesystem }
    }

    fn rename(&self, session: &Session, from: &str, to: &str) -> Result<(), Rejection> {
        let parent = parent_directory(self.filesystem.as_ref(), to)?;
        verify_access(session, &parent, Access::Write)?;
        self.filesystem.rename(from, to)?;
        Ok(())
    }
}

#[async_trait]
impl CommandHandler for RntoCommandHandler {
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        let target = match resolve_pathname(command, session) {
            Ok(target) => target,
            Err(e) => return reply_parameter_error(session, e).await,
        };
        let Some(source) = session.remove_attribute(RENAME_FROM) else {
            warn!("RNTO received without RNFR");
            session.send_catalog_reply(codes::BAD_SEQUENCE, &[]).await?;
            return Ok(());
        };
        if let Err(rejection) = self.rename(session, &source, &target) {
            return rejection.send(session).await;
        }
        info!("Renamed {} to {}", source, target);
        session.send_catalog_reply(codes::FILE_ACTION_OK, &[]).await?;
        Ok(())
    }
}
