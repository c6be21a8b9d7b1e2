use super::{pathname, verify_access, Rejection};
use crate::core_fs::{path, Access, FileSystem};
use crate::core_ftpcommand::command::Command;
use crate::core_ftpcommand::handlers::{CommandHandler, HandlerError};
use crate::core_ftpcommand::utils::{format_listing, send_download};
use crate::core_reply::codes;
use crate::session::Session;
use async_trait::async_trait;
use std::sync::Arc;

/// LIST sends `ls -l` style lines, NLST only the names. A path that does not
/// exist produces an empty listing.
pub struct ListCommandHandler {
    filesystem: Arc<dyn FileSystem>,
    names_only: bool,
}

impl ListCommandHandler {
    pub fn new(filesystem: Arc<dyn FileSystem>) -> Self {
        Self {
            filesystem,
            names_only: false,
        }
    }

    pub fn names_only(filesystem: Arc<dyn FileSystem>) -> Self {
        Self {
            filesystem,
            names_only: true,
        }
    }

    fn listing(&self, session: &Session, target: &str) -> Result<Vec<String>, Rejection> {
        if let Some(entry) = self.filesystem.entry(target) {
            verify_access(session, &entry, Access::Read)?;
        }
        let lines = self
            .filesystem
            .list(target)
            .iter()
            .map(|entry| {
                if self.names_only {
                    entry.name().to_string()
                } else {
                    entry.format_unix_listing()
                }
            })
            .collect();
        Ok(lines)
    }
}

#[async_trait]
impl CommandHandler for ListCommandHandler {
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        let target = match pathname(command) {
            Ok(arg) => path::resolve(&session.current_dir, &arg),
            Err(_) => session.current_dir.clone(),
        };
        let lines = match self.listing(session, &target) {
            Ok(lines) => lines,
            Err(rejection) => return rejection.send(session).await,
        };

        if send_download(session, &format_listing(&lines)).await? {
            session
                .send_catalog_reply(codes::TRANSFER_COMPLETE, &[])
                .await?;
        }
        Ok(())
    }
}
