use super::{parent_directory, resolve_pathname, verify_access, verify_directory, Rejection};
use crate::core_fs::{Access, FileSystem, FileSystemError};
use crate::core_ftpcommand::command::Command;
use crate::core_ftpcommand::handlers::{CommandHandler, HandlerError};
use crate::core_ftpcommand::utils::reply_parameter_error;
use crate::core_reply::codes;
use crate::session::Session;
use async_trait::async_trait;
use log::info;
use std::sync::Arc;

pub struct RmdCommandHandler {
    filesystem: Arc<dyn FileSystem>,
}

impl RmdCommandHandler {
    pub fn new(filesystem: Arc<dyn FileSystem>) -> Self {
        Self { filesystem }
    }

    fn remove(&self, session: &Session, target: &str) -> Result<(), Rejection> {
        verify_directory(self.filesystem.as_ref(), target)?;
        if !self.filesystem.list(target).is_empty() {
            return Err(FileSystemError::DirectoryNotEmpty(target.to_string()).into());
        }
        let parent = parent_directory(self.filesystem.as_ref(), target)?;
        verify_access(session, &parent, Access::Write)?;
        self.filesystem.delete(target)?;
        Ok(())
    }
}

#[async_trait]
impl CommandHandler for RmdCommandHandler {
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        let target = match resolve_pathname(command, session) {
            Ok(target) => target,
            Err(e) => return reply_parameter_error(session, e).await,
        };
        if let Err(rejection) = self.remove(session, &target) {
            return rejection.send(session).await;
        }
        info!("Directory removed: {}", target);
        session.send_catalog_reply(codes::FILE_ACTION_OK, &[]).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{filesystem, logged_in_session, registry, run};
    use crate::core_fs::FileSystem;

    #[tokio::test]
    async fn test_rmd() {
        let fs = filesystem();
        fs.add_directory("/home/alice/empty").unwrap();
        let registry = registry(fs.clone());
        let (mut client, mut session) = logged_in_session();
        let replies = run(
            &registry,
            &mut client,
            &mut session,
            &["RMD empty", "RMD /home/alice", "RMD notes.txt", "RMD /srv"],
        )
        .await;
        assert!(replies[0].starts_with("250 "));
        assert!(!fs.exists("/home/alice/empty"));
        // Not empty
        assert!(replies[1].starts_with("550 "));
        // Not a directory
        assert!(replies[2].starts_with("550 "));
        // Still holds the readme
        assert!(replies[3].starts_with("550 "));
        assert!(fs.exists("/srv"));
    }
}
