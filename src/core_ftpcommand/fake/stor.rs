use super::{parent_directory, resolve_pathname, verify_access, Rejection};
use crate::core_fs::{Access, FileSystem, FileSystemError};
use crate::core_ftpcommand::command::Command;
use crate::core_ftpcommand::handlers::{CommandHandler, HandlerError};
use crate::core_ftpcommand::utils::{receive_upload, reply_parameter_error};
use crate::core_reply::codes;
use crate::session::Session;
use async_trait::async_trait;
use log::info;
use std::sync::Arc;

/// STOR and APPE. The target is checked before the data connection is
/// opened; the bytes are written once the upload completes.
pub struct StorCommandHandler {
    filesystem: Arc<dyn FileSystem>,
    append: bool,
}

impl StorCommandHandler {
    pub fn new(filesystem: Arc<dyn FileSystem>) -> Self {
        Self {
            filesystem,
            append: false,
        }
    }

    pub fn append(filesystem: Arc<dyn FileSystem>) -> Self {
        Self {
            filesystem,
            append: true,
        }
    }

    fn check_target(&self, session: &Session, target: &str) -> Result<(), Rejection> {
        let parent = parent_directory(self.filesystem.as_ref(), target)?;
        match self.filesystem.entry(target) {
            Some(entry) if entry.is_directory => {
                Err(FileSystemError::IsADirectory(target.to_string()).into())
            }
            Some(entry) => verify_access(session, &entry, Access::Write),
            None => verify_access(session, &parent, Access::Write),
        }
    }
}

#[async_trait]
impl CommandHandler for StorCommandHandler {
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        let target = match resolve_pathname(command, session) {
            Ok(target) => target,
            Err(e) => return reply_parameter_error(session, e).await,
        };
        if let Err(rejection) = self.check_target(session, &target) {
            return rejection.send(session).await;
        }

        let Some(contents) = receive_upload(session).await? else {
            return Ok(());
        };

        let written = self.filesystem.write_file(
            &target,
            &contents,
            self.append,
            session.username.as_deref(),
        );
        if let Err(e) = written {
            return Rejection::from(e).send(session).await;
        }
        info!("Stored {} bytes to {}", contents.len(), target);
        session
            .send_catalog_reply(codes::TRANSFER_COMPLETE, &[])
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{filesystem, logged_in_session, registry, run};

    #[tokio::test]
    async fn test_stor_checks_run_before_transfer() {
        let registry = registry(filesystem());
        let (mut client, mut session) = logged_in_session();
        let replies = run(
            &registry,
            &mut client,
            &mut session,
            &["STOR /srv/upload", "STOR /home/alice", "STOR /missing/file"],
        )
        .await;
        assert_eq!(replies.len(), 3);
        assert!(replies.iter().all(|reply| reply.starts_with("550 ")));
    }

    #[tokio::test]
    async fn test_stor_without_data_mode() {
        let registry = registry(filesystem());
        let (mut client, mut session) = logged_in_session();
        let replies = run(&registry, &mut client, &mut session, &["STOR upload.bin"]).await;
        assert!(replies[0].starts_with("150 "));
        assert!(replies[1].starts_with("425 "));
        assert!(!session.has_data_connection());
    }
}
