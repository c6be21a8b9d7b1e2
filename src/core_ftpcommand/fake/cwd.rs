use super::{resolve_pathname, verify_access, verify_directory, Rejection};
use crate::core_fs::{Access, FileSystem};
use crate::core_ftpcommand::command::Command;
use crate::core_ftpcommand::handlers::{CommandHandler, HandlerError};
use crate::core_ftpcommand::utils::reply_parameter_error;
use crate::core_reply::codes;
use crate::session::Session;
use async_trait::async_trait;
use log::info;
use std::sync::Arc;

/// Checks that the session may enter `target`.
fn check_enter(
    filesystem: &dyn FileSystem,
    session: &Session,
    target: &str,
) -> Result<(), Rejection> {
    let entry = verify_directory(filesystem, target)?;
    verify_access(session, &entry, Access::Execute)
}

pub struct CwdCommandHandler {
    filesystem: Arc<dyn FileSystem>,
}

impl CwdCommandHandler {
    pub fn new(filesystem: Arc<dyn FileSystem>) -> Self {
        Self { filesystem }
    }
}

#[async_trait]
impl CommandHandler for CwdCommandHandler {
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        let target = match resolve_pathname(command, session) {
            Ok(target) => target,
            Err(e) => return reply_parameter_error(session, e).await,
        };
        if let Err(rejection) = check_enter(self.filesystem.as_ref(), session, &target) {
            return rejection.send(session).await;
        }
        info!("Changed directory to {}", target);
        session.current_dir = target;
        session.send_catalog_reply(codes::FILE_ACTION_OK, &[]).await?;
        Ok(())
    }
}

/// CDUP: moves to the parent of the current directory. At the root there is
/// no parent and the command fails with 550 every time.
pub struct CdupCommandHandler {
    filesystem: Arc<dyn FileSystem>,
}

impl CdupCommandHandler {
    pub fn new(filesystem: Arc<dyn FileSystem>) -> Self {
        Self { filesystem }
    }
}

#[async_trait]
impl CommandHandler for CdupCommandHandler {
    async fn handle(&self, _command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        let checked = self
            .filesystem
            .parent(&session.current_dir)
            .ok_or_else(|| Rejection::new(codes::FILE_UNAVAILABLE, "No parent directory."))
            .and_then(|parent| {
                check_enter(self.filesystem.as_ref(), session, &parent).map(|()| parent)
            });
        match checked {
            Ok(parent) => {
                session.current_dir = parent;
                session.send_catalog_reply(codes::COMMAND_OK, &[]).await?;
                Ok(())
            }
            Err(rejection) => rejection.send(session).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{filesystem, logged_in_session, registry, run, session};

    #[tokio::test]
    async fn test_cwd_relative_and_absolute() {
        let registry = registry(filesystem());
        let (mut client, mut session) = logged_in_session();
        let replies = run(&registry, &mut client, &mut session, &["CWD ..", "CWD /srv"]).await;
        assert!(replies[0].starts_with("250 "));
        assert!(replies[1].starts_with("250 "));
        assert_eq!(session.current_dir, "/srv");
    }

    #[tokio::test]
    async fn test_cwd_failures_leave_directory() {
        let registry = registry(filesystem());
        let (mut client, mut session) = logged_in_session();
        let replies = run(
            &registry,
            &mut client,
            &mut session,
            &["CWD missing", "CWD notes.txt", "CWD /vault", "CWD"],
        )
        .await;
        assert!(replies[0].starts_with("550 "));
        assert!(replies[1].starts_with("550 "));
        assert!(replies[2].starts_with("550 "));
        assert!(replies[3].starts_with("501 "));
        assert_eq!(session.current_dir, "/home/alice");
    }

    #[tokio::test]
    async fn test_cdup_stops_at_root() {
        let registry = registry(filesystem());
        let (mut client, mut session) = logged_in_session();
        let replies = run(
            &registry,
            &mut client,
            &mut session,
            &["CDUP", "CDUP", "CDUP", "CDUP", "PWD"],
        )
        .await;
        assert!(replies[0].starts_with("200 "));
        assert!(replies[1].starts_with("200 "));
        assert!(replies[2].starts_with("550 "));
        assert!(replies[3].starts_with("550 "));
        assert_eq!(replies[4], "257 \"/\" is current directory.");
        assert_eq!(session.current_dir, "/");
    }

    #[tokio::test]
    async fn test_requires_login() {
        let registry = registry(filesystem());
        let (mut client, mut session) = session();
        let replies = run(&registry, &mut client, &mut session, &["CWD /srv", "CDUP"]).await;
        assert!(replies[0].starts_with("530 "));
        assert!(replies[1].starts_with("530 "));
        assert_eq!(session.current_dir, "/");
    }
}
