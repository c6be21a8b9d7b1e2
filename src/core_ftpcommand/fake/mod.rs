// Fake handlers: commands run against the simulated filesystem and the
// account store. Everything but the login verbs requires a logged-in session.

pub mod cwd;
pub mod dele;
pub mod list;
pub mod login;
pub mod mkd;
pub mod pwd;
pub mod rename;
pub mod retr;
pub mod rmd;
pub mod size;
pub mod stor;

pub use cwd::{CdupCommandHandler, CwdCommandHandler};
pub use dele::DeleCommandHandler;
pub use list::ListCommandHandler;
pub use login::{PassCommandHandler, UserCommandHandler};
pub use mkd::MkdCommandHandler;
pub use pwd::PwdCommandHandler;
pub use rename::{RnfrCommandHandler, RntoCommandHandler};
pub use retr::RetrCommandHandler;
pub use rmd::RmdCommandHandler;
pub use size::SizeCommandHandler;
pub use stor::StorCommandHandler;

use crate::core_auth::AccountStore;
use crate::core_fs::{path, Access, FileSystem, FileSystemEntry, FileSystemError};
use crate::core_ftpcommand::command::{Command, ParameterError};
use crate::core_ftpcommand::common::{
    HelpCommandHandler, NoopCommandHandler, QuitCommandHandler, RequireLogin, SystCommandHandler,
    TypeCommandHandler,
};
use crate::core_ftpcommand::handlers::{HandlerError, HandlerOptions, HandlerRegistry};
use crate::core_network::pasv::PasvCommandHandler;
use crate::core_network::port::PortCommandHandler;
use crate::session::Session;
use log::warn;
use std::sync::Arc;

pub fn initialize_fake_handlers(
    registry: &HandlerRegistry,
    filesystem: Arc<dyn FileSystem>,
    accounts: Arc<dyn AccountStore>,
    options: &HandlerOptions,
) {
    // No login needed
    registry.set_handler("HELP", HelpCommandHandler::new(&options.help_text));
    registry.set_handler("NOOP", NoopCommandHandler::new());
    registry.set_handler("ALLO", NoopCommandHandler::with_text("ALLO command ignored."));
    registry.set_handler("QUIT", QuitCommandHandler::new());
    registry.set_handler("SYST", SystCommandHandler::new(&options.system_name));
    registry.set_handler(
        "USER",
        UserCommandHandler::new(Arc::clone(&filesystem), Arc::clone(&accounts)),
    );
    registry.set_handler(
        "PASS",
        PassCommandHandler::new(Arc::clone(&filesystem), Arc::clone(&accounts)),
    );

    // Session parameters
    registry.set_handler("PASV", RequireLogin::new(PasvCommandHandler::new()));
    registry.set_handler("PORT", RequireLogin::new(PortCommandHandler::new()));
    registry.set_handler("TYPE", RequireLogin::new(TypeCommandHandler::new()));

    // Navigation and file management
    let fs = || Arc::clone(&filesystem);
    registry.set_handler("PWD", RequireLogin::new(PwdCommandHandler::new()));
    registry.set_handler("CWD", RequireLogin::new(CwdCommandHandler::new(fs())));
    registry.set_handler("CDUP", RequireLogin::new(CdupCommandHandler::new(fs())));
    registry.set_handler("MKD", RequireLogin::new(MkdCommandHandler::new(fs())));
    registry.set_handler("RMD", RequireLogin::new(RmdCommandHandler::new(fs())));
    registry.set_handler("DELE", RequireLogin::new(DeleCommandHandler::new(fs())));
    registry.set_handler("RNFR", RequireLogin::new(RnfrCommandHandler::new(fs())));
    registry.set_handler("RNTO", RequireLogin::new(RntoCommandHandler::new(fs())));
    registry.set_handler("SIZE", RequireLogin::new(SizeCommandHandler::new(fs())));

    // Transfers
    registry.set_handler("STOR", RequireLogin::new(StorCommandHandler::new(fs())));
    registry.set_handler("APPE", RequireLogin::new(StorCommandHandler::append(fs())));
    registry.set_handler("RETR", RequireLogin::new(RetrCommandHandler::new(fs())));
    registry.set_handler("LIST", RequireLogin::new(ListCommandHandler::new(fs())));
    registry.set_handler("NLST", RequireLogin::new(ListCommandHandler::names_only(fs())));
}

/// Reply that ends a fake handler early instead of performing the action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub code: u16,
    pub text: String,
}

impl Rejection {
    pub fn new(code: u16, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
        }
    }

    pub async fn send(self, session: &mut Session) -> Result<(), HandlerError> {
        warn!("Command rejected with {}: {}", self.code, self.text);
        session.send_reply(self.code, &self.text).await?;
        Ok(())
    }
}

impl From<FileSystemError> for Rejection {
    fn from(err: FileSystemError) -> Self {
        let (code, text) = err.to_ftp_response();
        Self { code, text }
    }
}

/// The pathname argument. Commas are part of a path, so the parameters the
/// command line was split into are joined back together.
pub fn pathname(command: &Command) -> Result<String, ParameterError> {
    let joined = command.params().join(",");
    if joined.is_empty() {
        return Err(ParameterError::Missing(0));
    }
    Ok(joined)
}

pub fn existing_entry(
    filesystem: &dyn FileSystem,
    path: &str,
) -> Result<FileSystemEntry, Rejection> {
    filesystem
        .entry(path)
        .ok_or_else(|| FileSystemError::NotFound(path.to_string()).into())
}

pub fn verify_directory(
    filesystem: &dyn FileSystem,
    path: &str,
) -> Result<FileSystemEntry, Rejection> {
    let entry = existing_entry(filesystem, path)?;
    if !entry.is_directory {
        return Err(FileSystemError::NotADirectory(path.to_string()).into());
    }
    Ok(entry)
}

pub fn verify_file(filesystem: &dyn FileSystem, path: &str) -> Result<FileSystemEntry, Rejection> {
    let entry = existing_entry(filesystem, path)?;
    if entry.is_directory {
        return Err(FileSystemError::IsADirectory(path.to_string()).into());
    }
    Ok(entry)
}

/// Checks `access` on `entry` for the logged-in user.
pub fn verify_access(
    session: &Session,
    entry: &FileSystemEntry,
    access: Access,
) -> Result<(), Rejection> {
    let username = session.username.as_deref().unwrap_or("");
    if entry.permits(access, username, session.groups()) {
        Ok(())
    } else {
        Err(FileSystemError::PermissionDenied(entry.path.clone()).into())
    }
}

/// The parent directory of `target`, which must exist.
pub fn parent_directory(
    filesystem: &dyn FileSystem,
    target: &str,
) -> Result<FileSystemEntry, Rejection> {
    let parent = filesystem
        .parent(target)
        .ok_or_else(|| FileSystemError::InvalidPath(target.to_string()))?;
    verify_directory(filesystem, &parent)
}

/// Resolves the pathname argument against the current directory.
pub fn resolve_pathname(command: &Command, session: &Session) -> Result<String, ParameterError> {
    let arg = pathname(command)?;
    Ok(path::resolve(&session.current_dir, &arg))
}
