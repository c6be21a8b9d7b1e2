use super::{pathname, verify_directory};
use crate::core_auth::{AccountStore, UserAccount};
use crate::core_fs::FileSystem;
use crate::core_ftpcommand::command::Command;
use crate::core_ftpcommand::handlers::{CommandHandler, HandlerError};
use crate::core_ftpcommand::utils::reply_parameter_error;
use crate::core_reply::codes;
use crate::session::Session;
use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;

/// Logs `account` in when its home directory exists, replying 230; 530
/// otherwise.
async fn complete_login(
    filesystem: &dyn FileSystem,
    account: UserAccount,
    session: &mut Session,
) -> Result<(), HandlerError> {
    if let Err(rejection) = verify_directory(filesystem, &account.home_directory) {
        warn!(
            "Home directory of {} is unusable: {}",
            account.username, rejection.text
        );
        session.send_catalog_reply(codes::NOT_LOGGED_IN, &[]).await?;
        return Ok(());
    }
    info!("User {} logged in", account.username);
    session.login(Some(account));
    session.send_catalog_reply(codes::USER_LOGGED_IN, &[]).await?;
    Ok(())
}

pub struct UserCommandHandler {
    filesystem: Arc<dyn FileSystem>,
    accounts: Arc<dyn AccountStore>,
}

impl UserCommandHandler {
    pub fn new(filesystem: Arc<dyn FileSystem>, accounts: Arc<dyn AccountStore>) -> Self {
        Self {
            filesystem,
            accounts,
        }
    }
}

#[async_trait]
impl CommandHandler for UserCommandHandler {
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        let username = match command.required_param(0) {
            Ok(username) => username,
            Err(e) => return reply_parameter_error(session, e).await,
        };
        session.set_username(username);

        // Accounts without a password are in after USER alone.
        match self.accounts.lookup(username) {
            Some(account) if !account.password_required => {
                complete_login(self.filesystem.as_ref(), account, session).await
            }
            _ => {
                session.send_catalog_reply(codes::NEED_PASSWORD, &[]).await?;
                Ok(())
            }
        }
    }
}

pub struct PassCommandHandler {
    filesystem: Arc<dyn FileSystem>,
    accounts: Arc<dyn AccountStore>,
}

impl PassCommandHandler {
    pub fn new(filesystem: Arc<dyn FileSystem>, accounts: Arc<dyn AccountStore>) -> Self {
        Self {
            filesystem,
            accounts,
        }
    }
}

#[async_trait]
impl CommandHandler for PassCommandHandler {
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        let password = match pathname(command) {
            Ok(password) => password,
            Err(e) => return reply_parameter_error(session, e).await,
        };

        let Some(username) = session.username.clone() else {
            warn!("PASS received before USER");
            session.send_catalog_reply(codes::BAD_SEQUENCE, &[]).await?;
            return Ok(());
        };

        let account = match self.accounts.lookup(&username) {
            Some(account) if account.is_valid_password(&password) => account,
            Some(_) => {
                warn!("Invalid password for user {}", username);
                session.send_catalog_reply(codes::NOT_LOGGED_IN, &[]).await?;
                return Ok(());
            }
            None => {
                warn!("Login attempt for unknown user {}", username);
                session.send_catalog_reply(codes::NOT_LOGGED_IN, &[]).await?;
                return Ok(());
            }
        };
        complete_login(self.filesystem.as_ref(), account, session).await
    }
}
