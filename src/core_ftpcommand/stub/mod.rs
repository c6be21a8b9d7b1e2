// Stub handlers: canned replies, with every invocation recorded for tests.

use crate::core_reply::fill_placeholders;
use crate::session::Session;
use std::io;

/// Reply sent by a stub handler. Without an explicit text the catalog text
/// for the code is used; either may contain `{n}` placeholders.
#[derive(Debug, Clone)]
pub struct StubReply {
    pub code: u16,
    pub text: Option<String>,
}

impl StubReply {
    pub fn new(code: u16) -> Self {
        Self { code, text: None }
    }

    pub fn with_text(code: u16, text: &str) -> Self {
        Self {
            code,
            text: Some(text.to_string()),
        }
    }

    pub async fn send(&self, session: &mut Session, args: &[&str]) -> io::Result<()> {
        match &self.text {
            Some(text) => {
                let text = fill_placeholders(text, args);
                session.send_reply(self.code, &text).await
            }
            None => session.send_catalog_reply(self.code, args).await,
        }
    }
}

macro_rules! impl_stub_reply_builders {
    ($handler:ty) => {
        impl $handler {
            /// Overrides the reply code sent on success.
            pub fn with_reply_code(mut self, code: u16) -> Self {
                self.reply.code = code;
                self
            }

            /// Overrides the reply text sent on success.
            pub fn with_reply_text(mut self, text: &str) -> Self {
                self.reply.text = Some(text.to_string());
                self
            }
        }
    };
}

pub mod list;
pub mod pass;
pub mod pwd;
pub mod retr;
pub mod simple;
pub mod stor;
pub mod user;

pub use list::ListStubHandler;
pub use pass::PassStubHandler;
pub use pwd::PwdStubHandler;
pub use retr::RetrStubHandler;
pub use simple::StubCommandHandler;
pub use stor::StorStubHandler;
pub use user::UserStubHandler;

use crate::core_ftpcommand::common::{
    HelpCommandHandler, NoopCommandHandler, QuitCommandHandler, SystCommandHandler,
    TypeCommandHandler,
};
use crate::core_ftpcommand::handlers::{HandlerOptions, HandlerRegistry};
use crate::core_network::pasv::PasvCommandHandler;
use crate::core_network::port::PortCommandHandler;
use crate::core_reply::codes;

pub fn initialize_stub_handlers(registry: &HandlerRegistry, options: &HandlerOptions) {
    // Shared with fake mode
    registry.set_handler("HELP", HelpCommandHandler::new(&options.help_text));
    registry.set_handler("NOOP", NoopCommandHandler::new());
    registry.set_handler("PASV", PasvCommandHandler::new());
    registry.set_handler("PORT", PortCommandHandler::new());
    registry.set_handler("QUIT", QuitCommandHandler::new());
    registry.set_handler("SYST", SystCommandHandler::new(&options.system_name));
    registry.set_handler("TYPE", TypeCommandHandler::new());

    // Login
    registry.set_handler("USER", UserStubHandler::new());
    registry.set_handler("PASS", PassStubHandler::new());
    registry.set_handler(
        "ACCT",
        StubCommandHandler::new(codes::USER_LOGGED_IN).requiring(0, "account"),
    );
    registry.set_handler("REIN", StubCommandHandler::new(codes::SERVICE_READY));

    // Navigation and file management
    registry.set_handler("PWD", PwdStubHandler::new());
    registry.set_handler(
        "CWD",
        StubCommandHandler::new(codes::FILE_ACTION_OK).requiring(0, "pathname"),
    );
    registry.set_handler("CDUP", StubCommandHandler::new(codes::COMMAND_OK));
    registry.set_handler(
        "MKD",
        StubCommandHandler::new(codes::PATHNAME_CREATED)
            .requiring(0, "pathname")
            .with_reply_text("\"{0}\" created."),
    );
    registry.set_handler(
        "RMD",
        StubCommandHandler::new(codes::FILE_ACTION_OK).requiring(0, "pathname"),
    );
    registry.set_handler(
        "DELE",
        StubCommandHandler::new(codes::FILE_ACTION_OK).requiring(0, "pathname"),
    );
    registry.set_handler(
        "RNFR",
        StubCommandHandler::new(codes::PENDING_FURTHER_INFO).requiring(0, "pathname"),
    );
    registry.set_handler(
        "RNTO",
        StubCommandHandler::new(codes::FILE_ACTION_OK).requiring(0, "pathname"),
    );
    registry.set_handler(
        "SMNT",
        StubCommandHandler::new(codes::FILE_ACTION_OK).requiring(0, "pathname"),
    );
    registry.set_handler(
        "SITE",
        StubCommandHandler::new(codes::COMMAND_OK).requiring(0, "parameters"),
    );
    registry.set_handler(
        "STAT",
        StubCommandHandler::new(codes::SYSTEM_STATUS).recording(0, "pathname"),
    );

    // Transfer parameters
    registry.set_handler(
        "ALLO",
        StubCommandHandler::new(codes::COMMAND_OK).recording(0, "number_of_bytes"),
    );
    registry.set_handler(
        "MODE",
        StubCommandHandler::new(codes::COMMAND_OK).requiring(0, "mode"),
    );
    registry.set_handler(
        "STRU",
        StubCommandHandler::new(codes::COMMAND_OK).requiring(0, "structure"),
    );
    registry.set_handler(
        "REST",
        StubCommandHandler::new(codes::PENDING_FURTHER_INFO).requiring(0, "marker"),
    );
    registry.set_handler("ABOR", StubCommandHandler::new(codes::TRANSFER_COMPLETE));

    // Transfers
    registry.set_handler("STOR", StorStubHandler::new());
    registry.set_handler("APPE", StorStubHandler::new());
    registry.set_handler("STOU", StorStubHandler::unique());
    registry.set_handler("RETR", RetrStubHandler::new());
    registry.set_handler("LIST", ListStubHandler::new());
    registry.set_handler("NLST", ListStubHandler::new());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_ftpcommand::command::Command;
    use crate::core_reply::ReplyCatalog;
    use crate::session::{AuthState, Session};
    use std::sync::Arc;
    use tokio::io::{duplex, AsyncReadExt};

    #[tokio::test]
    async fn test_stub_registry_replies() {
        let registry = HandlerRegistry::stub(&HandlerOptions::default());
        let (mut client, server) = duplex(64 * 1024);
        let mut session = Session::new(server, Arc::new(ReplyCatalog::default()));
        let mut buf = vec![0u8; 4096];

        let expected = [
            ("USER alice", "331 "),
            ("PASS anything", "230 "),
            ("PWD", "257 \"/\" is current directory."),
            ("ACCT", "501 "),
            ("MKD reports", "257 \"reports\" created."),
            ("RNFR a", "350 "),
            ("REST 100", "350 "),
            ("STRU F", "200 "),
            ("ABOR", "226 "),
        ];
        for (line, prefix) in expected {
            let command = Command::parse(line).unwrap();
            registry
                .get_handler(command.verb())
                .handle(&command, &mut session)
                .await
                .unwrap();
            let n = client.read(&mut buf).await.unwrap();
            let reply = String::from_utf8_lossy(&buf[..n]);
            assert!(reply.starts_with(prefix), "{} -> {}", line, reply);
        }
        assert_eq!(session.auth_state(), AuthState::Authenticated);

        let rest = registry.get_handler("REST");
        let record = rest.invocations().unwrap().last().unwrap();
        assert_eq!(record.get_text("marker"), Some("100"));
    }

    #[tokio::test]
    async fn test_stub_transfer_without_data_mode() {
        let registry = HandlerRegistry::stub(&HandlerOptions::default());
        let (mut client, server) = duplex(64 * 1024);
        let mut session = Session::new(server, Arc::new(ReplyCatalog::default()));

        let command = Command::parse("STOR report.csv").unwrap();
        let stor = registry.get_handler("STOR");
        stor.handle(&command, &mut session).await.unwrap();
        drop(session);

        let mut output = String::new();
        client.read_to_string(&mut output).await.unwrap();
        let codes: Vec<&str> = output.lines().map(|line| &line[..3]).collect();
        assert_eq!(codes, vec!["150", "425"]);

        let record = stor.invocations().unwrap().get(0).unwrap();
        assert_eq!(record.get_text("pathname"), Some("report.csv"));
        assert!(!record.contains_key("file_contents"));
    }

    #[tokio::test]
    async fn test_missing_login_parameters_are_recorded() {
        let registry = HandlerRegistry::stub(&HandlerOptions::default());
        let (mut client, server) = duplex(64 * 1024);
        let mut session = Session::new(server, Arc::new(ReplyCatalog::default()));

        for verb in ["USER", "PASS"] {
            let command = Command::parse(verb).unwrap();
            let handler = registry.get_handler(verb);
            handler.handle(&command, &mut session).await.unwrap();

            let history = handler.invocations().unwrap();
            assert_eq!(history.len(), 1);
            assert!(history.get(0).unwrap().keys().next().is_none());
        }
        assert_eq!(session.auth_state(), AuthState::Unauthenticated);
        drop(session);

        let mut output = String::new();
        client.read_to_string(&mut output).await.unwrap();
        let codes: Vec<&str> = output.lines().map(|line| &line[..3]).collect();
        assert_eq!(codes, vec!["501", "501"]);
    }
}
