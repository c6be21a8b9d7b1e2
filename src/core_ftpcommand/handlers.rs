use crate::core_auth::AccountStore;
use crate::core_fs::{FileSystem, FileSystemError};
use crate::core_ftpcommand::command::Command;
use crate::core_ftpcommand::common::UnsupportedCommandHandler;
use crate::core_ftpcommand::invocation::InvocationHistory;
use crate::core_ftpcommand::{fake, stub};
use crate::core_network::data::DataConnectionError;
use crate::session::Session;
use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

/// Failure that escaped a handler. The server loop logs it and answers 451.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    DataConnection(#[from] DataConnectionError),

    #[error(transparent)]
    FileSystem(#[from] FileSystemError),

    #[error("{0}")]
    Internal(String),
}

/// Logic bound to one command verb.
///
/// Handlers answer protocol-level failures with a reply code and return
/// `Ok(())`; an `Err` means the handler could not complete at all.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError>;

    /// Invocations recorded by this handler, for handlers that record them.
    fn invocations(&self) -> Option<&InvocationHistory> {
        None
    }
}

/// Settings shared by the handlers of both registry flavours.
#[derive(Debug, Clone)]
pub struct HandlerOptions {
    /// Name sent in the SYST reply. Defaults to "WINDOWS", matching a
    /// Windows-style server.
    pub system_name: String,
    pub help_text: String,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            system_name: "WINDOWS".to_string(),
            help_text: "Help information.".to_string(),
        }
    }
}

/// Verb to handler mapping shared by every connection of a server.
///
/// Lookups are case-insensitive and never fail: an unknown verb resolves to
/// the unsupported-command handler. Replacing a binding swaps the `Arc` under
/// the write lock, so a concurrent lookup sees either the old or the new
/// handler.
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<String, Arc<dyn CommandHandler>>>,
    unsupported: Arc<dyn CommandHandler>,
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerRegistry {
    /// An empty registry: every verb is unsupported.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            unsupported: Arc::new(UnsupportedCommandHandler::new()),
        }
    }

    /// Registry of canned-reply handlers that record what they receive.
    pub fn stub(options: &HandlerOptions) -> Self {
        let registry = Self::new();
        stub::initialize_stub_handlers(&registry, options);
        registry
    }

    /// Registry of handlers backed by a simulated filesystem and accounts.
    pub fn fake(
        filesystem: Arc<dyn FileSystem>,
        accounts: Arc<dyn AccountStore>,
        options: &HandlerOptions,
    ) -> Self {
        let registry = Self::new();
        fake::initialize_fake_handlers(&registry, filesystem, accounts, options);
        registry
    }

    pub fn get_handler(&self, verb: &str) -> Arc<dyn CommandHandler> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&verb.to_ascii_uppercase())
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.unsupported))
    }

    pub fn set_handler<H>(&self, verb: &str, handler: H)
    where
        H: CommandHandler + 'static,
    {
        self.set_shared_handler(verb, Arc::new(handler));
    }

    /// Binds an already shared handler, e.g. one a test keeps a handle to
    /// for inspecting its invocations.
    pub fn set_shared_handler(&self, verb: &str, handler: Arc<dyn CommandHandler>) {
        let verb = verb.to_ascii_uppercase();
        debug!("Registering handler for {}", verb);
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(verb, handler);
    }

    pub fn is_registered(&self, verb: &str) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&verb.to_ascii_uppercase())
    }

    /// Registered verbs, sorted.
    pub fn verbs(&self) -> Vec<String> {
        let mut verbs: Vec<String> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        verbs.sort();
        verbs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_ftpcommand::common::NoopCommandHandler;
    use crate::core_reply::ReplyCatalog;
    use tokio::io::{duplex, AsyncReadExt};

    async fn reply_of(handler: Arc<dyn CommandHandler>, line: &str) -> String {
        let (mut client, server) = duplex(4096);
        let mut session = Session::new(server, Arc::new(ReplyCatalog::default()));
        let command = Command::parse(line).unwrap();
        handler.handle(&command, &mut session).await.unwrap();
        drop(session);
        let mut output = String::new();
        client.read_to_string(&mut output).await.unwrap();
        output
    }

    #[tokio::test]
    async fn test_unregistered_verbs_are_unsupported() {
        let registry = HandlerRegistry::stub(&HandlerOptions::default());
        for verb in ["EPSV", "XYZZY", "feat", "MDTM"] {
            assert!(!registry.is_registered(verb));
            let reply = reply_of(registry.get_handler(verb), verb).await;
            assert!(reply.starts_with("502 "), "{} -> {}", verb, reply);
        }
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let registry = HandlerRegistry::new();
        registry.set_handler("noop", NoopCommandHandler::new());
        assert!(registry.is_registered("NOOP"));
        let reply = reply_of(registry.get_handler("NoOp"), "noop").await;
        assert!(reply.starts_with("200 "));
    }

    #[tokio::test]
    async fn test_last_registration_wins() {
        let registry = HandlerRegistry::new();
        registry.set_handler("NOOP", NoopCommandHandler::new());
        registry.set_handler("NOOP", UnsupportedCommandHandler::new());
        let reply = reply_of(registry.get_handler("NOOP"), "NOOP").await;
        assert!(reply.starts_with("502 "));
    }

    #[test]
    fn test_fake_and_stub_register_core_verbs() {
        let stub = HandlerRegistry::stub(&HandlerOptions::default());
        let fake = HandlerRegistry::fake(
            Arc::new(crate::core_fs::InMemoryFileSystem::new()),
            Arc::new(crate::core_auth::InMemoryAccountStore::new()),
            &HandlerOptions::default(),
        );
        for verb in ["USER", "PASS", "PWD", "CWD", "CDUP", "PORT", "PASV", "STOR", "RETR", "QUIT", "SYST"] {
            assert!(stub.is_registered(verb), "stub missing {}", verb);
            assert!(fake.is_registered(verb), "fake missing {}", verb);
        }
    }

    #[test]
    fn test_concurrent_lookups_during_swap() {
        let registry = Arc::new(HandlerRegistry::new());
        registry.set_handler("NOOP", NoopCommandHandler::new());

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        let _ = registry.get_handler("NOOP");
                    }
                })
            })
            .collect();
        for _ in 0..100 {
            registry.set_handler("NOOP", NoopCommandHandler::new());
        }
        for reader in readers {
            reader.join().unwrap();
        }
        assert!(registry.is_registered("NOOP"));
    }
}
