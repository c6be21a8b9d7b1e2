pub mod config;
pub mod core_auth;
pub mod core_cli;
pub mod core_fs;
pub mod core_ftpcommand;
pub mod core_log;
pub mod core_network;
pub mod core_reply;
pub mod server;
pub mod session;

pub use config::{Config, ServerMode};
pub use core_ftpcommand::command::Command;
pub use core_ftpcommand::handlers::{CommandHandler, HandlerError, HandlerOptions, HandlerRegistry};
pub use server::FtpServer;
pub use session::Session;
