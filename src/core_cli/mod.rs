use crate::config::ServerMode;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "mockftpd", about = "A mock FTP server for testing FTP clients.")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Control port, overriding the configuration file (0 picks a free port)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Handler family, overriding the configuration file
    #[arg(short, long, value_enum)]
    pub mode: Option<ServerMode>,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}
