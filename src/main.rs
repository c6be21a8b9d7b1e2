use anyhow::Result;
use clap::Parser;
use log::info;
use mockftpd::config::Config;
use mockftpd::core_cli::Cli;
use mockftpd::core_log::logger::init_logger;
use mockftpd::server;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();
    init_logger(args.verbose);

    // Load configuration from the TOML file, or run on defaults
    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => {
            info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    // Command-line overrides
    if let Some(port) = args.port {
        config.server.listen_port = port;
    }
    if let Some(mode) = args.mode {
        config.server.mode = mode;
    }

    server::run(config).await
}
