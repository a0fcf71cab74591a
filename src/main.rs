use anyhow::Result;
use clap::Parser;
use log::info;
use minftpd::core_cli::Cli;
use minftpd::core_log::init_logger;
use minftpd::{server, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    init_logger(args.verbose);

    // Load configuration from the TOML file, defaults without one
    let mut config = match args.config.as_deref() {
        Some(path) => {
            info!("Loading configuration from {}", path);
            Config::load_from_file(path)?
        }
        None => Config::default(),
    };

    // CLI flags override the config file
    if let Some(port) = args.port {
        config.server.listen_port = port;
    }
    if let Some(root) = args.root {
        config.server.root_dir = Some(root);
    }

    server::run(config).await
}
