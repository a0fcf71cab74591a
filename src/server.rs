use crate::core_fs::Sandbox;
use crate::core_network::network;
use crate::core_network::port_pool::PortPool;
use crate::helpers::log_config;
use crate::Config;
use anyhow::{bail, Context, Result};
use log::{error, info};
use std::net::Ipv4Addr;
use std::sync::Arc;

/// Process wide state every session starts from.
#[derive(Debug, Clone)]
pub struct ServerContext {
    pub config: Arc<Config>,
    pub sandbox: Arc<Sandbox>,
    pub pool: Arc<PortPool>,
    pub pasv_ip: Option<Ipv4Addr>,
}

impl ServerContext {
    /// Creates the sandbox root and fills the port pool once.
    pub fn new(config: Config) -> Result<Self> {
        if config.server.pasv_port_count == 0 {
            bail!("pasv_port_count must be at least 1");
        }

        let root = config.server.sandbox_root()?;
        let sandbox = Sandbox::new(&root)
            .with_context(|| format!("Failed to prepare sandbox root {:?}", root))?;
        let pasv_ip = config.server.pasv_ipv4()?;
        let pool = PortPool::new(config.server.pasv_port_start, config.server.pasv_port_count);

        info!(
            "Sandbox root {:?}, {} passive ports",
            sandbox.root(),
            pool.capacity()
        );
        Ok(Self {
            config: Arc::new(config),
            sandbox: Arc::new(sandbox),
            pool,
            pasv_ip,
        })
    }
}

/// Runs the FTP server with the provided configuration until Ctrl-C.
pub async fn run(config: Config) -> Result<()> {
    info!("Starting server with config:");
    log_config(&config);

    let ctx = ServerContext::new(config)?;
    if let Err(e) = network::start_server(ctx).await {
        error!("Server stopped: {:#}", e);
        return Err(e);
    }

    info!("Server stopped.");
    Ok(())
}
