use crate::core_fs::{FsError, ResolvedPath, Sandbox};
use crate::core_ftpcommand::error::CommandError;
use crate::core_network::data_conn::{DataSource, PassiveChannel};
use crate::core_network::error::DataConnError;
use crate::core_network::port_pool::PortPool;
use crate::helpers::{send_response, ControlWriter};
use crate::server::ServerContext;
use crate::Config;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

/// Per-connection protocol state. Owned by the task running the session
/// loop; background transfer tasks only get copies of what they need.
#[derive(Debug)]
pub struct Session {
    pub writer: ControlWriter,
    pub peer: SocketAddr,     // For logging
    pub local_ip: IpAddr,     // Our side of the control connection
    pub config: Arc<Config>,
    pub sandbox: Arc<Sandbox>,
    pub pool: Arc<PortPool>,
    pub pasv_ip: Option<Ipv4Addr>, // Configured PASV address, if any
    pub current_dir: String, // Logical, relative to the sandbox root
    pub binary: bool,
    pub quitting: bool,
    pub data_addr: Option<SocketAddr>, // Set by PORT
    pub passive: Option<PassiveChannel>,
}

impl Session {
    pub fn new(writer: ControlWriter, peer: SocketAddr, local_ip: IpAddr, ctx: &ServerContext) -> Self {
        Self {
            writer,
            peer,
            local_ip,
            config: Arc::clone(&ctx.config),
            sandbox: Arc::clone(&ctx.sandbox),
            pool: Arc::clone(&ctx.pool),
            pasv_ip: ctx.pasv_ip,
            current_dir: String::from("/"),
            binary: false,
            quitting: false,
            data_addr: None,
            passive: None,
        }
    }

    /// Writes one reply line on the control connection. A failure here is
    /// fatal to the session.
    pub async fn reply(&self, message: &str) -> Result<(), CommandError> {
        send_response(&self.writer, message.as_bytes()).await?;
        Ok(())
    }

    pub fn resolve(&self, arg: &str) -> Result<ResolvedPath, FsError> {
        self.sandbox.resolve(&self.current_dir, arg)
    }

    /// Switches to active mode. Any passive listener is let go, which ends it
    /// and returns its port to the pool.
    pub fn enter_active(&mut self, addr: SocketAddr) {
        self.passive = None;
        self.data_addr = Some(addr);
    }

    pub fn enter_passive(&mut self, channel: PassiveChannel) {
        self.passive = Some(channel);
    }

    /// The data connection source for the transfer command being started.
    pub fn data_source(&mut self) -> DataSource {
        DataSource::for_session(self.passive.as_mut(), self.data_addr)
    }

    /// Address advertised in the 227 reply.
    pub fn advertised_ip(&self) -> Result<Ipv4Addr, DataConnError> {
        if let Some(ip) = self.pasv_ip {
            return Ok(ip);
        }
        match self.local_ip {
            IpAddr::V4(ip) => Ok(ip),
            IpAddr::V6(ip) => ip
                .to_ipv4_mapped()
                .ok_or(DataConnError::NotIpv4(self.local_ip)),
        }
    }
}
