// Errors raised while establishing data connections and leasing ports
use std::io;
use std::net::{IpAddr, SocketAddr};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataConnError {
    #[error("No data address: send PORT or PASV first")]
    NoDataAddress,

    #[error("Failed to connect to {addr}: {source}")]
    Dial {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("Failed to listen on port {port}: {source}")]
    Listen {
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("Failed to accept data connection: {0}")]
    Accept(#[source] io::Error),

    #[error("Passive listener is gone")]
    ListenerGone,

    #[error("Cannot advertise non IPv4 address {0} in PASV reply")]
    NotIpv4(IpAddr),
}

impl DataConnError {
    pub fn to_ftp_response(&self) -> String {
        "425 Can't open data connection.\r\n".to_string()
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PoolError {
    #[error("Port pool is closed")]
    Closed,

    #[error("Port {0} does not belong to the pool")]
    UnknownPort(u16),

    #[error("Port {0} is not currently leased")]
    NotLeased(u16),
}
