use crate::core_network::error::DataConnError;
use log::debug;
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};

/// One-shot slot a transfer hands to the passive listener; the listener
/// fills it with the next accepted connection.
pub type AcceptSlot = oneshot::Sender<Result<TcpStream, DataConnError>>;

/// Session side of a running passive listener.
///
/// Dropping it tells the listener the session left passive mode, whether
/// the listener is still waiting for a port or already accepting.
#[derive(Debug)]
pub struct PassiveChannel {
    requests: mpsc::Sender<AcceptSlot>,
    _attached: oneshot::Sender<()>,
    served: bool,
}

impl PassiveChannel {
    pub fn new(requests: mpsc::Sender<AcceptSlot>, attached: oneshot::Sender<()>) -> Self {
        Self {
            requests,
            _attached: attached,
            served: false,
        }
    }

    /// True while the listener is alive and no transfer has asked it for a
    /// connection yet. A listener that gave up (no port, bind failure) is
    /// not pending.
    pub fn is_pending(&self) -> bool {
        !self.served && !self.requests.is_closed()
    }

    fn take_source(&mut self) -> DataSource {
        self.served = true;
        DataSource::Passive(self.requests.clone())
    }
}

/// Where the next data connection comes from. Captured by a transfer
/// command when it starts and used exactly once.
#[derive(Debug)]
pub enum DataSource {
    /// Dial the address given by PORT.
    Active(SocketAddr),
    /// Ask the session's passive listener for its next accepted connection.
    Passive(mpsc::Sender<AcceptSlot>),
    /// Neither PORT nor PASV has been issued.
    Unset,
}

impl DataSource {
    pub fn for_session(passive: Option<&mut PassiveChannel>, active: Option<SocketAddr>) -> Self {
        match (passive, active) {
            (Some(channel), _) => channel.take_source(),
            (None, Some(addr)) => DataSource::Active(addr),
            (None, None) => DataSource::Unset,
        }
    }

    /// Produces the connected transport. Single attempt, no retry.
    pub async fn connect(self) -> Result<TcpStream, DataConnError> {
        match self {
            DataSource::Active(addr) => {
                debug!("Establishing active data connection with {}", addr);
                TcpStream::connect(addr)
                    .await
                    .map_err(|source| DataConnError::Dial { addr, source })
            }
            DataSource::Passive(requests) => {
                let (slot, delivery) = oneshot::channel();
                requests
                    .send(slot)
                    .await
                    .map_err(|_| DataConnError::ListenerGone)?;
                delivery.await.map_err(|_| DataConnError::ListenerGone)?
            }
            DataSource::Unset => Err(DataConnError::NoDataAddress),
        }
    }
}
