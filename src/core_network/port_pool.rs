use crate::core_network::error::PoolError;
use log::{debug, error};
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// A fixed set of passive-mode port numbers shared by every session.
///
/// Ports move between "available" and "leased" only through [`PortPool::lease`]
/// and [`PortPool::release`]; the set itself never grows or shrinks. The
/// semaphore holds exactly one permit per queued available port, which is
/// what makes `lease` wait while the pool is exhausted.
#[derive(Debug)]
pub struct PortPool {
    members: HashSet<u16>,
    state: Mutex<PoolState>,
    permits: Semaphore,
}

#[derive(Debug, Default)]
struct PoolState {
    available: VecDeque<u16>,
    leased: HashSet<u16>,
}

impl PortPool {
    /// Pool of `count` consecutive ports starting at `first`.
    pub fn new(first: u16, count: u16) -> Arc<Self> {
        Self::from_ports((first..=u16::MAX).take(count as usize))
    }

    pub fn from_ports(ports: impl IntoIterator<Item = u16>) -> Arc<Self> {
        let mut members = HashSet::new();
        let mut available = VecDeque::new();
        for port in ports {
            if members.insert(port) {
                available.push_back(port);
            }
        }

        let permits = Semaphore::new(available.len());
        Arc::new(Self {
            members,
            state: Mutex::new(PoolState {
                available,
                leased: HashSet::new(),
            }),
            permits,
        })
    }

    pub fn capacity(&self) -> usize {
        self.members.len()
    }

    pub fn available(&self) -> usize {
        self.state.lock().available.len()
    }

    pub fn leased(&self) -> usize {
        self.state.lock().leased.len()
    }

    /// `(available, leased)` read under a single lock.
    pub fn counts(&self) -> (usize, usize) {
        let state = self.state.lock();
        (state.available.len(), state.leased.len())
    }

    /// Waits until a port is free and leases it. The port comes back to the
    /// pool when the returned guard is dropped.
    ///
    /// Only fails once the pool has been closed.
    pub async fn lease(self: &Arc<Self>) -> Result<PortLease, PoolError> {
        let permit = self.permits.acquire().await.map_err(|_| PoolError::Closed)?;
        permit.forget();

        let port = {
            let mut state = self.state.lock();
            // A permit is only ever issued for a queued port
            let port = state.available.pop_front().ok_or(PoolError::Closed)?;
            state.leased.insert(port);
            port
        };

        debug!(
            "Leased port {} ({} of {} still available)",
            port,
            self.available(),
            self.capacity()
        );
        Ok(PortLease {
            pool: Arc::clone(self),
            port,
        })
    }

    /// Puts a leased port back. Ports outside the pool and ports that are
    /// not currently leased are refused, so nothing is ever queued twice.
    pub fn release(&self, port: u16) -> Result<(), PoolError> {
        if !self.members.contains(&port) {
            return Err(PoolError::UnknownPort(port));
        }

        {
            let mut state = self.state.lock();
            if !state.leased.remove(&port) {
                return Err(PoolError::NotLeased(port));
            }
            state.available.push_back(port);
        }
        self.permits.add_permits(1);

        debug!("Released port {}", port);
        Ok(())
    }

    /// Wakes every pending `lease` with [`PoolError::Closed`]. Used on shutdown.
    pub fn close(&self) {
        self.permits.close();
    }
}

/// A leased port. Dropping it returns the port to its pool.
#[derive(Debug)]
pub struct PortLease {
    pool: Arc<PortPool>,
    port: u16,
}

impl PortLease {
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Drop for PortLease {
    fn drop(&mut self) {
        if let Err(e) = self.pool.release(self.port) {
            error!("Port lease for {} could not be returned: {}", self.port, e);
        }
    }
}
