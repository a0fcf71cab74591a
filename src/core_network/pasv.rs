use crate::core_ftpcommand::error::CommandError;
use crate::core_network::data_conn::{AcceptSlot, PassiveChannel};
use crate::core_network::error::DataConnError;
use crate::core_network::port_pool::PortPool;
use crate::helpers::{send_response, ControlWriter};
use crate::session::Session;
use log::{debug, error, info, trace, warn};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};

/// Handles the PASV command.
///
/// The reply is not sent from here: the background listener answers with
/// `227` once it holds a port, which may take a while if the pool is empty.
/// A PASV issued before the previous listener served any transfer is refused.
pub async fn handle_pasv_command(session: &mut Session) -> Result<(), CommandError> {
    if session.passive.as_ref().is_some_and(|p| p.is_pending()) {
        warn!("{} -> PASV while a passive listener is still unused", session.peer);
        return Err(CommandError::PassivePending);
    }

    let advertised = session.advertised_ip()?;
    let channel = spawn_passive_listener(
        Arc::clone(&session.pool),
        Arc::clone(&session.writer),
        advertised,
        session.peer,
    );

    // Replacing an older channel lets its listener wind down
    session.enter_passive(channel);
    Ok(())
}

/// Starts the listener task and returns the session's end of it.
pub fn spawn_passive_listener(
    pool: Arc<PortPool>,
    writer: ControlWriter,
    advertised: Ipv4Addr,
    peer: SocketAddr,
) -> PassiveChannel {
    let (requests_tx, requests_rx) = mpsc::channel(1);
    let (attached, detached) = oneshot::channel();
    tokio::spawn(run_passive_listener(
        pool,
        writer,
        advertised,
        peer,
        requests_rx,
        detached,
    ));
    PassiveChannel::new(requests_tx, attached)
}

/// `227 Entering Passive Mode (h1,h2,h3,h4,p1,p2).`
pub fn format_pasv_reply(ip: Ipv4Addr, port: u16) -> String {
    let [h1, h2, h3, h4] = ip.octets();
    format!(
        "227 Entering Passive Mode ({},{},{},{},{},{}).\r\n",
        h1,
        h2,
        h3,
        h4,
        port >> 8,
        port & 0xFF
    )
}

/// Owns one port lease for as long as the session stays in this passive
/// mode. Accepts exactly one connection per slot received and delivers it
/// into that slot. Ends when the session drops its channel; the lease is
/// dropped on every way out, returning the port.
///
/// On the ways out that never served a transfer the request queue is closed
/// before anything is replied, so the session sees the listener as gone by
/// the time the client can react.
async fn run_passive_listener(
    pool: Arc<PortPool>,
    writer: ControlWriter,
    advertised: Ipv4Addr,
    peer: SocketAddr,
    mut requests: mpsc::Receiver<AcceptSlot>,
    mut detached: oneshot::Receiver<()>,
) {
    let lease = tokio::select! {
        lease = pool.lease() => lease,
        _ = &mut detached => {
            debug!("{} -> left passive mode before a port was free", peer);
            return;
        }
    };
    let lease = match lease {
        Ok(lease) => lease,
        Err(e) => {
            warn!("{} -> no passive port: {}", peer, e);
            requests.close();
            return;
        }
    };
    let port = lease.port();
    debug!("{} -> got port {}", peer, port);

    let listener = match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
        Ok(listener) => listener,
        Err(source) => {
            requests.close();
            drop(lease);
            let e = DataConnError::Listen { port, source };
            error!("{} -> {}", peer, e);
            if let Err(e) = send_response(&writer, e.to_ftp_response().as_bytes()).await {
                warn!("{} -> failed to send PASV failure: {}", peer, e);
            }
            return;
        }
    };

    let response = format_pasv_reply(advertised, port);
    if let Err(e) = send_response(&writer, response.as_bytes()).await {
        warn!("{} -> failed to send PASV response: {}", peer, e);
        return;
    }
    info!("{} -> passive listener on port {}", peer, port);

    while let Some(mut slot) = requests.recv().await {
        let accepted = tokio::select! {
            accepted = listener.accept() => Some(accepted),
            _ = slot.closed() => None,
        };

        match accepted {
            Some(Ok((stream, addr))) => {
                debug!("{} -> accepted data connection from {}", peer, addr);
                if slot.send(Ok(stream)).is_err() {
                    trace!("{} -> transfer went away before its connection arrived", peer);
                }
            }
            Some(Err(e)) => {
                warn!("{} -> accept on port {} failed: {}", peer, port, e);
                let _ = slot.send(Err(DataConnError::Accept(e)));
            }
            None => debug!("{} -> data connection request abandoned", peer),
        }
    }

    debug!("{} -> passive listener on port {} closed", peer, port);
    drop(lease);
}
