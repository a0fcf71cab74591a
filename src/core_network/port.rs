use crate::core_ftpcommand::error::CommandError;
use crate::session::Session;
use log::{info, warn};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

/// Parses the PORT argument `h1,h2,h3,h4,p1,p2` into the address the
/// server should dial for the next data connection.
pub fn parse_port_argument(arg: &str) -> Result<SocketAddr, CommandError> {
    let parts: Vec<&str> = arg.split(',').map(str::trim).collect();
    if parts.len() != 6 {
        return Err(CommandError::Syntax(format!(
            "PORT expects 6 comma separated numbers, got {}",
            parts.len()
        )));
    }

    let mut octets = [0u8; 6];
    for (octet, part) in octets.iter_mut().zip(&parts) {
        *octet = part
            .parse::<u8>()
            .map_err(|_| CommandError::Syntax(format!("Invalid PORT number: {:?}", part)))?;
    }

    let ip = Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]);
    let port = (u16::from(octets[4]) << 8) + u16::from(octets[5]);
    Ok(SocketAddr::V4(SocketAddrV4::new(ip, port)))
}

/// Handles the PORT (Active Mode) FTP command.
///
/// Only records the address; the connection is dialed when a transfer
/// command needs it. Malformed arguments leave the session untouched.
pub async fn handle_port_command(session: &mut Session, arg: &str) -> Result<(), CommandError> {
    let addr = match parse_port_argument(arg) {
        Ok(addr) => addr,
        Err(e) => {
            warn!("{} -> rejected PORT {:?}: {}", session.peer, arg, e);
            return Err(e);
        }
    };

    info!("{} -> active mode, data address {}", session.peer, addr);
    session.enter_active(addr);
    session.reply("200 PORT command successful.\r\n").await
}
