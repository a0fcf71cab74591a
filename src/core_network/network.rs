use crate::constants::MAX_COMMAND_LINE;
use crate::core_ftpcommand::ftpcommand::parse_command_line;
use crate::core_ftpcommand::handlers::execute_command;
use crate::helpers::{send_response, ControlWriter};
use crate::server::ServerContext;
use crate::session::Session;
use anyhow::{Context, Result};
use log::{error, info, warn};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

/// Binds the control listener and serves until Ctrl-C.
pub async fn start_server(ctx: ServerContext) -> Result<()> {
    let bind_addr = format!(
        "{}:{}",
        ctx.config.server.listen_address, ctx.config.server.listen_port
    );
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind control listener on {}", bind_addr))?;
    info!("Server listening on {}", bind_addr);

    let pool = Arc::clone(&ctx.pool);
    tokio::select! {
        result = serve(listener, ctx) => result,
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            info!("Shutting down server");
            pool.close();
            Ok(())
        }
    }
}

/// Accept loop: one task per control connection.
///
/// Every session runs in its own task behind a supervising task, so a panic
/// in one session is logged and goes no further.
pub async fn serve(listener: TcpListener, ctx: ServerContext) -> Result<()> {
    loop {
        let (socket, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Error accepting connection: {}", e);
                tokio::time::sleep(Duration::from_millis(100)).await;
                continue;
            }
        };
        info!("New connection from {}", addr);

        let ctx = ctx.clone();
        let session = tokio::spawn(async move { handle_connection(socket, ctx).await });
        tokio::spawn(async move {
            match session.await {
                Ok(Ok(())) => info!("Connection closed for {}", addr),
                Ok(Err(e)) => info!("Connection closed for {}: {:#}", addr, e),
                Err(e) if e.is_panic() => error!("Session for {} panicked", addr),
                Err(e) => warn!("Session for {} was cancelled: {}", addr, e),
            }
        });
    }
}

/// Runs one session: greet, then read and execute commands one at a time
/// until QUIT or a control connection failure.
pub async fn handle_connection(socket: TcpStream, ctx: ServerContext) -> Result<()> {
    let peer = socket.peer_addr()?;
    let local_ip = socket.local_addr()?.ip();
    let (read_half, write_half) = socket.into_split();
    let writer: ControlWriter = Arc::new(Mutex::new(write_half));

    send_response(&writer, b"220 Service ready for new user.\r\n").await?;

    let mut session = Session::new(writer, peer, local_ip, &ctx);
    let mut reader = BufReader::new(read_half);
    let mut buffer = String::new();

    while !session.quitting {
        buffer.clear();
        let n = (&mut reader)
            .take(MAX_COMMAND_LINE)
            .read_line(&mut buffer)
            .await?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "client disconnected without QUIT",
            )
            .into());
        }
        if n as u64 >= MAX_COMMAND_LINE && !buffer.ends_with('\n') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("command line longer than {} bytes", MAX_COMMAND_LINE),
            )
            .into());
        }

        let line = parse_command_line(&buffer)?;
        info!("{} -> {} {}", peer, line.verb, line.arg);

        execute_command(&mut session, &line).await?;
    }

    Ok(())
}
