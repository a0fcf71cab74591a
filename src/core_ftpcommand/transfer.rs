use crate::core_fs::FsError;
use crate::core_ftpcommand::error::CommandError;
use crate::core_network::data_conn::DataSource;
use crate::helpers::{send_response, ControlWriter};
use crate::session::Session;
use log::{debug, info, warn};
use std::future::Future;
use std::net::SocketAddr;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// Arguments of LIST, RETR and STOR are a single path. Anything with a
/// space in it is refused, as is a missing path where one is required.
pub fn check_transfer_argument(arg: &str, required: bool) -> Result<(), CommandError> {
    if arg.contains(char::is_whitespace) {
        return Err(CommandError::Syntax(format!("extra arguments in {:?}", arg)));
    }
    if required && arg.is_empty() {
        return Err(CommandError::Syntax("missing path".to_string()));
    }
    Ok(())
}

/// Drops `ls` style flags (`-l`, `-la`, ...) clients like to send with LIST.
pub fn strip_list_options(arg: &str) -> &str {
    let mut rest = arg.trim_start();
    while rest.starts_with('-') {
        rest = rest
            .find(char::is_whitespace)
            .map_or("", |end| rest[end..].trim_start());
    }
    rest
}

/// Hands the data transfer of a command to a background task and returns
/// right away, leaving the control connection free.
///
/// The data source is taken from the session now, so a PORT or PASV read
/// after this command does not affect it. The task replies `150` once the
/// data connection is up and `226` after `work` finished and the connection
/// is closed; any failure gets its own reply instead.
pub fn spawn_transfer<F, Fut>(session: &mut Session, label: String, work: F)
where
    F: FnOnce(TcpStream) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(TcpStream, u64), FsError>> + Send + 'static,
{
    let source = session.data_source();
    let writer = session.writer.clone();
    let peer = session.peer;
    tokio::spawn(run_transfer(writer, peer, source, label, work));
}

async fn run_transfer<F, Fut>(
    writer: ControlWriter,
    peer: SocketAddr,
    source: DataSource,
    label: String,
    work: F,
) where
    F: FnOnce(TcpStream) -> Fut,
    Fut: Future<Output = Result<(TcpStream, u64), FsError>>,
{
    let stream = match source.connect().await {
        Ok(stream) => stream,
        Err(e) => {
            warn!("{} -> {}: {}", peer, label, e);
            reply(&writer, peer, &e.to_ftp_response()).await;
            return;
        }
    };

    if !reply(
        &writer,
        peer,
        "150 File status okay; about to open data connection.\r\n",
    )
    .await
    {
        return;
    }

    match work(stream).await {
        Ok((stream, bytes)) => {
            close_data_connection(stream).await;
            info!("{} -> {} done, {} bytes", peer, label, bytes);
            reply(&writer, peer, "226 Closing data connection.\r\n").await;
        }
        Err(e) => {
            warn!("{} -> {} failed: {}", peer, label, e);
            reply(&writer, peer, &e.to_ftp_response()).await;
        }
    }
}

/// Shuts down the write side so the client sees end of data, then drops
/// the connection.
pub async fn close_data_connection(mut stream: TcpStream) {
    if let Err(e) = stream.shutdown().await {
        debug!("Data connection shutdown failed: {}", e);
    }
}

// The session loop notices a dead control connection on its next read
async fn reply(writer: &ControlWriter, peer: SocketAddr, message: &str) -> bool {
    match send_response(writer, message.as_bytes()).await {
        Ok(()) => true,
        Err(e) => {
            warn!("{} -> failed to send reply: {}", peer, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_transfer_argument() {
        assert!(check_transfer_argument("foo.txt", true).is_ok());
        assert!(check_transfer_argument("", false).is_ok());
        assert!(matches!(
            check_transfer_argument("", true),
            Err(CommandError::Syntax(_))
        ));
        assert!(matches!(
            check_transfer_argument("a b", false),
            Err(CommandError::Syntax(_))
        ));
    }

    #[test]
    fn test_strip_list_options() {
        assert_eq!(strip_list_options(""), "");
        assert_eq!(strip_list_options("-la"), "");
        assert_eq!(strip_list_options("-l sub"), "sub");
        assert_eq!(strip_list_options("-l -a sub"), "sub");
        assert_eq!(strip_list_options("../../etc"), "../../etc");
        assert_eq!(strip_list_options("-l a b"), "a b");
    }
}
