use crate::core_fs::{storage, FsError};
use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::transfer::{check_transfer_argument, spawn_transfer};
use crate::session::Session;
use log::info;

/// Handles the RETR (Retrieve) FTP command.
///
/// Opens the file first; only a readable regular file inside the sandbox
/// gets a data connection. Text mode sends every line with a CRLF ending.
pub async fn handle_retr_command(session: &mut Session, arg: &str) -> Result<(), CommandError> {
    check_transfer_argument(arg, true)?;

    let path = session.resolve(arg)?;
    let file = storage::open_for_retrieve(&path).await?;
    let binary = session.binary;
    let buffer_size = session.config.server.download_buffer();
    info!("{} -> sending file: {:?}", session.peer, path.as_path());

    spawn_transfer(session, format!("RETR {}", arg), move |mut data| async move {
        let sent = storage::send_file(file, &mut data, binary, buffer_size).await?;
        Ok::<_, FsError>((data, sent))
    });
    Ok(())
}
