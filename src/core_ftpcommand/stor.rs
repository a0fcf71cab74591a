use crate::core_fs::{storage, FsError};
use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::transfer::{check_transfer_argument, spawn_transfer};
use crate::session::Session;
use log::info;

/// Handles the STOR (Store File) FTP command.
///
/// The target is checked up front but only created once the data
/// connection is open, so a failed connection leaves no empty file. An
/// interrupted upload keeps what was received.
pub async fn handle_stor_command(session: &mut Session, arg: &str) -> Result<(), CommandError> {
    check_transfer_argument(arg, true)?;

    let path = session.resolve(arg)?;
    storage::check_storable(&path).await?;
    let binary = session.binary;
    let buffer_size = session.config.server.upload_buffer();
    info!("{} -> receiving file: {:?}", session.peer, path.as_path());

    spawn_transfer(session, format!("STOR {}", arg), move |mut data| async move {
        let stored = storage::store_file(&path, &mut data, binary, buffer_size).await?;
        Ok::<_, FsError>((data, stored))
    });
    Ok(())
}
