use crate::core_fs::{storage, FsError};
use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::transfer::{check_transfer_argument, spawn_transfer, strip_list_options};
use crate::session::Session;
use log::info;

/// Handles the LIST FTP command.
///
/// The directory is read before any data connection is requested, so a bad
/// path is answered with `550` and nothing else happens. The names are then
/// written on the data connection, one per line.
pub async fn handle_list_command(session: &mut Session, arg: &str) -> Result<(), CommandError> {
    let arg = strip_list_options(arg);
    check_transfer_argument(arg, false)?;

    let dir = session.resolve(arg)?;
    let names = storage::list_names(&dir).await?;
    info!(
        "{} -> LIST {} ({} entries)",
        session.peer,
        session.sandbox.logical_path(&dir),
        names.len()
    );

    spawn_transfer(session, "LIST".to_string(), move |mut data| async move {
        storage::write_listing(&names, &mut data).await?;
        Ok::<_, FsError>((data, names.len() as u64))
    });
    Ok(())
}
