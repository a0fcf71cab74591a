use crate::core_fs::FsError;
use crate::core_ftpcommand::error::CommandError;
use crate::session::Session;
use log::info;
use std::io;

/// Handles the CWD (Change Working Directory) FTP command.
///
/// The target must be an existing directory inside the sandbox. The session
/// keeps the logical form of it, never the host path.
pub async fn handle_cwd_command(session: &mut Session, arg: &str) -> Result<(), CommandError> {
    let dir = session.resolve(arg)?;
    match tokio::fs::metadata(&dir).await {
        Ok(metadata) if metadata.is_dir() => {}
        Ok(_) => {
            return Err(FsError::cant_access(
                dir.as_path(),
                io::Error::new(io::ErrorKind::Other, "not a directory"),
            )
            .into())
        }
        Err(e) => return Err(FsError::cant_access(dir.as_path(), e).into()),
    }

    session.current_dir = session.sandbox.logical_path(&dir);
    info!("{} -> CWD {}", session.peer, session.current_dir);
    session.reply("250 Directory successfully changed.\r\n").await
}
