use crate::core_ftpcommand::error::CommandError;
use crate::session::Session;
use log::info;

/// Handles the USER FTP command.
///
/// There is no authentication: any name is accepted and logged in at once,
/// and nothing about it is kept.
pub async fn handle_user_command(session: &mut Session, username: &str) -> Result<(), CommandError> {
    info!("{} -> USER {}", session.peer, username);
    session.reply("230 User logged in, proceed.\r\n").await
}
