use crate::core_ftpcommand::error::CommandError;
use crate::session::Session;
use log::info;

/// Handles the QUIT FTP command. The session loop stops after this reply.
pub async fn handle_quit_command(session: &mut Session) -> Result<(), CommandError> {
    info!("{} -> QUIT", session.peer);
    session.quitting = true;
    session.reply("221 Service closing control connection.\r\n").await
}
