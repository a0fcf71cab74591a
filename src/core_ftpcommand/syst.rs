use crate::core_ftpcommand::error::CommandError;
use crate::session::Session;

/// Handles the SYST (System) FTP command.
pub async fn handle_syst_command(session: &mut Session) -> Result<(), CommandError> {
    session.reply("215 UNIX Type: L8\r\n").await
}
