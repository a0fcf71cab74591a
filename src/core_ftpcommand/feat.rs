use crate::core_ftpcommand::error::CommandError;
use crate::session::Session;

/// Handles the FEAT FTP command. No extensions are advertised.
pub async fn handle_feat_command(session: &mut Session) -> Result<(), CommandError> {
    session.reply("211 No features.\r\n").await
}
