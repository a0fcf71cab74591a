use crate::core_ftpcommand::error::CommandError;
use crate::session::Session;

pub async fn handle_noop_command(session: &mut Session) -> Result<(), CommandError> {
    session.reply("200 NOOP ok.\r\n").await
}
