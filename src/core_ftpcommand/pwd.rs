use crate::core_ftpcommand::error::CommandError;
use crate::session::Session;

/// Handles the PWD (Print Working Directory) FTP command.
pub async fn handle_pwd_command(session: &mut Session) -> Result<(), CommandError> {
    let response = format!(
        "257 \"{}\" is the current directory.\r\n",
        session.current_dir.replace('"', "\"\"")
    );
    session.reply(&response).await
}
