use crate::core_ftpcommand::error::CommandError;
use crate::session::Session;
use log::debug;

/// Handles the TYPE FTP command.
///
/// `A` (optionally `A N`) selects text mode, `I` or `L 8` binary mode.
/// Every other representation is refused with `504`.
pub async fn handle_type_command(session: &mut Session, arg: &str) -> Result<(), CommandError> {
    let parts: Vec<String> = arg.split_whitespace().map(str::to_ascii_uppercase).collect();
    let parts: Vec<&str> = parts.iter().map(String::as_str).collect();

    let (binary, response) = match parts.as_slice() {
        ["A"] | ["A", "N"] => (false, "200 Type set to A\r\n"),
        ["I"] => (true, "200 Type set to I\r\n"),
        ["L", "8"] => (true, "200 Type set to L (8)\r\n"),
        _ => return Err(CommandError::UnsupportedType(arg.to_string())),
    };

    session.binary = binary;
    debug!("{} -> binary mode {}", session.peer, binary);
    session.reply(response).await
}
