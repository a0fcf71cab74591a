use crate::core_ftpcommand::error::CommandError;
use crate::core_ftpcommand::ftpcommand::{CommandLine, FtpCommand};
use crate::core_ftpcommand::{cwd, feat, list, noop, pwd, quit, retr, stor, syst, type_, user};
use crate::core_network::{pasv, port};
use crate::session::Session;
use log::{debug, warn};

/// Runs the handler for `line`.
pub async fn dispatch_command(session: &mut Session, line: &CommandLine) -> Result<(), CommandError> {
    let arg = line.arg.as_str();
    match &line.command {
        FtpCommand::USER => user::handle_user_command(session, arg).await,
        FtpCommand::QUIT => quit::handle_quit_command(session).await,
        FtpCommand::SYST => syst::handle_syst_command(session).await,
        FtpCommand::PORT => port::handle_port_command(session, arg).await,
        FtpCommand::PASV => pasv::handle_pasv_command(session).await,
        FtpCommand::LIST => list::handle_list_command(session, arg).await,
        FtpCommand::RETR => retr::handle_retr_command(session, arg).await,
        FtpCommand::STOR => stor::handle_stor_command(session, arg).await,
        FtpCommand::FEAT => feat::handle_feat_command(session).await,
        FtpCommand::PWD => pwd::handle_pwd_command(session).await,
        FtpCommand::CWD => cwd::handle_cwd_command(session, arg).await,
        FtpCommand::TYPE => type_::handle_type_command(session, arg).await,
        FtpCommand::NOOP => noop::handle_noop_command(session).await,
        FtpCommand::Unknown(verb) => {
            debug!("{} -> unknown command {}", session.peer, verb);
            session.reply("502 Command not implemented.\r\n").await
        }
    }
}

/// Runs one command and answers its failure on the control connection.
///
/// Only fatal errors come back out; they end the session.
pub async fn execute_command(session: &mut Session, line: &CommandLine) -> Result<(), CommandError> {
    match dispatch_command(session, line).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            warn!("{} -> {} failed: {}", session.peer, line.verb, e);
            session.reply(&e.to_ftp_response()).await
        }
    }
}
