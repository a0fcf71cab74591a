// Errors a command handler can end with
use crate::core_fs::FsError;
use crate::core_network::error::DataConnError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error(transparent)]
    Fs(#[from] FsError),

    #[error(transparent)]
    DataConnection(#[from] DataConnError),

    #[error("A passive listener is already waiting for its first transfer")]
    PassivePending,

    #[error("Unsupported transfer type: {0}")]
    UnsupportedType(String),

    #[error("Control connection failed: {0}")]
    Control(#[from] io::Error),

    #[error("Request line has no command verb")]
    MissingVerb,
}

impl CommandError {
    /// Errors that end the session instead of producing a reply.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CommandError::Control(_) | CommandError::MissingVerb)
    }

    pub fn to_ftp_response(&self) -> String {
        match self {
            CommandError::Syntax(_) => {
                "501 Syntax error in parameters or arguments.\r\n".to_string()
            }
            CommandError::Fs(e) => e.to_ftp_response(),
            CommandError::DataConnection(e) => e.to_ftp_response(),
            CommandError::PassivePending => {
                "425 Passive listener already pending, use it first.\r\n".to_string()
            }
            CommandError::UnsupportedType(_) => {
                "504 Command not implemented for that parameter.\r\n".to_string()
            }
            CommandError::Control(_) | CommandError::MissingVerb => {
                "421 Service not available, closing control connection.\r\n".to_string()
            }
        }
    }
}
