// Errors raised by the sandboxed storage backend
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FsError {
    #[error("invalid path")]
    InvalidPath,

    #[error("Can't access the file or directory {path:?}: {source}")]
    CantAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Transfer aborted: {0}")]
    Transfer(#[source] io::Error),
}

impl FsError {
    pub fn cant_access(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FsError::CantAccess {
            path: path.into(),
            source,
        }
    }

    pub fn to_ftp_response(&self) -> String {
        match self {
            FsError::InvalidPath => "550 Invalid path.\r\n".to_string(),
            FsError::CantAccess { .. } => {
                "550 Can't access the file or directory.\r\n".to_string()
            }
            FsError::Transfer(_) => "552 Requested file action aborted.\r\n".to_string(),
        }
    }
}
