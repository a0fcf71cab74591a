// src/constants.rs

pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_LISTEN_PORT: u16 = 4000;

pub const DEFAULT_PASV_PORT_START: u16 = 12040;
pub const DEFAULT_PASV_PORT_COUNT: u16 = 50;

pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Environment variable consulted for the sandbox root when neither the CLI
/// nor the config file sets one.
pub const ROOT_ENV_VAR: &str = "FTP_PREFIX";
/// Fallback sandbox root, relative to `$HOME`.
pub const DEFAULT_ROOT_SUBDIR: &str = ".local/share/minftpd";

/// Longest request line accepted on the control connection, CRLF included.
pub const MAX_COMMAND_LINE: u64 = 4096;
