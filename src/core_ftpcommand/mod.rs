// Here's the list of the FTP commands implemented
pub mod cwd;
pub mod feat;
pub mod list;
pub mod noop;
pub mod pwd;
pub mod quit;
pub mod retr;
pub mod stor;
pub mod syst;
pub mod type_;
pub mod user;

// Parsing, dispatch and the shared transfer machinery
pub mod error;
pub mod ftpcommand;
pub mod handlers;
pub mod transfer;
