pub mod config;
pub mod constants;
pub mod core_cli;
pub mod core_fs;
pub mod core_ftpcommand;
pub mod core_log;
pub mod core_network;
pub mod helpers;
pub mod server;
pub mod session;

pub use config::Config;
