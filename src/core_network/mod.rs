pub mod data_conn;
pub mod error;
pub mod network;
pub mod pasv;
pub mod port;
pub mod port_pool;
