// Storage backend: sandboxed path resolution and file byte I/O
pub mod error;
pub mod sandbox;
pub mod storage;

pub use error::FsError;
pub use sandbox::{ResolvedPath, Sandbox};
