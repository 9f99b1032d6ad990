//! File System Module
//!
//! Lexical path normalization and the in-memory virtual file system
//! that every shell command and sandboxed script operates on.

pub mod path;
pub mod types;
pub mod virtual_fs;

pub use path::normalize;
pub use types::*;
pub use virtual_fs::{VirtualFs, SEED_HELLO, SEED_SCRIPT};
