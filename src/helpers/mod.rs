//! Helpers used by the lifecycle phases
//!
//! - **download**: fetch and cache source archives
//! - **hash**: SHA-256 verification
//! - **extract**: native archive extraction
//! - **fs**: pattern copy/removal for packaging
//! - **cmd**: external tool execution

pub mod cmd;
pub mod download;
pub mod extract;
pub mod fs;
pub mod hash;
