//! Core infrastructure shared by every lifecycle phase

pub mod output;
pub mod version;
