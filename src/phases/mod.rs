//! Lifecycle phases
//!
//! One module per phase, in execution order:
//! `export` → `layout` → `requirements` → `validate` → `source` →
//! `generate` → `build` → `package` → `package_info`.
//!
//! Option configuration lives in [`crate::options`].

pub mod build;
pub mod export;
pub mod generate;
pub mod layout;
pub mod package;
pub mod package_info;
pub mod requirements;
pub mod source;
pub mod validate;
