//! Package recipe for open62541pp
//!
//! open62541pp is a C++17 wrapper around the open62541 OPC UA stack. This
//! crate describes how to fetch, configure, build and package it: which
//! compiler and option combinations are valid, which open62541 release it
//! builds against, how the package folder is laid out, and what consumers
//! need to link against it.
//!
//! # Lifecycle
//!
//! A [`Pipeline`] runs the phases in a fixed order over a [`RecipeContext`]:
//!
//! 1. export sources (patch files)
//! 2. option configuration
//! 3. layout
//! 4. requirements
//! 5. validate
//! 6. source
//! 7. generate
//! 8. build
//! 9. package
//! 10. package info
//!
//! Compilation itself is delegated to a [`BuildDriver`]; [`CMake`] is the
//! real one.
//!
//! # Example
//!
//! ```no_run
//! use open62541pp_recipe::{CMake, Pipeline, Profile, RecipeContext, Version};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let profile = Profile::load(Path::new("profiles/linux-gcc.toml"))?;
//! let ctx = RecipeContext::new(
//!     Version::parse("0.3.1")?,
//!     profile.settings()?,
//!     &profile.options,
//!     Path::new("out"),
//! )
//! .recipe_dir("recipe");
//!
//! let outcome = Pipeline::new(ctx, CMake::new()).run()?;
//! println!("{}", outcome.package_folder.display());
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod driver;
pub mod error;
pub mod helpers;
pub mod options;
pub mod phases;
pub mod pipeline;
pub mod profile;
pub mod recipe;
pub mod settings;
pub mod sources;

pub use crate::core::output;
pub use crate::core::version::Version;
pub use driver::{BuildDriver, CMake};
pub use error::ConfigurationError;
pub use options::{OptionOverrides, OptionSet};
pub use phases::package::PackagingPath;
pub use phases::package_info::CppInfo;
pub use pipeline::{PackageOutcome, Pipeline, RecipeContext};
pub use profile::Profile;
pub use recipe::{OPEN62541PP, Reference};
pub use settings::Settings;
