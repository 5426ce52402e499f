//! Folder layout
//!
//! Every folder a build touches, derived from one base output folder. The
//! layout follows the usual CMake convention: sources under `src`, a
//! per-build-type build folder for single-config generators, and a single
//! `build` folder for multi-config generators (Visual Studio).

use crate::settings::Settings;
use std::path::{Path, PathBuf};

/// Folders used by one evaluation of the recipe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folders {
    /// Holds `sources.toml` and the patch files it references
    pub recipe: PathBuf,
    /// Patch files copied from the recipe folder
    pub export_sources: PathBuf,
    /// Extracted upstream sources
    pub source: PathBuf,
    pub build: PathBuf,
    /// Toolchain and dependency files for the build tool
    pub generators: PathBuf,
    /// Final package layout
    pub package: PathBuf,
}

impl Folders {
    /// CMake layout under `base` for `settings`.
    pub fn cmake_layout(base: &Path, recipe: &Path, settings: &Settings) -> Self {
        let build = if is_multi_config(settings) {
            base.join("build")
        } else {
            base.join("build").join(settings.build_type.as_str())
        };

        Self {
            recipe: recipe.to_path_buf(),
            export_sources: base.join("export_source"),
            source: base.join("src"),
            generators: build.join("generators"),
            build,
            package: base.join("package"),
        }
    }
}

/// MSVC builds use the multi-config Visual Studio generator.
pub fn is_multi_config(settings: &Settings) -> bool {
    settings.compiler.is_msvc()
}
