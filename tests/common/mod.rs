//! Common test utilities for pipeline and CLI tests.

#![allow(dead_code)]

mod fixtures;

pub use fixtures::*;

use anyhow::{Result, bail};
use open62541pp_recipe::phases::generate::TOOLCHAIN_FILE;
use open62541pp_recipe::{BuildDriver, RecipeContext};
use std::path::Path;

/// Build driver that records calls and fakes CMake's output.
///
/// `build` drops a static and a shared library into `<build>/bin`;
/// `install` lays out a package the way a real install target would,
/// including the helper files packaging is expected to remove.
#[derive(Debug, Default)]
pub struct FakeDriver {
    pub calls: Vec<&'static str>,
    /// Content of `PATCHED` in the source folder when `configure` ran
    pub patched_at_configure: Option<String>,
    /// Make `build` fail
    pub fail_build: bool,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_build: true,
            ..Self::default()
        }
    }
}

impl BuildDriver for FakeDriver {
    fn configure(&mut self, ctx: &RecipeContext) -> Result<()> {
        self.calls.push("configure");
        if !ctx.folders.generators.join(TOOLCHAIN_FILE).is_file() {
            bail!("toolchain file was not generated before configure");
        }
        self.patched_at_configure = std::fs::read_to_string(ctx.folders.source.join("PATCHED")).ok();
        Ok(())
    }

    fn build(&mut self, ctx: &RecipeContext) -> Result<()> {
        self.calls.push("build");
        if self.fail_build {
            bail!("command failed with exit code Some(2)\n  command: cmake --build");
        }
        let bin = ctx.folders.build.join("bin");
        touch(&bin.join("libopen62541pp.a"));
        touch(&bin.join("libopen62541pp.so"));
        Ok(())
    }

    fn install(&mut self, ctx: &RecipeContext) -> Result<()> {
        self.calls.push("install");
        let pkg = &ctx.folders.package;
        touch(&pkg.join("include/open62541pp/open62541pp.h"));
        touch(&pkg.join("lib/libopen62541pp.a"));
        touch(&pkg.join("lib/libopen62541pp.la"));
        touch(&pkg.join("lib/cmake/open62541pp/open62541ppConfig.cmake"));
        touch(&pkg.join("lib/pkgconfig/open62541pp.pc"));
        touch(&pkg.join("share/doc/open62541pp/README.md"));
        Ok(())
    }
}

/// Create an empty file, with parent directories.
pub fn touch(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, "").unwrap();
}
