//! Packaging
//!
//! Releases from 0.3.0 on ship a working install target, so the driver
//! installs straight into the package folder. Older releases are packaged by
//! hand: public headers from the source tree and static archives from the
//! build output. Shared libraries are never copied on that path.
//!
//! Either way the license is added and build-system helper files are removed.

use crate::core::output;
use crate::core::version::Version;
use crate::driver::BuildDriver;
use crate::helpers::fs::{copy_pattern, rm_pattern, rmdir};
use crate::pipeline::RecipeContext;
use anyhow::Result;
use serde::Serialize;
use std::path::Path;

/// How the package folder was populated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PackagingPath {
    Install,
    ManualCopy,
}

/// Packaging path for `version`.
pub fn packaging_path(version: &Version) -> PackagingPath {
    if *version >= Version::new(0, 3, 0) {
        PackagingPath::Install
    } else {
        PackagingPath::ManualCopy
    }
}

/// Populate the package folder. Any previous package content is discarded.
pub fn package(ctx: &RecipeContext, driver: &mut impl BuildDriver) -> Result<PackagingPath> {
    let folders = &ctx.folders;
    rmdir(&folders.package)?;

    let path = packaging_path(ctx.version());
    match path {
        PackagingPath::Install => driver.install(ctx)?,
        PackagingPath::ManualCopy => {
            let headers = copy_pattern(
                &folders.source.join("include"),
                &folders.package.join("include"),
                "*.h",
                true,
            )?;
            let archives = copy_pattern(
                &folders.build.join("bin"),
                &folders.package.join("lib"),
                "*.a",
                false,
            )?;
            output::detail(&format!(
                "copied {} headers and {} static libraries",
                headers.len(),
                archives.len()
            ));
        }
    }

    copy_license(&folders.source, &folders.package)?;
    cleanup(&folders.package)?;

    Ok(path)
}

fn copy_license(source: &Path, package: &Path) -> Result<()> {
    let copied = copy_pattern(source, &package.join("licenses"), "LICENSE", false)?;
    if copied.is_empty() {
        output::warning(&format!("no LICENSE in {}", source.display()));
    }
    Ok(())
}

/// Remove build-system helper files that must not be shipped.
pub fn cleanup(package: &Path) -> Result<()> {
    let lib = package.join("lib");
    for dir in [lib.join("pkgconfig"), lib.join("cmake"), package.join("share")] {
        rmdir(&dir)?;
    }
    rm_pattern(&lib, "*.la")?;
    rm_pattern(&lib, "*.pdb")?;
    rm_pattern(&package.join("bin"), "*.pdb")?;
    Ok(())
}
