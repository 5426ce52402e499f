//! Source acquisition
//!
//! Downloads the archive listed for the requested version, verifies its
//! checksum and extracts it into the source folder with the top-level
//! directory stripped. A local source tree can stand in for the download.

use crate::core::output;
use crate::helpers::extract::{self, ArchiveFormat};
use crate::helpers::{download, fs};
use crate::pipeline::RecipeContext;
use crate::sources::{MANIFEST_FILE, SourceManifest};
use anyhow::{Context, Result, bail};
use std::path::Path;

/// Populate the source folder.
///
/// Any previous content of the source folder is discarded first.
pub fn source(ctx: &RecipeContext, manifest: &SourceManifest) -> Result<()> {
    let dest = &ctx.folders.source;
    fs::rmdir(dest)?;

    if let Some(ref local) = ctx.source_dir {
        return copy_local(ctx, local);
    }

    let entry = manifest.source(ctx.version()).with_context(|| {
        format!(
            "cannot locate sources: no usable {} in {}",
            MANIFEST_FILE,
            ctx.folders.recipe.display()
        )
    })?;
    let format = ArchiveFormat::detect(&entry.url)
        .with_context(|| format!("unsupported archive type: {}", entry.url))?;

    let archive = download::fetch(&entry.url, &entry.sha256, &ctx.cache_dir)
        .with_context(|| format!("cannot fetch sources of {}", ctx.reference))?;
    extract::extract(&archive, dest, format, true)
}

/// Copy a local checkout, leaving out the output folder when it lives inside.
fn copy_local(ctx: &RecipeContext, local: &Path) -> Result<()> {
    if !local.is_dir() {
        bail!("source directory does not exist: {}", local.display());
    }
    std::fs::create_dir_all(ctx.base())
        .with_context(|| format!("cannot create {}", ctx.base().display()))?;

    let local = local
        .canonicalize()
        .with_context(|| format!("cannot resolve {}", local.display()))?;
    let base = ctx
        .base()
        .canonicalize()
        .with_context(|| format!("cannot resolve {}", ctx.base().display()))?;
    if local.starts_with(&base) {
        bail!(
            "source directory {} is inside the output folder {}",
            local.display(),
            base.display()
        );
    }

    let copied = fs::copy_tree_except(&local, &ctx.folders.source, &base)?;
    output::detail(&format!("copied {} files from {}", copied.len(), local.display()));
    Ok(())
}
