//! Build phase: apply the version's patches to the source tree, then
//! configure and compile through the build driver.

use crate::core::output;
use crate::driver::BuildDriver;
use crate::helpers::cmd::ToolCmd;
use crate::pipeline::RecipeContext;
use crate::sources::{PatchEntry, SourceManifest};
use anyhow::{Context, Result};

/// Apply patches, configure, build. Driver errors propagate unchanged.
pub fn build(
    ctx: &RecipeContext,
    manifest: &SourceManifest,
    driver: &mut impl BuildDriver,
) -> Result<()> {
    apply_patches(ctx, manifest.patches(ctx.version()))?;

    driver.configure(ctx)?;
    driver.build(ctx)
}

/// Apply `patches` in order with `patch -pN`.
pub fn apply_patches(ctx: &RecipeContext, patches: &[PatchEntry]) -> Result<()> {
    for patch in patches {
        patch_cmd(ctx, patch)
            .run()
            .with_context(|| format!("failed to apply patch {}", patch.patch_file))?;

        match patch.patch_description {
            Some(ref description) => {
                output::detail(&format!("applied {} ({})", patch.patch_file, description))
            }
            None => output::detail(&format!("applied {}", patch.patch_file)),
        }
    }
    Ok(())
}

fn patch_cmd(ctx: &RecipeContext, patch: &PatchEntry) -> ToolCmd {
    let folders = &ctx.folders;
    let target = match patch.base_path {
        Some(ref base) => folders.source.join(base),
        None => folders.source.clone(),
    };

    ToolCmd::new("patch")
        .arg(format!("-p{}", patch.strip))
        .arg("--forward")
        .arg("--batch")
        .arg("-i")
        .arg(folders.export_sources.join(&patch.patch_file))
        .dir(target)
        .dry_run(ctx.dry_run)
}
