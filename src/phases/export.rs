//! Export sources: copy the requested version's patch files out of the
//! recipe folder so the build never reads the recipe folder directly.

use crate::core::output;
use crate::helpers::fs::ensure_parent_dir;
use crate::pipeline::RecipeContext;
use crate::sources::SourceManifest;
use anyhow::{Context, Result, bail};
use std::path::{Component, Path, PathBuf};

/// Copy every patch registered for the context's version.
///
/// Returns the exported paths, in manifest order.
pub fn export_sources(ctx: &RecipeContext, manifest: &SourceManifest) -> Result<Vec<PathBuf>> {
    let folders = &ctx.folders;
    let mut exported = Vec::new();

    for patch in manifest.patches(ctx.version()) {
        let rel = Path::new(&patch.patch_file);
        if rel.is_absolute() || rel.components().any(|c| matches!(c, Component::ParentDir)) {
            bail!("patch path must stay inside the recipe folder: {}", patch.patch_file);
        }

        let src = folders.recipe.join(rel);
        let dst = folders.export_sources.join(rel);
        ensure_parent_dir(&dst)?;
        std::fs::copy(&src, &dst)
            .with_context(|| format!("cannot export patch {}", src.display()))?;

        output::detail(&format!("exported {}", patch.patch_file));
        exported.push(dst);
    }

    Ok(exported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::version::Version;
    use crate::options::OptionOverrides;
    use crate::settings::{Compiler, CompilerFamily, Os, Settings};
    use tempfile::TempDir;

    fn ctx(base: &Path, recipe: &Path) -> RecipeContext {
        let settings = Settings::new(
            Os::Linux,
            Compiler::new(CompilerFamily::Gcc, Version::parse("11").unwrap()),
        );
        RecipeContext::new(
            Version::parse("0.3.0").unwrap(),
            settings,
            &OptionOverrides::default(),
            base,
        )
        .recipe_dir(recipe)
    }

    #[test]
    fn test_exports_only_requested_version() {
        let temp = TempDir::new().unwrap();
        let recipe = temp.path().join("recipe");
        std::fs::create_dir_all(recipe.join("patches")).unwrap();
        std::fs::write(recipe.join("patches/a.patch"), "a").unwrap();
        std::fs::write(recipe.join("patches/b.patch"), "b").unwrap();

        let manifest = SourceManifest::parse(
            r#"
[[patches."0.3.0"]]
patch_file = "patches/a.patch"

[[patches."0.2.0"]]
patch_file = "patches/b.patch"
"#,
        )
        .unwrap();

        let ctx = ctx(&temp.path().join("out"), &recipe);
        let exported = export_sources(&ctx, &manifest).unwrap();

        assert_eq!(exported, vec![ctx.folders.export_sources.join("patches/a.patch")]);
        assert!(!ctx.folders.export_sources.join("patches/b.patch").exists());
    }

    #[test]
    fn test_missing_patch_file_fails() {
        let temp = TempDir::new().unwrap();
        let manifest = SourceManifest::parse(
            r#"
[[patches."0.3.0"]]
patch_file = "patches/missing.patch"
"#,
        )
        .unwrap();

        let ctx = ctx(&temp.path().join("out"), temp.path());
        assert!(export_sources(&ctx, &manifest).is_err());
    }

    #[test]
    fn test_rejects_escaping_patch_path() {
        let temp = TempDir::new().unwrap();
        let manifest = SourceManifest::parse(
            r#"
[[patches."0.3.0"]]
patch_file = "../outside.patch"
"#,
        )
        .unwrap();

        let ctx = ctx(&temp.path().join("out"), temp.path());
        let err = export_sources(&ctx, &manifest).unwrap_err().to_string();
        assert!(err.contains("inside the recipe folder"));
    }
}
