//! Recipe pipeline
//!
//! A [`RecipeContext`] carries everything one evaluation needs: the
//! reference being built, typed settings, the effective options, the folder
//! layout and the dependency pin. [`Pipeline`] runs the lifecycle phases over
//! it in their fixed order:
//!
//! 1. export sources
//! 2. option configuration (resolved when the context is created)
//! 3. layout (computed when the context is created)
//! 4. requirements
//! 5. validate
//! 6. source
//! 7. generate
//! 8. build
//! 9. package
//! 10. package info
//!
//! Validation always runs before any phase that touches the source, build or
//! package folders.

use crate::core::output;
use crate::core::version::Version;
use crate::driver::BuildDriver;
use crate::error::ConfigurationError;
use crate::helpers::download;
use crate::options::{OptionOverrides, OptionSet};
use crate::phases::layout::Folders;
use crate::phases::package::PackagingPath;
use crate::phases::package_info::CppInfo;
use crate::phases::{build, export, generate, package, package_info, requirements, source, validate};
use crate::recipe::Reference;
use crate::settings::Settings;
use crate::sources::{MANIFEST_FILE, SourceManifest};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Consumer metadata written next to the package folder
pub const PACKAGE_INFO_FILE: &str = "package_info.json";

/// State shared by every phase of one evaluation
#[derive(Debug, Clone)]
pub struct RecipeContext {
    pub reference: Reference,
    pub settings: Settings,
    pub options: OptionSet,
    pub folders: Folders,
    /// The pinned open62541 requirement
    pub dependency: Reference,
    /// Installed open62541 package, added to the CMake prefix path
    pub dependency_folder: Option<PathBuf>,
    /// Local source tree used instead of downloading
    pub source_dir: Option<PathBuf>,
    pub cache_dir: PathBuf,
    pub dry_run: bool,
    base: PathBuf,
}

impl RecipeContext {
    /// Resolve options and lay out folders under `base` for `version`.
    ///
    /// The recipe folder defaults to `base`.
    pub fn new(
        version: Version,
        settings: Settings,
        overrides: &OptionOverrides,
        base: &Path,
    ) -> Self {
        let options = OptionSet::resolve(settings.os, overrides);
        let folders = Folders::cmake_layout(base, base, &settings);
        let dependency = requirements::requirements(&version);

        Self {
            reference: Reference::open62541pp(version),
            settings,
            options,
            folders,
            dependency,
            dependency_folder: None,
            source_dir: None,
            cache_dir: download::default_cache_dir(),
            dry_run: false,
            base: base.to_path_buf(),
        }
    }

    /// Folder holding `sources.toml` and patches.
    pub fn recipe_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.folders.recipe = dir.into();
        self
    }

    /// Use a local source tree instead of downloading.
    pub fn source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = Some(dir.into());
        self
    }

    /// Installed open62541 package to build against.
    pub fn dependency_folder(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dependency_folder = Some(dir.into());
        self
    }

    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Print external commands instead of running them.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn version(&self) -> &Version {
        &self.reference.version
    }

    /// Output folder everything else is laid out under.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Check settings and options against the compiler requirements.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        validate::validate(&self.reference, &self.settings, &self.options)
    }

    /// Consumer metadata for this configuration.
    pub fn package_info(&self) -> CppInfo {
        package_info::package_info(&self.settings)
    }

    /// The source manifest, or an empty one when the recipe folder has none.
    pub fn load_manifest(&self) -> Result<SourceManifest> {
        if !self.folders.recipe.join(MANIFEST_FILE).exists() {
            return Ok(SourceManifest::default());
        }
        SourceManifest::load(&self.folders.recipe)
    }
}

/// Result of a complete pipeline run
#[derive(Debug, Clone)]
pub struct PackageOutcome {
    pub reference: Reference,
    pub dependency: Reference,
    pub packaging: PackagingPath,
    pub package_folder: PathBuf,
    pub cpp_info: CppInfo,
}

/// Runs every lifecycle phase against one context and build driver
pub struct Pipeline<D: BuildDriver> {
    ctx: RecipeContext,
    driver: D,
}

impl<D: BuildDriver> Pipeline<D> {
    pub fn new(ctx: RecipeContext, driver: D) -> Self {
        Self { ctx, driver }
    }

    pub fn context(&self) -> &RecipeContext {
        &self.ctx
    }

    /// Run all phases in order, stopping at the first failure.
    pub fn run(&mut self) -> Result<PackageOutcome> {
        let ctx = &self.ctx;
        output::action(&format!("Creating {}", ctx.reference));

        // Manifest and export errors are reported after validation so an
        // invalid configuration is always the error seen.
        output::sub_action("export_sources");
        let exported = ctx
            .load_manifest()
            .and_then(|manifest| export::export_sources(ctx, &manifest).map(|_| manifest));

        output::sub_action("configure");
        for (name, value) in ctx.options.entries() {
            output::field(name, if value { "True" } else { "False" });
        }

        output::sub_action("layout");
        output::field("source", &ctx.folders.source.display().to_string());
        output::field("build", &ctx.folders.build.display().to_string());
        output::field("package", &ctx.folders.package.display().to_string());

        output::sub_action("requirements");
        output::field("requires", &ctx.dependency.to_string());

        output::sub_action("validate");
        ctx.validate()?;
        let manifest = exported?;

        output::sub_action("source");
        source::source(ctx, &manifest)?;

        output::sub_action("generate");
        generate::generate(ctx)?;

        output::sub_action("build");
        build::build(ctx, &manifest, &mut self.driver)?;

        output::sub_action("package");
        let packaging = package::package(ctx, &mut self.driver)?;

        output::sub_action("package_info");
        let cpp_info = ctx.package_info();
        let info_path = ctx.base.join(PACKAGE_INFO_FILE);
        let json = serde_json::to_string_pretty(&cpp_info)?;
        std::fs::write(&info_path, json)
            .with_context(|| format!("cannot write {}", info_path.display()))?;

        output::success(&format!(
            "{} packaged in {}",
            ctx.reference,
            ctx.folders.package.display()
        ));

        Ok(PackageOutcome {
            reference: ctx.reference.clone(),
            dependency: ctx.dependency.clone(),
            packaging,
            package_folder: ctx.folders.package.clone(),
            cpp_info,
        })
    }
}
