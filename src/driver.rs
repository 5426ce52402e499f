//! Build driver
//!
//! The recipe never compiles anything itself; configuration, compilation
//! and installation are delegated to a [`BuildDriver`]. [`CMake`] is the real
//! driver. Failures propagate unchanged and are never retried.

use crate::helpers::cmd::ToolCmd;
use crate::phases::generate::TOOLCHAIN_FILE;
use crate::pipeline::RecipeContext;
use anyhow::{Context, Result};

/// External build system used by the build and package phases
pub trait BuildDriver {
    /// Configure the build tree from the source folder.
    fn configure(&mut self, ctx: &RecipeContext) -> Result<()>;

    /// Compile the configured build tree.
    fn build(&mut self, ctx: &RecipeContext) -> Result<()>;

    /// Install headers and libraries into the package folder.
    fn install(&mut self, ctx: &RecipeContext) -> Result<()>;
}

impl<D: BuildDriver + ?Sized> BuildDriver for &mut D {
    fn configure(&mut self, ctx: &RecipeContext) -> Result<()> {
        (**self).configure(ctx)
    }

    fn build(&mut self, ctx: &RecipeContext) -> Result<()> {
        (**self).build(ctx)
    }

    fn install(&mut self, ctx: &RecipeContext) -> Result<()> {
        (**self).install(ctx)
    }
}

/// Drives the `cmake` command-line tool
#[derive(Debug, Clone)]
pub struct CMake {
    program: String,
    jobs: usize,
    dry_run: bool,
}

impl Default for CMake {
    fn default() -> Self {
        Self {
            program: std::env::var("CMAKE").unwrap_or_else(|_| "cmake".to_string()),
            jobs: num_cpus::get(),
            dry_run: false,
        }
    }
}

impl CMake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific cmake executable.
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Number of parallel build jobs.
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Print commands without running them, whatever the context says.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn is_dry_run(&self, ctx: &RecipeContext) -> bool {
        self.dry_run || ctx.dry_run
    }

    fn cmd(&self, ctx: &RecipeContext) -> ToolCmd {
        ToolCmd::new(&self.program).dry_run(self.is_dry_run(ctx))
    }

    /// `cmake -S <src> -B <build> -DCMAKE_TOOLCHAIN_FILE=...`
    pub fn configure_cmd(&self, ctx: &RecipeContext) -> ToolCmd {
        let folders = &ctx.folders;
        let toolchain = folders.generators.join(TOOLCHAIN_FILE);

        self.cmd(ctx)
            .arg("-S")
            .arg(&folders.source)
            .arg("-B")
            .arg(&folders.build)
            .arg(format!("-DCMAKE_TOOLCHAIN_FILE={}", toolchain.display()))
            .arg(format!("-DCMAKE_INSTALL_PREFIX={}", folders.package.display()))
    }

    /// `cmake --build <build> --config <type> --parallel <jobs>`
    pub fn build_cmd(&self, ctx: &RecipeContext) -> ToolCmd {
        self.cmd(ctx)
            .arg("--build")
            .arg(&ctx.folders.build)
            .args(["--config", ctx.settings.build_type.as_str()])
            .arg("--parallel")
            .arg(self.jobs.to_string())
    }

    /// `cmake --install <build> --config <type> --prefix <package>`
    pub fn install_cmd(&self, ctx: &RecipeContext) -> ToolCmd {
        self.cmd(ctx)
            .arg("--install")
            .arg(&ctx.folders.build)
            .args(["--config", ctx.settings.build_type.as_str()])
            .arg("--prefix")
            .arg(&ctx.folders.package)
    }
}

impl BuildDriver for CMake {
    fn configure(&mut self, ctx: &RecipeContext) -> Result<()> {
        if !self.is_dry_run(ctx) {
            std::fs::create_dir_all(&ctx.folders.build).with_context(|| {
                format!("cannot create build folder {}", ctx.folders.build.display())
            })?;
        }
        self.configure_cmd(ctx).run().context("cmake configure failed")
    }

    fn build(&mut self, ctx: &RecipeContext) -> Result<()> {
        self.build_cmd(ctx).run().context("cmake build failed")
    }

    fn install(&mut self, ctx: &RecipeContext) -> Result<()> {
        self.install_cmd(ctx).run().context("cmake install failed")
    }
}
