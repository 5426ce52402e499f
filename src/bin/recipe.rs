//! Recipe CLI - build and inspect the open62541pp package
//!
//! Usage:
//!   recipe create --version <v> [--profile <file>] [-s k=v] [-o k=v]
//!   recipe validate --version <v> ...    Check a configuration
//!   recipe requirements --version <v>    Show the open62541 pin
//!   recipe options --version <v> ...     Show effective options
//!   recipe info --version <v> ...        Print consumer metadata as JSON
//!   recipe inspect                       Show package identity

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use open62541pp_recipe::phases::requirements::{self, OPEN62541};
use open62541pp_recipe::{
    CMake, OPEN62541PP, OptionSet, Pipeline, Profile, RecipeContext, Version, output,
};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "recipe")]
#[command(about = "Build and package open62541pp")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Target configuration shared by most subcommands
#[derive(Args)]
struct ConfigArgs {
    /// open62541pp version to evaluate
    #[arg(long = "version", env = "RECIPE_VERSION")]
    version: Version,

    /// Profile file (TOML) with settings and options
    #[arg(long, env = "RECIPE_PROFILE")]
    profile: Option<PathBuf>,

    /// Setting override, e.g. -s compiler.version=11
    #[arg(short = 's', long = "setting", value_name = "KEY=VALUE")]
    settings: Vec<String>,

    /// Option override, e.g. -o shared=True
    #[arg(short = 'o', long = "option", value_name = "NAME=VALUE")]
    options: Vec<String>,
}

impl ConfigArgs {
    fn profile(&self) -> Result<Profile> {
        let mut profile = match self.profile {
            Some(ref path) => Profile::load(path)?,
            None => Profile::default(),
        };
        for assignment in &self.settings {
            profile.set_setting(assignment)?;
        }
        for assignment in &self.options {
            profile.set_option(assignment)?;
        }
        Ok(profile)
    }

    /// Context rooted at `base`.
    fn context(&self, base: &Path) -> Result<RecipeContext> {
        let profile = self.profile()?;
        Ok(RecipeContext::new(
            self.version.clone(),
            profile.settings()?,
            &profile.options,
            base,
        ))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run every phase and produce the package
    Create {
        #[command(flatten)]
        config: ConfigArgs,

        /// Folder holding sources.toml and patches
        #[arg(long, default_value = ".")]
        recipe_dir: PathBuf,

        /// Folder receiving sources, build tree and package
        #[arg(long, default_value = "build-open62541pp")]
        output_dir: PathBuf,

        /// Use a local source tree instead of downloading
        #[arg(long)]
        source_dir: Option<PathBuf>,

        /// Installed dependency package, e.g. --dep open62541=/opt/open62541
        #[arg(long = "dep", value_name = "NAME=PATH")]
        deps: Vec<String>,

        /// Archive download cache
        #[arg(long, env = "RECIPE_CACHE")]
        cache_dir: Option<PathBuf>,

        /// Parallel build jobs (defaults to the number of CPUs)
        #[arg(short = 'j', long)]
        jobs: Option<usize>,

        /// Print external commands instead of running them
        #[arg(long)]
        dry_run: bool,
    },

    /// Configure options and validate the configuration
    Validate {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Show the pinned open62541 requirement
    Requirements {
        /// open62541pp version to evaluate
        #[arg(long = "version")]
        version: Version,
    },

    /// Show the effective option set
    Options {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Print consumer metadata as JSON
    Info {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Show package identity
    Inspect,
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        output::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Create {
            config,
            recipe_dir,
            output_dir,
            source_dir,
            deps,
            cache_dir,
            jobs,
            dry_run,
        } => {
            let mut ctx = config
                .context(&output_dir)?
                .recipe_dir(recipe_dir)
                .dry_run(dry_run);
            if let Some(dir) = source_dir {
                ctx = ctx.source_dir(dir);
            }
            if let Some(dir) = cache_dir {
                ctx = ctx.cache_dir(dir);
            }
            if let Some(dir) = dependency_folder(&deps)? {
                ctx = ctx.dependency_folder(dir);
            }

            let mut cmake = CMake::new();
            if let Some(jobs) = jobs {
                cmake = cmake.jobs(jobs);
            }

            let outcome = Pipeline::new(ctx, cmake).run()?;
            output::field("requires", &outcome.dependency.to_string());
            output::field("package", &outcome.package_folder.display().to_string());
        }

        Commands::Validate { config } => {
            let ctx = config.context(Path::new("."))?;
            output::action(&format!("Validating {}", ctx.reference));
            print_options(&ctx.options);
            ctx.validate()?;
            output::success(&format!("{} is valid for this configuration", ctx.reference));
        }

        Commands::Requirements { version } => {
            println!("{}", requirements::requirements(&version));
        }

        Commands::Options { config } => {
            let ctx = config.context(Path::new("."))?;
            print_options(&ctx.options);
        }

        Commands::Info { config } => {
            let ctx = config.context(Path::new("."))?;
            let json = serde_json::to_string_pretty(&ctx.package_info())
                .context("cannot serialize package info")?;
            println!("{}", json);
        }

        Commands::Inspect => {
            let id = OPEN62541PP;
            println!("{}", id.name.bold());
            output::field("description", id.description);
            output::field("license", id.license);
            output::field("url", id.url);
            output::field("homepage", id.homepage);
            output::field("topics", &id.topics.join(", "));
            output::field("package_type", id.package_type);
        }
    }

    Ok(())
}

fn print_options(options: &OptionSet) {
    for (name, value) in options.entries() {
        println!("{}={}", name, if value { "True" } else { "False" });
    }
}

/// Parse `--dep NAME=PATH` flags; only open62541 is a dependency.
fn dependency_folder(deps: &[String]) -> Result<Option<PathBuf>> {
    let mut folder = None;
    for dep in deps {
        let Some((name, path)) = dep.split_once('=') else {
            bail!("Expected NAME=PATH for --dep, got '{}'", dep);
        };
        if name != OPEN62541 {
            bail!("Unknown dependency '{}': only {} is required", name, OPEN62541);
        }
        folder = Some(PathBuf::from(path));
    }
    Ok(folder)
}
