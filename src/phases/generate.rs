//! Build-tool input generation
//!
//! Writes a CMake toolchain file carrying the cache variables derived from
//! settings and options, plus a dependency file that points CMake at the
//! installed open62541 package.

use crate::pipeline::RecipeContext;
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

pub const TOOLCHAIN_FILE: &str = "recipe_toolchain.cmake";
pub const DEPS_FILE: &str = "recipe_deps.cmake";

/// Value of one CMake cache entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheValue {
    Bool(bool),
    Str(String),
}

impl CacheValue {
    fn render(&self, name: &str) -> String {
        match self {
            CacheValue::Bool(b) => {
                let v = if *b { "ON" } else { "OFF" };
                format!("set({} {} CACHE BOOL \"\" FORCE)", name, v)
            }
            CacheValue::Str(s) => format!("set({} \"{}\" CACHE STRING \"\" FORCE)", name, s),
        }
    }
}

/// Cache entries for the context, in the order they are written.
pub fn cache_variables(ctx: &RecipeContext) -> Vec<(&'static str, CacheValue)> {
    let options = &ctx.options;
    let compiler = &ctx.settings.compiler;

    let mut vars = vec![
        ("UAPP_INTERNAL_OPEN62541", CacheValue::Bool(options.internal_open62541)),
        ("UAPP_BUILD_DOCUMENTATION", CacheValue::Bool(options.build_documentation)),
    ];
    if compiler.is_msvc() {
        vars.push((
            "USE_MSVC_RUNTIME_LIBRARY_DLL",
            CacheValue::Bool(!compiler.is_static_runtime()),
        ));
    }
    vars.push(("CMAKE_POLICY_DEFAULT_CMP0077", CacheValue::Str("NEW".into())));
    vars.push(("BUILD_SHARED_LIBS", CacheValue::Bool(options.shared)));
    if let Some(fpic) = options.fpic {
        vars.push(("CMAKE_POSITION_INDEPENDENT_CODE", CacheValue::Bool(fpic)));
    }
    vars.push((
        "CMAKE_BUILD_TYPE",
        CacheValue::Str(ctx.settings.build_type.as_str().into()),
    ));
    if let Some(cppstd) = compiler.cppstd {
        vars.push(("CMAKE_CXX_STANDARD", CacheValue::Str(cppstd.number())));
        vars.push(("CMAKE_CXX_EXTENSIONS", CacheValue::Bool(cppstd.is_gnu())));
    }

    vars
}

/// Paths written by [`generate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFiles {
    pub toolchain: PathBuf,
    pub deps: PathBuf,
}

/// Write the toolchain and dependency files into the generators folder.
pub fn generate(ctx: &RecipeContext) -> Result<GeneratedFiles> {
    let dir = &ctx.folders.generators;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("cannot create generators folder {}", dir.display()))?;

    let files = GeneratedFiles {
        toolchain: dir.join(TOOLCHAIN_FILE),
        deps: dir.join(DEPS_FILE),
    };
    write(&files.toolchain, &render_toolchain(ctx))?;
    write(&files.deps, &render_deps(ctx))?;

    Ok(files)
}

fn render_toolchain(ctx: &RecipeContext) -> String {
    let mut out = format!("# Toolchain for {}\n", ctx.reference);
    for (name, value) in cache_variables(ctx) {
        out.push_str(&value.render(name));
        out.push('\n');
    }
    let _ = writeln!(out, "include(\"${{CMAKE_CURRENT_LIST_DIR}}/{}\")", DEPS_FILE);
    out
}

fn render_deps(ctx: &RecipeContext) -> String {
    let mut out = format!("# Requires {}\n", ctx.dependency);
    if let Some(ref folder) = ctx.dependency_folder {
        let _ = writeln!(out, "list(PREPEND CMAKE_PREFIX_PATH \"{}\")", cmake_path(folder));
    }
    out
}

fn cmake_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}

fn write(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).with_context(|| format!("cannot write {}", path.display()))
}
