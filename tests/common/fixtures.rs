//! Test fixtures - source trees, archives and profiles.

#![allow(dead_code)]

use open62541pp_recipe::Version;
use open62541pp_recipe::settings::{Compiler, CompilerFamily, CppStd, Os, Runtime, Settings};
use std::path::Path;

/// Profile for the primary Linux scenario.
pub const LINUX_GCC9_PROFILE: &str = r#"
[settings]
os = "Linux"
arch = "x86_64"
build_type = "Release"

[settings.compiler]
name = "gcc"
version = "9"
cppstd = "17"

[options]
shared = "False"
"#;

/// Profile for a shared MSVC build, which is always rejected.
pub const WINDOWS_MSVC_SHARED_PROFILE: &str = r#"
[settings]
os = "Windows"
arch = "x86_64"
compiler = "msvc"
"compiler.version" = "192"
"compiler.runtime" = "dynamic"

[options]
shared = true
"#;

/// A patch that creates `PATCHED` in the source root.
pub const MARKER_PATCH: &str = "\
--- /dev/null
+++ b/PATCHED
@@ -0,0 +1 @@
+patched
";

pub fn linux_gcc9() -> Settings {
    Settings::new(
        Os::Linux,
        Compiler::new(CompilerFamily::Gcc, Version::parse("9").unwrap()).cppstd(CppStd::CPP17),
    )
}

pub fn windows_msvc(version: &str) -> Settings {
    Settings::new(
        Os::Windows,
        Compiler::new(CompilerFamily::Msvc, Version::parse(version).unwrap())
            .runtime(Runtime::Dynamic),
    )
}

/// Write a minimal open62541pp source tree into `dir`.
pub fn write_source_tree(dir: &Path) {
    let files = [
        ("LICENSE", "Mozilla Public License Version 2.0\n"),
        ("CMakeLists.txt", "project(open62541pp CXX)\n"),
        ("include/open62541pp/open62541pp.h", "#pragma once\n"),
        ("include/open62541pp/detail/types.h", "#pragma once\n"),
        ("include/open62541pp/README.md", "headers\n"),
        ("src/Client.cpp", "\n"),
    ];
    for (rel, content) in files {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
}

/// Pack `tree` into a `.tar.gz` at `archive`, under a single top-level `root` directory.
pub fn write_tar_gz(archive: &Path, root: &str, tree: &Path) {
    let file = std::fs::File::create(archive).unwrap();
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.append_dir_all(root, tree).unwrap();
    builder.into_inner().unwrap().finish().unwrap();
}

/// `sources.toml` listing one version at `url`.
pub fn manifest(version: &str, url: &str, sha256: &str) -> String {
    format!(
        "[sources.\"{version}\"]\nurl = '{url}'\nsha256 = '{sha256}'\n",
        version = version,
        url = url,
        sha256 = sha256
    )
}
