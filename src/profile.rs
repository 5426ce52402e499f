//! Build profiles
//!
//! A profile is a TOML file describing the target configuration:
//!
//! ```toml
//! [settings]
//! os = "Linux"
//! arch = "x86_64"
//! build_type = "Release"
//!
//! [settings.compiler]
//! name = "gcc"
//! version = "11"
//! cppstd = "17"
//!
//! [options]
//! shared = "False"
//! fPIC = true
//! ```
//!
//! The compiler may also be written flat, with the same keys as `-s`
//! overrides: `compiler = "gcc"` plus `"compiler.version" = "11"`.
//!
//! Unset `os` and `arch` fall back to the host; `build_type` falls back to
//! Release. The compiler and its version are required.

use crate::core::version::Version;
use crate::options::OptionOverrides;
use crate::settings::{
    BuildType, Compiler, CompilerFamily, CppStd, Os, Runtime, Settings, host_arch,
};
use anyhow::{Context, Result, bail};
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::Path;

/// Settings as written in a profile, every key optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(try_from = "RawSettings")]
pub struct ProfileSettings {
    pub os: Option<Os>,
    pub arch: Option<String>,
    pub build_type: Option<BuildType>,
    pub compiler: Option<CompilerFamily>,
    #[serde(rename = "compiler.version")]
    pub compiler_version: Option<Version>,
    #[serde(rename = "compiler.cppstd")]
    pub compiler_cppstd: Option<CppStd>,
    #[serde(rename = "compiler.runtime")]
    pub compiler_runtime: Option<Runtime>,
}

/// `[settings.compiler]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CompilerTable {
    name: Option<CompilerFamily>,
    version: Option<Version>,
    cppstd: Option<CppStd>,
    runtime: Option<Runtime>,
}

/// `compiler = "gcc"` or a `[settings.compiler]` table
#[derive(Debug, Clone)]
enum CompilerEntry {
    Name(CompilerFamily),
    Table(CompilerTable),
}

impl<'de> Deserialize<'de> for CompilerEntry {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntryVisitor;

        impl<'de> Visitor<'de> for EntryVisitor {
            type Value = CompilerEntry;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a compiler name or a compiler table")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<Self::Value, E> {
                value.parse().map(CompilerEntry::Name).map_err(E::custom)
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> std::result::Result<Self::Value, A::Error> {
                CompilerTable::deserialize(de::value::MapAccessDeserializer::new(map))
                    .map(CompilerEntry::Table)
            }
        }

        deserializer.deserialize_any(EntryVisitor)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSettings {
    os: Option<Os>,
    arch: Option<String>,
    build_type: Option<BuildType>,
    compiler: Option<CompilerEntry>,
    #[serde(rename = "compiler.version")]
    compiler_version: Option<Version>,
    #[serde(rename = "compiler.cppstd")]
    compiler_cppstd: Option<CppStd>,
    #[serde(rename = "compiler.runtime")]
    compiler_runtime: Option<Runtime>,
}

impl TryFrom<RawSettings> for ProfileSettings {
    type Error = String;

    fn try_from(raw: RawSettings) -> std::result::Result<Self, Self::Error> {
        let mut settings = ProfileSettings {
            os: raw.os,
            arch: raw.arch,
            build_type: raw.build_type,
            compiler: None,
            compiler_version: raw.compiler_version,
            compiler_cppstd: raw.compiler_cppstd,
            compiler_runtime: raw.compiler_runtime,
        };

        match raw.compiler {
            None => {}
            Some(CompilerEntry::Name(family)) => settings.compiler = Some(family),
            Some(CompilerEntry::Table(table)) => {
                settings.compiler = table.name;
                merge_key(&mut settings.compiler_version, table.version, "version")?;
                merge_key(&mut settings.compiler_cppstd, table.cppstd, "cppstd")?;
                merge_key(&mut settings.compiler_runtime, table.runtime, "runtime")?;
            }
        }
        Ok(settings)
    }
}

fn merge_key<T>(
    flat: &mut Option<T>,
    table: Option<T>,
    key: &str,
) -> std::result::Result<(), String> {
    if table.is_some() {
        if flat.is_some() {
            return Err(format!(
                "compiler.{} is set both as a key and in [settings.compiler]",
                key
            ));
        }
        *flat = table;
    }
    Ok(())
}

/// A parsed profile
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    #[serde(default)]
    pub settings: ProfileSettings,
    #[serde(default)]
    pub options: OptionOverrides,
}

impl Profile {
    /// Load a profile from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid profile: {}", path.display()))
    }

    /// Parse a profile from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply a `key=value` setting override (`-s compiler.version=11`).
    pub fn set_setting(&mut self, assignment: &str) -> Result<()> {
        let (key, value) = split_assignment(assignment)?;
        let s = &mut self.settings;
        match key {
            "os" => s.os = Some(value.parse()?),
            "arch" => s.arch = Some(value.to_string()),
            "build_type" => s.build_type = Some(value.parse()?),
            "compiler" => s.compiler = Some(value.parse()?),
            "compiler.version" => s.compiler_version = Some(Version::parse(value)?),
            "compiler.cppstd" => s.compiler_cppstd = Some(value.parse()?),
            "compiler.runtime" => s.compiler_runtime = Some(value.parse()?),
            other => bail!("Unknown setting '{}'", other),
        }
        Ok(())
    }

    /// Apply a `name=value` option override (`-o shared=True`).
    pub fn set_option(&mut self, assignment: &str) -> Result<()> {
        let (name, value) = split_assignment(assignment)?;
        self.options.set(name, value)
    }

    /// Resolve complete settings, filling host defaults.
    pub fn settings(&self) -> Result<Settings> {
        let s = &self.settings;

        let os = match s.os {
            Some(os) => os,
            None => Os::host().context("Cannot detect host OS; set it with -s os=<os>")?,
        };

        let family = s
            .compiler
            .context("Missing setting 'compiler' (for example -s compiler=gcc)")?;
        let version = s.compiler_version.clone().with_context(|| {
            format!(
                "Missing setting 'compiler.version' for compiler {} (for example -s compiler.version=11)",
                family
            )
        })?;

        let mut compiler = Compiler::new(family, version);
        compiler.cppstd = s.compiler_cppstd;
        compiler.runtime = s.compiler_runtime;

        Ok(Settings {
            os,
            arch: s.arch.clone().unwrap_or_else(host_arch),
            build_type: s.build_type.unwrap_or_default(),
            compiler,
        })
    }
}

fn split_assignment(assignment: &str) -> Result<(&str, &str)> {
    match assignment.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() && !value.trim().is_empty() => {
            Ok((key.trim(), value.trim()))
        }
        _ => bail!("Expected key=value, got '{}'", assignment),
    }
}
