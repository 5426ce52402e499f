//! Typed build settings
//!
//! The target platform and toolchain a package is built for: operating
//! system, architecture, build type and compiler. Every value parses from the
//! same spelling used in profiles and `-s key=value` flags.

use crate::core::version::Version;
use anyhow::{Result, bail};
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Target operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Os {
    Windows,
    Linux,
    Macos,
    FreeBSD,
    Android,
    #[serde(rename = "iOS")]
    Ios,
}

impl Os {
    /// The operating system this binary runs on, if it is a known target.
    pub fn host() -> Option<Self> {
        match std::env::consts::OS {
            "windows" => Some(Self::Windows),
            "linux" => Some(Self::Linux),
            "macos" => Some(Self::Macos),
            "freebsd" => Some(Self::FreeBSD),
            "android" => Some(Self::Android),
            "ios" => Some(Self::Ios),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "Windows",
            Self::Linux => "Linux",
            Self::Macos => "Macos",
            Self::FreeBSD => "FreeBSD",
            Self::Android => "Android",
            Self::Ios => "iOS",
        }
    }
}

impl FromStr for Os {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "Windows" => Self::Windows,
            "Linux" => Self::Linux,
            "Macos" => Self::Macos,
            "FreeBSD" => Self::FreeBSD,
            "Android" => Self::Android,
            "iOS" => Self::Ios,
            other => bail!(
                "Invalid setting os={}: expected one of Windows, Linux, Macos, FreeBSD, Android, iOS",
                other
            ),
        })
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Architecture name of the host, spelled the way profiles spell it.
pub fn host_arch() -> String {
    match std::env::consts::ARCH {
        "aarch64" => "armv8".to_string(),
        "arm" => "armv7".to_string(),
        other => other.to_string(),
    }
}

/// CMake build type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BuildType {
    Debug,
    #[default]
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::Release => "Release",
            Self::RelWithDebInfo => "RelWithDebInfo",
            Self::MinSizeRel => "MinSizeRel",
        }
    }
}

impl FromStr for BuildType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "Debug" => Self::Debug,
            "Release" => Self::Release,
            "RelWithDebInfo" => Self::RelWithDebInfo,
            "MinSizeRel" => Self::MinSizeRel,
            other => bail!(
                "Invalid setting build_type={}: expected Debug, Release, RelWithDebInfo or MinSizeRel",
                other
            ),
        })
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiler family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompilerFamily {
    #[serde(rename = "gcc")]
    Gcc,
    #[serde(rename = "clang")]
    Clang,
    #[serde(rename = "apple-clang")]
    AppleClang,
    #[serde(rename = "msvc")]
    Msvc,
    /// Legacy IDE-versioned spelling of the MSVC toolchain (`15`, `16`, `17`)
    #[serde(rename = "Visual Studio")]
    VisualStudio,
    #[serde(rename = "intel-cc")]
    IntelCc,
}

impl CompilerFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gcc => "gcc",
            Self::Clang => "clang",
            Self::AppleClang => "apple-clang",
            Self::Msvc => "msvc",
            Self::VisualStudio => "Visual Studio",
            Self::IntelCc => "intel-cc",
        }
    }

    /// True for both spellings of the MSVC toolchain.
    pub fn is_msvc(&self) -> bool {
        matches!(self, Self::Msvc | Self::VisualStudio)
    }
}

impl FromStr for CompilerFamily {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "gcc" => Self::Gcc,
            "clang" => Self::Clang,
            "apple-clang" => Self::AppleClang,
            "msvc" => Self::Msvc,
            "Visual Studio" => Self::VisualStudio,
            "intel-cc" => Self::IntelCc,
            other => bail!(
                "Invalid setting compiler={}: expected gcc, clang, apple-clang, msvc, Visual Studio or intel-cc",
                other
            ),
        })
    }
}

impl fmt::Display for CompilerFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A C++ language standard, optionally with GNU extensions (`gnu17`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CppStd {
    year: u16,
    gnu: bool,
}

impl CppStd {
    pub const CPP17: CppStd = CppStd {
        year: 2017,
        gnu: false,
    };

    pub fn parse(value: &str) -> Result<Self> {
        let (gnu, number) = match value.strip_prefix("gnu") {
            Some(rest) => (true, rest),
            None => (false, value),
        };

        let year = match number {
            "98" => 1998,
            "11" => 2011,
            "14" => 2014,
            "17" => 2017,
            "20" => 2020,
            "23" => 2023,
            "26" => 2026,
            _ => bail!(
                "Invalid setting compiler.cppstd={}: expected 98, 11, 14, 17, 20, 23 or 26 (optionally gnu-prefixed)",
                value
            ),
        };

        Ok(Self { year, gnu })
    }

    /// Two-digit standard number as passed to `CMAKE_CXX_STANDARD`.
    pub fn number(&self) -> String {
        format!("{:02}", self.year % 100)
    }

    pub fn is_gnu(&self) -> bool {
        self.gnu
    }
}

impl PartialOrd for CppStd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ordered by standard year first; `gnu17` satisfies a C++17 minimum.
impl Ord for CppStd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.year.cmp(&other.year).then(self.gnu.cmp(&other.gnu))
    }
}

impl FromStr for CppStd {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for CppStd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.gnu {
            write!(f, "gnu{}", self.number())
        } else {
            f.write_str(&self.number())
        }
    }
}

impl<'de> Deserialize<'de> for CppStd {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(u64),
        }

        let text = match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s,
            Raw::Int(i) => i.to_string(),
        };
        CppStd::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// C/C++ runtime linkage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Runtime {
    #[serde(rename = "static")]
    Static,
    #[serde(rename = "dynamic")]
    Dynamic,
    MT,
    MTd,
    MD,
    MDd,
}

impl Runtime {
    pub fn is_static(&self) -> bool {
        matches!(self, Self::Static | Self::MT | Self::MTd)
    }
}

impl FromStr for Runtime {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "static" => Self::Static,
            "dynamic" => Self::Dynamic,
            "MT" => Self::MT,
            "MTd" => Self::MTd,
            "MD" => Self::MD,
            "MDd" => Self::MDd,
            other => bail!(
                "Invalid setting compiler.runtime={}: expected static, dynamic, MT, MTd, MD or MDd",
                other
            ),
        })
    }
}

/// The active compiler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiler {
    pub family: CompilerFamily,
    pub version: Version,
    pub cppstd: Option<CppStd>,
    pub runtime: Option<Runtime>,
}

impl Compiler {
    pub fn new(family: CompilerFamily, version: Version) -> Self {
        Self {
            family,
            version,
            cppstd: None,
            runtime: None,
        }
    }

    pub fn cppstd(mut self, cppstd: CppStd) -> Self {
        self.cppstd = Some(cppstd);
        self
    }

    pub fn runtime(mut self, runtime: Runtime) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn is_msvc(&self) -> bool {
        self.family.is_msvc()
    }

    /// MSVC toolset version (`191`, `192`, ...) for either MSVC spelling.
    ///
    /// Returns `None` for non-MSVC compilers and for IDE versions with no
    /// known toolset.
    pub fn msvc_toolset(&self) -> Option<Version> {
        match self.family {
            CompilerFamily::Msvc => Some(self.version.clone()),
            CompilerFamily::VisualStudio => {
                let toolset = match self.version.major() {
                    11 => 170,
                    12 => 180,
                    14 => 190,
                    15 => 191,
                    16 => 192,
                    17 => 193,
                    _ => return None,
                };
                Some(Version::new(toolset, 0, 0))
            }
            _ => None,
        }
    }

    /// True when the MSVC runtime is linked statically (`static`, `MT`, `MTd`).
    pub fn is_static_runtime(&self) -> bool {
        self.runtime.is_some_and(|r| r.is_static())
    }
}

/// Complete settings for one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub os: Os,
    pub arch: String,
    pub build_type: BuildType,
    pub compiler: Compiler,
}

impl Settings {
    /// Settings for `os` with the host architecture and a Release build.
    pub fn new(os: Os, compiler: Compiler) -> Self {
        Self {
            os,
            arch: host_arch(),
            build_type: BuildType::default(),
            compiler,
        }
    }

    pub fn arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = arch.into();
        self
    }

    pub fn build_type(mut self, build_type: BuildType) -> Self {
        self.build_type = build_type;
        self
    }
}
