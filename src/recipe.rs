//! Package identity
//!
//! Fixed metadata describing the packaged library, plus the `name/version`
//! reference used to identify one concrete package.

use crate::core::version::Version;
use std::fmt;

/// Immutable package metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageIdentity {
    pub name: &'static str,
    pub description: &'static str,
    pub license: &'static str,
    pub url: &'static str,
    pub homepage: &'static str,
    pub topics: &'static [&'static str],
    pub package_type: &'static str,
}

/// The open62541pp package
pub const OPEN62541PP: PackageIdentity = PackageIdentity {
    name: "open62541pp",
    description: "open62541++ is a C++ wrapper built on top of the amazing open62541 OPC UA (OPC Unified Architecture) library",
    license: "MPL-2.0",
    url: "https://github.com/conan-io/conan-center-index",
    homepage: "https://github.com/open62541pp/open62541pp",
    topics: &["cpp", "cpp17", "opcua", "open62541"],
    package_type: "library",
};

/// A concrete package: `name/version`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub name: String,
    pub version: Version,
}

impl Reference {
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }

    /// Reference to open62541pp at `version`.
    pub fn open62541pp(version: Version) -> Self {
        Self::new(OPEN62541PP.name, version)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}
