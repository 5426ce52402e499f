//! Version parsing and comparison
//!
//! Package and compiler versions are written loosely (`"7"`, `"0.2"`,
//! `"v0.3.1"`, `"11.4"`). They are padded to `X.Y.Z` and compared with
//! [`semver`], so `"0.10.0"` sorts after `"0.9.0"` and `"7"` equals `"7.0.0"`.
//!
//! ```
//! use open62541pp_recipe::Version;
//!
//! let v: Version = "0.3".parse().unwrap();
//! assert!(v >= Version::new(0, 2, 0));
//! assert_eq!(v.to_string(), "0.3");
//! ```

use anyhow::{Result, bail};
use serde::{Deserialize, Deserializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A version that keeps its original spelling but compares semantically.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    parsed: semver::Version,
}

impl Version {
    /// Build a version from numeric components.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            raw: format!("{}.{}.{}", major, minor, patch),
            parsed: semver::Version::new(major, minor, patch),
        }
    }

    /// Parse a version string, padding missing components.
    pub fn parse(version: &str) -> Result<Self> {
        let trimmed = version.trim();
        let stripped = trimmed.trim_start_matches('v');

        if stripped.is_empty() {
            bail!("Empty version string");
        }

        let padded = pad_version(stripped);
        let parsed = semver::Version::parse(&padded)
            .map_err(|e| anyhow::anyhow!("Invalid version '{}': {}", version, e))?;

        Ok(Self {
            raw: trimmed.to_string(),
            parsed,
        })
    }

    pub fn major(&self) -> u64 {
        self.parsed.major
    }

    /// The string the version was parsed from.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Pad a version string to be semver-compatible (X.Y.Z)
fn pad_version(version: &str) -> String {
    // Split off pre-release/build suffixes so "1.2-rc1" pads to "1.2.0-rc1"
    let split_at = version.find(['-', '+']).unwrap_or(version.len());
    let (core, suffix) = version.split_at(split_at);

    let parts: Vec<&str> = core.split('.').collect();
    match parts.len() {
        1 => format!("{}.0.0{}", parts[0], suffix),
        2 => format!("{}.{}.0{}", parts[0], parts[1], suffix),
        _ => version.to_string(),
    }
}

impl FromStr for Version {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.parsed == other.parsed
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parsed.cmp(&other.parsed)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Profiles may spell compiler versions as bare integers: `version = 9`.
        // Floats lose trailing zeros (11.10 reads as 11.1), so they are refused.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(u64),
            Float(f64),
        }

        let text = match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s,
            Raw::Int(i) => i.to_string(),
            Raw::Float(f) => {
                return Err(serde::de::Error::custom(format!(
                    "version {} must be quoted, write it as a string such as \"11.10\"",
                    f
                )));
            }
        };
        Version::parse(&text).map_err(serde::de::Error::custom)
    }
}
