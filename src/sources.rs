//! Source manifest
//!
//! `sources.toml` lives next to the recipe and lists, per released version,
//! where to download the upstream archive and which patches to apply:
//!
//! ```toml
//! [sources."0.3.0"]
//! url = "https://github.com/open62541pp/open62541pp/archive/refs/tags/v0.3.0.tar.gz"
//! sha256 = "..."
//!
//! [[patches."0.3.0"]]
//! patch_file = "patches/0.3.0-0001-fix-install.patch"
//! patch_description = "fix install destination"
//! patch_type = "conan"
//! ```

use crate::core::version::Version;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Manifest file name inside the recipe folder
pub const MANIFEST_FILE: &str = "sources.toml";

/// Where to fetch one version's sources
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceEntry {
    pub url: String,
    pub sha256: String,
}

/// A patch registered for one version
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchEntry {
    /// Path relative to the recipe folder
    pub patch_file: String,
    #[serde(default)]
    pub patch_description: Option<String>,
    #[serde(default)]
    pub patch_type: Option<String>,
    /// Directory inside the source folder the patch applies to
    #[serde(default)]
    pub base_path: Option<String>,
    /// Leading path components to strip (`patch -pN`)
    #[serde(default = "default_strip")]
    pub strip: u32,
}

fn default_strip() -> u32 {
    1
}

/// Parsed `sources.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceManifest {
    #[serde(default)]
    pub sources: BTreeMap<String, SourceEntry>,
    #[serde(default)]
    pub patches: BTreeMap<String, Vec<PatchEntry>>,
}

impl SourceManifest {
    /// Load `sources.toml` from a recipe folder.
    pub fn load(recipe_dir: &Path) -> Result<Self> {
        let path = recipe_dir.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read source manifest: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid source manifest: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// The source entry for `version`, matched semantically (`"0.3"` finds `"0.3.0"`).
    pub fn source(&self, version: &Version) -> Result<&SourceEntry> {
        self.sources
            .iter()
            .find(|(key, _)| Version::parse(key).is_ok_and(|v| v == *version))
            .map(|(_, entry)| entry)
            .with_context(|| {
                format!(
                    "No sources listed for version {} (available: {})",
                    version,
                    self.versions().join(", ")
                )
            })
    }

    /// Patches registered for `version`, in manifest order.
    pub fn patches(&self, version: &Version) -> &[PatchEntry] {
        self.patches
            .iter()
            .find(|(key, _)| Version::parse(key).is_ok_and(|v| v == *version))
            .map(|(_, patches)| patches.as_slice())
            .unwrap_or(&[])
    }

    /// Every version with sources, oldest first.
    pub fn versions(&self) -> Vec<String> {
        let mut versions: Vec<_> = self
            .sources
            .keys()
            .filter_map(|k| Version::parse(k).ok())
            .collect();
        versions.sort();
        versions.into_iter().map(|v| v.to_string()).collect()
    }
}
