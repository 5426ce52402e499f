//! Package options
//!
//! Options start from their defaults, receive user overrides, and then go
//! through two configuration steps: `config_options` removes options that
//! do not exist on the target platform and `configure` removes options made
//! meaningless by other option values. A removed option is `None`.

use crate::settings::Os;
use anyhow::{Result, bail};
use serde::{Deserialize, Deserializer, Serialize};

/// Effective option values for one build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OptionSet {
    pub shared: bool,
    /// Position-independent code. Absent on Windows and for shared builds.
    #[serde(rename = "fPIC", skip_serializing_if = "Option::is_none")]
    pub fpic: Option<bool>,
    pub internal_open62541: bool,
    pub build_documentation: bool,
}

impl Default for OptionSet {
    fn default() -> Self {
        Self {
            shared: false,
            fpic: Some(true),
            internal_open62541: false,
            build_documentation: false,
        }
    }
}

impl OptionSet {
    /// Drop options that do not exist for the target OS.
    pub fn config_options(mut self, os: Os) -> Self {
        if os == Os::Windows {
            self.fpic = None;
        }
        self
    }

    /// Drop options made irrelevant by other option values.
    pub fn configure(mut self) -> Self {
        if self.shared {
            self.fpic = None;
        }
        self
    }

    /// Resolve the effective options for `os` from defaults plus overrides.
    ///
    /// An override for an option that configuration removes is ignored.
    pub fn resolve(os: Os, overrides: &OptionOverrides) -> Self {
        let mut options = Self::default().config_options(os);

        if let Some(shared) = overrides.shared {
            options.shared = shared;
        }
        if let (Some(_), Some(fpic)) = (options.fpic, overrides.fpic) {
            options.fpic = Some(fpic);
        }
        if let Some(internal) = overrides.internal_open62541 {
            options.internal_open62541 = internal;
        }
        if let Some(docs) = overrides.build_documentation {
            options.build_documentation = docs;
        }

        options.configure()
    }

    /// `(name, value)` pairs in declaration order, skipping removed options.
    pub fn entries(&self) -> Vec<(&'static str, bool)> {
        let mut entries = vec![("shared", self.shared)];
        if let Some(fpic) = self.fpic {
            entries.push(("fPIC", fpic));
        }
        entries.push(("internal_open62541", self.internal_open62541));
        entries.push(("build_documentation", self.build_documentation));
        entries
    }
}

/// User-requested option values, as read from a profile or `-o` flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionOverrides {
    #[serde(default, deserialize_with = "flag")]
    pub shared: Option<bool>,
    #[serde(rename = "fPIC", default, deserialize_with = "flag")]
    pub fpic: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    pub internal_open62541: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    pub build_documentation: Option<bool>,
}

impl OptionOverrides {
    /// Apply a single `name=value` override.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        let value = parse_bool(name, value)?;
        match name {
            "shared" => self.shared = Some(value),
            "fPIC" => self.fpic = Some(value),
            "internal_open62541" => self.internal_open62541 = Some(value),
            "build_documentation" => self.build_documentation = Some(value),
            other => bail!(
                "Unknown option '{}': expected shared, fPIC, internal_open62541 or build_documentation",
                other
            ),
        }
        Ok(())
    }

    /// Layer `other` on top of `self`; values set in `other` win.
    pub fn merge(self, other: OptionOverrides) -> Self {
        Self {
            shared: other.shared.or(self.shared),
            fpic: other.fpic.or(self.fpic),
            internal_open62541: other.internal_open62541.or(self.internal_open62541),
            build_documentation: other.build_documentation.or(self.build_documentation),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "True" | "true" | "1" => Some(true),
        "False" | "false" | "0" => Some(false),
        _ => None,
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match parse_flag(value) {
        Some(value) => Ok(value),
        None => bail!(
            "Invalid value '{}' for option '{}': expected True or False",
            value,
            name
        ),
    }
}

/// Profile option value: a TOML boolean, `0`/`1`, or the strings accepted by `-o`.
fn flag<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    let value = match Raw::deserialize(deserializer)? {
        Raw::Bool(b) => Some(b),
        Raw::Int(i) => parse_flag(&i.to_string()),
        Raw::Text(s) => parse_flag(&s),
    };
    value
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom("expected True or False"))
}
