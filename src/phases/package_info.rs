//! Consumer metadata
//!
//! What a downstream build needs to link against the package: library
//! names, include directories, system libraries and the CMake target and
//! file names generators should produce.

use crate::phases::requirements::OPEN62541;
use crate::recipe::OPEN62541PP;
use crate::settings::{Os, Settings};
use serde::Serialize;
use std::collections::BTreeMap;

/// Link and target information for one component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Component {
    pub libs: Vec<String>,
    pub requires: Vec<String>,
    pub properties: BTreeMap<String, String>,
}

/// Package-level consumer metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CppInfo {
    pub libs: Vec<String>,
    pub includedirs: Vec<String>,
    pub system_libs: Vec<String>,
    pub properties: BTreeMap<String, String>,
    pub components: BTreeMap<String, Component>,
    /// Legacy generator target names
    pub names: BTreeMap<String, String>,
    /// Legacy generator file names
    pub filenames: BTreeMap<String, String>,
}

const LEGACY_GENERATORS: [&str; 2] = ["cmake_find_package", "cmake_find_package_multi"];

/// System libraries needed on `os`.
pub fn system_libs(os: Os) -> Vec<String> {
    match os {
        Os::Linux | Os::FreeBSD => ["m", "pthread", "dl"].map(String::from).to_vec(),
        _ => Vec::new(),
    }
}

/// Consumer metadata for a build with `settings`.
pub fn package_info(settings: &Settings) -> CppInfo {
    let name = OPEN62541PP.name;
    let target = format!("{0}::{0}", name);

    let component = Component {
        libs: vec![name.to_string()],
        requires: vec![format!("{0}::{0}", OPEN62541)],
        properties: BTreeMap::from([("cmake_target_name".to_string(), target.clone())]),
    };

    let legacy: BTreeMap<String, String> = LEGACY_GENERATORS
        .iter()
        .map(|g| (g.to_string(), name.to_string()))
        .collect();

    CppInfo {
        libs: vec![name.to_string()],
        includedirs: vec!["include".to_string()],
        system_libs: system_libs(settings.os),
        properties: BTreeMap::from([
            ("cmake_file_name".to_string(), name.to_string()),
            ("cmake_target_name".to_string(), target),
        ]),
        components: BTreeMap::from([(name.to_string(), component)]),
        names: legacy.clone(),
        filenames: legacy,
    }
}
