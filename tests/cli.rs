//! End-to-end tests for the recipe CLI
//!
//! These tests run the actual binary. None of them reach CMake: `create` is
//! only exercised up to validation or with `--dry-run`.

mod common;

use common::*;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

fn recipe_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_recipe"))
}

fn run_recipe(args: &[&str]) -> Output {
    Command::new(recipe_bin())
        .args(args)
        .env_remove("RECIPE_VERSION")
        .env_remove("RECIPE_PROFILE")
        .output()
        .expect("Failed to execute recipe command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

const LINUX_GCC: [&str; 8] = [
    "-s", "os=Linux", "-s", "compiler=gcc", "-s", "compiler.version=9", "-s", "compiler.cppstd=17",
];

// =============================================================================
// Help and identity
// =============================================================================

#[test]
fn test_cli_help() {
    let output = run_recipe(&["--help"]);
    assert!(output.status.success());
    let out = stdout(&output);
    for cmd in ["create", "validate", "requirements", "options", "info", "inspect"] {
        assert!(out.contains(cmd), "help should list {}: {}", cmd, out);
    }
}

#[test]
fn test_cli_inspect() {
    let output = run_recipe(&["inspect"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("open62541pp"));
    assert!(out.contains("MPL-2.0"));
    assert!(out.contains("https://github.com/open62541pp/open62541pp"));
    assert!(out.contains("opcua"));
}

// =============================================================================
// Requirements and options
// =============================================================================

#[test]
fn test_cli_requirements() {
    let output = run_recipe(&["requirements", "--version", "0.3.1"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "open62541/1.3.9");

    let output = run_recipe(&["requirements", "--version", "0.1.9"]);
    assert_eq!(stdout(&output).trim(), "open62541/1.2.6");
}

#[test]
fn test_cli_requirements_multi_digit_segments() {
    let output = run_recipe(&["requirements", "--version", "0.10.0"]);
    assert_eq!(stdout(&output).trim(), "open62541/1.3.9");
}

#[test]
fn test_cli_options_defaults() {
    let mut args = vec!["options", "--version", "0.3.1"];
    args.extend(LINUX_GCC);
    let output = run_recipe(&args);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "shared=False\nfPIC=True\ninternal_open62541=False\nbuild_documentation=False\n"
    );
}

#[test]
fn test_cli_options_shared_drops_fpic() {
    let mut args = vec!["options", "--version", "0.3.1", "-o", "shared=True", "-o", "fPIC=False"];
    args.extend(LINUX_GCC);
    let output = run_recipe(&args);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(!stdout(&output).contains("fPIC"));
    assert!(stdout(&output).contains("shared=True"));
}

#[test]
fn test_cli_options_windows_has_no_fpic() {
    let output = run_recipe(&[
        "options", "--version", "0.3.1", "-s", "os=Windows", "-s", "compiler=msvc", "-s",
        "compiler.version=193",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(!stdout(&output).contains("fPIC"));
}

#[test]
fn test_cli_unknown_option_rejected() {
    let mut args = vec!["options", "--version", "0.3.1", "-o", "with_tests=True"];
    args.extend(LINUX_GCC);
    let output = run_recipe(&args);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Unknown option"));
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_cli_validate_success_with_profile() {
    let dir = TempDir::new().unwrap();
    let profile = dir.path().join("linux.toml");
    std::fs::write(&profile, LINUX_GCC9_PROFILE).unwrap();

    let output = run_recipe(&["validate", "--version", "0.3.1", "--profile", profile.to_str().unwrap()]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("is valid"));
}

#[test]
fn test_cli_validate_shared_msvc_fails() {
    let dir = TempDir::new().unwrap();
    let profile = dir.path().join("windows.toml");
    std::fs::write(&profile, WINDOWS_MSVC_SHARED_PROFILE).unwrap();

    let output = run_recipe(&["validate", "--version", "0.1.5", "--profile", profile.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(
        stderr(&output).contains("open62541pp/0.1.5 can not be built as shared on Visual Studio and msvc."),
        "{}",
        stderr(&output)
    );
}

#[test]
fn test_cli_validate_low_cppstd_fails() {
    let output = run_recipe(&[
        "validate", "--version", "0.3.1", "-s", "os=Linux", "-s", "compiler=gcc", "-s",
        "compiler.version=11", "-s", "compiler.cppstd=14",
    ]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Current cppstd (14) is lower than the required C++ standard (17)."));
}

#[test]
fn test_cli_flags_override_profile() {
    let dir = TempDir::new().unwrap();
    let profile = dir.path().join("linux.toml");
    std::fs::write(&profile, LINUX_GCC9_PROFILE).unwrap();

    let output = run_recipe(&[
        "validate", "--version", "0.3.1", "--profile", profile.to_str().unwrap(), "-s",
        "compiler.version=6",
    ]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("requires C++17"));
}

#[test]
fn test_cli_missing_compiler_reported() {
    let output = run_recipe(&["validate", "--version", "0.3.1", "-s", "os=Linux"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("compiler"));
}

// =============================================================================
// Metadata
// =============================================================================

#[test]
fn test_cli_info_json() {
    let mut args = vec!["info", "--version", "0.3.1"];
    args.extend(LINUX_GCC);
    let output = run_recipe(&args);
    assert!(output.status.success(), "{}", stderr(&output));

    let info: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(info["libs"][0], "open62541pp");
    assert_eq!(info["system_libs"], serde_json::json!(["m", "pthread", "dl"]));
    assert_eq!(info["properties"]["cmake_file_name"], "open62541pp");
    assert_eq!(info["names"]["cmake_find_package_multi"], "open62541pp");
}

// =============================================================================
// Create
// =============================================================================

#[test]
fn test_cli_create_dry_run_with_local_sources() {
    let dir = TempDir::new().unwrap();
    let checkout = dir.path().join("checkout");
    write_source_tree(&checkout);
    let out = dir.path().join("out");

    let mut args = vec![
        "create",
        "--version",
        "0.3.1",
        "--source-dir",
        checkout.to_str().unwrap(),
        "--output-dir",
        out.to_str().unwrap(),
        "--recipe-dir",
        dir.path().to_str().unwrap(),
        "--dep",
        "open62541=/opt/open62541",
        "--dry-run",
    ];
    args.extend(LINUX_GCC);
    let output = run_recipe(&args);
    assert!(output.status.success(), "{}", stderr(&output));

    let log = stdout(&output);
    assert!(log.contains("[dry-run] cmake -S"), "{}", log);
    assert!(log.contains("--install"), "{}", log);
    assert!(out.join("package/licenses/LICENSE").is_file());
    assert!(out.join("package_info.json").is_file());

    let deps = std::fs::read_to_string(out.join("build/Release/generators/recipe_deps.cmake")).unwrap();
    assert!(deps.contains("/opt/open62541"));
}

#[test]
fn test_cli_create_rejects_before_touching_sources() {
    let dir = TempDir::new().unwrap();
    let profile = dir.path().join("windows.toml");
    std::fs::write(&profile, WINDOWS_MSVC_SHARED_PROFILE).unwrap();
    let out = dir.path().join("out");

    let output = run_recipe(&[
        "create",
        "--version",
        "0.1.5",
        "--profile",
        profile.to_str().unwrap(),
        "--output-dir",
        out.to_str().unwrap(),
        "--recipe-dir",
        dir.path().to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("can not be built as shared"));
    assert!(!out.join("src").exists());
}

#[test]
fn test_cli_create_unknown_dependency() {
    let mut args = vec!["create", "--version", "0.3.1", "--dep", "boost=/opt/boost", "--dry-run"];
    args.extend(LINUX_GCC);
    let output = run_recipe(&args);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Unknown dependency 'boost'"));
}
