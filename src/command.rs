//! Argv builders for the engine's session-management commands, plus the
//! build-output convention used to locate compiled script artifacts.
//!
//! Keeping these outside the mode adapter keeps session lifecycle concerns
//! distinct from per-operation command construction.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{HarnessError, Result};
use crate::session::SessionOptions;

/// Build the argv for `simulation init` against a session directory.
pub fn build_session_init_command(session_dir: &Path, options: &SessionOptions) -> Vec<String> {
    let mut args = vec![
        "simulation".to_string(),
        "init".to_string(),
        "--session-dir".to_string(),
        session_dir.display().to_string(),
    ];
    if let Some(network) = options.network.as_deref() {
        args.push("--network".to_string());
        args.push(network.to_string());
    }
    if let Some(api_key) = options.api_key.as_deref() {
        args.push("--api-key".to_string());
        args.push(api_key.to_string());
    }
    if let Some(version) = options.network_version {
        args.push("--network-version".to_string());
        args.push(version.to_string());
    }
    args
}

/// Build the argv for a direct ledger credit in a simulation session.
pub fn build_session_fund_command(session_dir: &Path, address: &str, amount: u64) -> Vec<String> {
    vec![
        "simulation".to_string(),
        "fund".to_string(),
        "--session-dir".to_string(),
        session_dir.display().to_string(),
        "--account".to_string(),
        address.to_string(),
        "--amount".to_string(),
        amount.to_string(),
    ]
}

/// Build the argv for a resource query against local session state.
pub fn build_session_resource_command(
    session_dir: &Path,
    address: &str,
    resource_type: &str,
) -> Vec<String> {
    vec![
        "simulation".to_string(),
        "view-resource".to_string(),
        "--session-dir".to_string(),
        session_dir.display().to_string(),
        "--account".to_string(),
        address.to_string(),
        "--resource-type".to_string(),
        resource_type.to_string(),
    ]
}

/// Build the argv for a resource-group query against local session state.
pub fn build_session_resource_group_command(
    session_dir: &Path,
    address: &str,
    group_type: &str,
) -> Vec<String> {
    vec![
        "simulation".to_string(),
        "view-resource-group".to_string(),
        "--session-dir".to_string(),
        session_dir.display().to_string(),
        "--account".to_string(),
        address.to_string(),
        "--group-type".to_string(),
        group_type.to_string(),
    ]
}

/// Build the argv for the compile phase of `run_script`.
pub fn build_compile_command(
    package_dir: &Path,
    named_addresses: &[(String, String)],
    extra_args: &[String],
) -> Vec<String> {
    let mut args = vec![
        "move".to_string(),
        "compile".to_string(),
        "--package-dir".to_string(),
        package_dir.display().to_string(),
    ];
    push_named_addresses(&mut args, named_addresses);
    args.extend(extra_args.iter().cloned());
    args
}

/// Render named address bindings as `key=value` comma-joined.
pub fn push_named_addresses(args: &mut Vec<String>, named_addresses: &[(String, String)]) {
    if named_addresses.is_empty() {
        return;
    }
    let joined = named_addresses
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(",");
    args.push("--named-addresses".to_string());
    args.push(joined);
}

/// Locate a compiled script artifact by convention: the package name from
/// the manifest plus the fixed build-output layout.
pub fn compiled_script_path(package_dir: &Path, script_name: &str) -> Result<PathBuf> {
    let package_name = manifest_package_name(package_dir)?;
    let artifact = package_dir
        .join("build")
        .join(&package_name)
        .join("bytecode_scripts")
        .join(format!("{script_name}.mv"));
    if !artifact.exists() {
        return Err(HarnessError::Manifest(format!(
            "compiled script not found at {}",
            artifact.display()
        )));
    }
    Ok(artifact)
}

/// Pull the `name` entry out of the `[package]` section of `Move.toml`.
/// This is a convention lookup, not a manifest parser.
fn manifest_package_name(package_dir: &Path) -> Result<String> {
    let manifest = package_dir.join("Move.toml");
    let text = fs::read_to_string(&manifest).map_err(|err| {
        HarnessError::Manifest(format!("cannot read {}: {err}", manifest.display()))
    })?;
    let mut in_package = false;
    for line in text.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            in_package = line == "[package]";
            continue;
        }
        if !in_package {
            continue;
        }
        if let Some(rest) = line.strip_prefix("name") {
            let rest = rest.trim_start();
            if let Some(value) = rest.strip_prefix('=') {
                let value = value.trim().trim_matches('"').trim_matches('\'');
                if !value.is_empty() {
                    return Ok(value.to_string());
                }
            }
        }
    }
    Err(HarnessError::Manifest(format!(
        "no package name in {}",
        manifest.display()
    )))
}
