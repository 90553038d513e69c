//! Synchronous invocation of the external engine.
//!
//! Spawns the engine with a flat argument vector (no shell), captures both
//! streams, and hands successful stdout to the output extractor. The search
//! path is sanitized per spawn: relative entries and entries under the
//! instance workspace are dropped so a locally-injected binary cannot shadow
//! the real engine. The sanitized value is scoped to the child's environment
//! only; ambient process state is never mutated.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;

use crate::error::{HarnessError, Result};
use crate::output;

/// Environment variable overriding the engine binary (default: `aptos`).
pub const ENGINE_BIN_ENV: &str = "APTOS_HARNESS_BIN";

/// Default engine binary name, resolved on the sanitized search path.
pub const DEFAULT_ENGINE_BIN: &str = "aptos";

/// Resolve the engine binary once, at instance creation.
pub fn engine_binary() -> String {
    std::env::var(ENGINE_BIN_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ENGINE_BIN.to_string())
}

/// Run the engine and parse its trailing JSON payload.
///
/// Fails with `ProcessLaunch` when the binary cannot be started, and with
/// `ProcessExit` (streams preserved verbatim) on a non-zero exit. This layer
/// never interprets domain semantics.
pub fn run_engine(program: &str, args: &[String], workspace: &Path) -> Result<Value> {
    tracing::debug!(program, ?args, "invoking engine");
    let output = Command::new(program)
        .args(args)
        .current_dir(workspace)
        .env("PATH", sanitized_search_path(workspace))
        .output()
        .map_err(|source| HarnessError::ProcessLaunch {
            program: program.to_string(),
            source,
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    if !output.status.success() {
        return Err(HarnessError::ProcessExit {
            code: output.status.code(),
            stdout,
            stderr,
        });
    }
    output::extract_payload(&stdout)
}

/// Build the search path handed to the child process.
///
/// Keeps absolute entries that do not point inside the workspace.
fn sanitized_search_path(workspace: &Path) -> OsString {
    let ambient = std::env::var_os("PATH").unwrap_or_default();
    let kept: Vec<PathBuf> = std::env::split_paths(&ambient)
        .filter(|entry| entry.is_absolute() && !entry.starts_with(workspace))
        .collect();
    std::env::join_paths(kept).unwrap_or(ambient)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_path_drops_relative_entries() {
        let workspace = Path::new("/tmp/aptos-harness-test");
        let sanitized = sanitized_search_path(workspace);
        let entries: Vec<PathBuf> = std::env::split_paths(&sanitized).collect();
        assert!(entries.iter().all(|entry| entry.is_absolute()));
        assert!(entries.iter().all(|entry| !entry.starts_with(workspace)));
    }

    #[test]
    fn missing_binary_is_a_launch_failure() {
        let workspace = std::env::temp_dir();
        let err = run_engine("aptos-harness-no-such-binary", &[], &workspace).unwrap_err();
        assert!(matches!(err, HarnessError::ProcessLaunch { .. }));
    }

    #[test]
    fn engine_binary_defaults_to_aptos() {
        // The override variable is not set in unit test runs.
        if std::env::var(ENGINE_BIN_ENV).is_err() {
            assert_eq!(engine_binary(), DEFAULT_ENGINE_BIN);
        }
    }
}
