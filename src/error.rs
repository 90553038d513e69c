//! Failure taxonomy for the harness.
//!
//! Every fallible operation in this crate returns [`HarnessError`]. The
//! variants mirror the boundaries the harness sits on: spawning the engine,
//! parsing its output, the profile configuration store, live-mode HTTP, and
//! the released-instance guard. Domain-level transaction failure (the engine
//! ran but the transaction aborted on chain) is deliberately *not* an error;
//! it comes back as a normal result with `succeeded == false`.

use std::fmt;
use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

/// Why live-mode funding could not reach a faucet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaucetUnavailableReason {
    /// The network is known but operates no faucet (e.g. mainnet).
    NoFaucetForNetwork,
    /// The network has a faucet, but it only serves interactively
    /// authenticated requests (e.g. testnet).
    RequiresAuthentication,
    /// The instance was created against a custom endpoint URL and no faucet
    /// endpoint was recorded for it.
    CustomEndpointWithoutFaucet,
}

impl fmt::Display for FaucetUnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::NoFaucetForNetwork => "no faucet exists for this network",
            Self::RequiresAuthentication => {
                "the faucet for this network requires interactive authentication"
            }
            Self::CustomEndpointWithoutFaucet => {
                "no faucet is configured for a custom endpoint"
            }
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Error)]
pub enum HarnessError {
    /// The engine binary could not be started at all.
    #[error("failed to launch `{program}`: {source}")]
    ProcessLaunch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The engine exited non-zero. Both streams are preserved verbatim.
    #[error("engine exited with status {code:?}\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}")]
    ProcessExit {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    /// The engine's stdout carried no well-formed trailing JSON payload.
    #[error("could not parse engine output: {reason}")]
    OutputParse { reason: String, raw: String },

    /// The profile configuration file exists but could not be read back.
    #[error("profile configuration is corrupt: {0}")]
    ConfigParse(String),

    #[error("profile `{0}` already exists")]
    DuplicateProfile(String),

    #[error("no profile named `{0}`")]
    UnknownProfile(String),

    #[error("invalid session options: {0}")]
    InvalidSessionOptions(String),

    /// The engine did not report success for the session-init command.
    #[error("simulation session initialization failed: {0}")]
    SessionInit(String),

    #[error("faucet unavailable: {0}")]
    FaucetUnavailable(FaucetUnavailableReason),

    #[error("invalid account address `{0}`")]
    InvalidAddress(String),

    #[error("invalid private key: {0}")]
    InvalidKey(String),

    /// Problems locating a compiled script artifact by package convention.
    #[error("package manifest error: {0}")]
    Manifest(String),

    #[error("operation not supported in live mode: {0}")]
    UnsupportedInLiveMode(&'static str),

    /// The instance was torn down; only `release` itself remains callable.
    #[error("harness instance has been released")]
    Released,

    /// Live-mode transport or non-2xx failure. A 404 on a resource read is
    /// not an error and never reaches this variant.
    #[error("request to {url} failed (status {status:?}): {message}")]
    Http {
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faucet_reasons_have_distinct_messages() {
        let reasons = [
            FaucetUnavailableReason::NoFaucetForNetwork,
            FaucetUnavailableReason::RequiresAuthentication,
            FaucetUnavailableReason::CustomEndpointWithoutFaucet,
        ];
        let rendered: Vec<String> = reasons.iter().map(ToString::to_string).collect();
        assert_eq!(rendered.len(), 3);
        assert_ne!(rendered[0], rendered[1]);
        assert_ne!(rendered[1], rendered[2]);
    }

    #[test]
    fn process_exit_preserves_both_streams() {
        let err = HarnessError::ProcessExit {
            code: Some(1),
            stdout: "partial output".to_string(),
            stderr: "boom".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("partial output"));
        assert!(rendered.contains("boom"));
    }
}
