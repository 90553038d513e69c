//! Session options and network endpoint resolution.
//!
//! Simulation sessions are engine-managed, file-backed ledgers living under
//! the instance workspace; they may be empty (local) or forked from a real
//! network's state. Live mode records REST/faucet endpoints instead of
//! creating any session.

use crate::error::{FaucetUnavailableReason, HarnessError, Result};

const DEVNET_REST: &str = "https://fullnode.devnet.aptoslabs.com";
const DEVNET_FAUCET: &str = "https://faucet.devnet.aptoslabs.com";
const TESTNET_REST: &str = "https://fullnode.testnet.aptoslabs.com";
const MAINNET_REST: &str = "https://fullnode.mainnet.aptoslabs.com";
const LOCAL_REST: &str = "http://127.0.0.1:8080";
const LOCAL_FAUCET: &str = "http://127.0.0.1:8081";

/// Options for creating a simulation session.
///
/// Leaving everything unset yields an isolated local session; supplying a
/// network *and* an api key forks the session from that network, optionally
/// at a historical version.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub network: Option<String>,
    pub api_key: Option<String>,
    pub network_version: Option<u64>,
}

impl SessionOptions {
    /// Reject inconsistent combinations before any engine call is made.
    pub fn validate(&self) -> Result<()> {
        match (&self.network, &self.api_key) {
            (Some(_), None) => Err(HarnessError::InvalidSessionOptions(
                "an api key is required when forking from a network".to_string(),
            )),
            (None, Some(_)) => Err(HarnessError::InvalidSessionOptions(
                "a network is required when an api key is supplied".to_string(),
            )),
            _ if self.network_version.is_some() && self.network.is_none() => {
                Err(HarnessError::InvalidSessionOptions(
                    "a network version requires a network to fork from".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }

    pub fn is_forked(&self) -> bool {
        self.network.is_some()
    }
}

/// How live-mode funding may reach a faucet for a given network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaucetAccess {
    /// Open faucet at this endpoint.
    Open(String),
    /// A faucet exists but serves only interactively authenticated requests.
    Authenticated,
    /// No faucet; `custom` distinguishes "known network without one" from
    /// "custom endpoint with nothing configured".
    None { custom: bool },
}

impl FaucetAccess {
    pub fn unavailable_reason(&self) -> Option<FaucetUnavailableReason> {
        match self {
            Self::Open(_) => None,
            Self::Authenticated => Some(FaucetUnavailableReason::RequiresAuthentication),
            Self::None { custom: false } => Some(FaucetUnavailableReason::NoFaucetForNetwork),
            Self::None { custom: true } => {
                Some(FaucetUnavailableReason::CustomEndpointWithoutFaucet)
            }
        }
    }
}

/// Resolved endpoints for a live-mode instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkEndpoints {
    /// Symbolic label (lower-cased known name) or the literal custom URL.
    pub label: String,
    pub rest_url: String,
    pub faucet: FaucetAccess,
}

/// Map a network label to its well-known endpoints, case-insensitively.
/// An unrecognized label is treated as a literal custom endpoint URL.
pub fn resolve_network(network: &str) -> NetworkEndpoints {
    let trimmed = network.trim();
    match trimmed.to_lowercase().as_str() {
        "devnet" => NetworkEndpoints {
            label: "devnet".to_string(),
            rest_url: DEVNET_REST.to_string(),
            faucet: FaucetAccess::Open(DEVNET_FAUCET.to_string()),
        },
        "testnet" => NetworkEndpoints {
            label: "testnet".to_string(),
            rest_url: TESTNET_REST.to_string(),
            faucet: FaucetAccess::Authenticated,
        },
        "mainnet" => NetworkEndpoints {
            label: "mainnet".to_string(),
            rest_url: MAINNET_REST.to_string(),
            faucet: FaucetAccess::None { custom: false },
        },
        "local" | "localnet" => NetworkEndpoints {
            label: "local".to_string(),
            rest_url: LOCAL_REST.to_string(),
            faucet: FaucetAccess::Open(LOCAL_FAUCET.to_string()),
        },
        _ => NetworkEndpoints {
            label: trimmed.to_string(),
            rest_url: trimmed.trim_end_matches('/').to_string(),
            faucet: FaucetAccess::None { custom: true },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(network: Option<&str>, api_key: Option<&str>, version: Option<u64>) -> SessionOptions {
        SessionOptions {
            network: network.map(String::from),
            api_key: api_key.map(String::from),
            network_version: version,
        }
    }

    #[test]
    fn neither_or_both_fork_options_are_valid() {
        assert!(opts(None, None, None).validate().is_ok());
        assert!(opts(Some("mainnet"), Some("key"), None).validate().is_ok());
        assert!(opts(Some("mainnet"), Some("key"), Some(100)).validate().is_ok());
    }

    #[test]
    fn exactly_one_fork_option_is_invalid() {
        for bad in [opts(Some("mainnet"), None, None), opts(None, Some("key"), None)] {
            assert!(matches!(
                bad.validate(),
                Err(HarnessError::InvalidSessionOptions(_))
            ));
        }
    }

    #[test]
    fn version_without_network_is_invalid() {
        assert!(matches!(
            opts(None, None, Some(7)).validate(),
            Err(HarnessError::InvalidSessionOptions(_))
        ));
    }

    #[test]
    fn known_labels_resolve_case_insensitively() {
        assert_eq!(resolve_network("DevNet"), resolve_network("devnet"));
        assert_eq!(resolve_network(" testnet "), resolve_network("testnet"));
        assert!(matches!(
            resolve_network("devnet").faucet,
            FaucetAccess::Open(_)
        ));
    }

    #[test]
    fn testnet_faucet_needs_authentication() {
        assert_eq!(
            resolve_network("testnet").faucet.unavailable_reason(),
            Some(FaucetUnavailableReason::RequiresAuthentication)
        );
    }

    #[test]
    fn mainnet_records_no_faucet() {
        assert_eq!(
            resolve_network("mainnet").faucet.unavailable_reason(),
            Some(FaucetUnavailableReason::NoFaucetForNetwork)
        );
    }

    #[test]
    fn unknown_label_is_a_literal_custom_endpoint() {
        let custom = resolve_network("https://my-node.example.com/");
        assert_eq!(custom.rest_url, "https://my-node.example.com");
        assert_eq!(
            custom.faucet.unavailable_reason(),
            Some(FaucetUnavailableReason::CustomEndpointWithoutFaucet)
        );
    }
}
