//! Profile store: named signing identities persisted per workspace.
//!
//! Profiles live in `.aptos/config.yaml` inside the instance workspace, in
//! the layout the engine itself reads (`profiles` mapping keyed by name).
//! The map is a `BTreeMap`, so repeated writes serialize with stable key
//! ordering and stay diff-friendly. A duplicate name fails before any
//! mutation; profiles are only ever wiped wholesale with the workspace.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

use crate::error::{HarnessError, Result};

const CONFIG_DIR: &str = ".aptos";
const CONFIG_FILE: &str = "config.yaml";

/// Scheme byte appended to the public key when deriving the account address.
const ED25519_AUTH_SCHEME: u8 = 0x00;

/// A named signing identity usable as a transaction sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    /// Canonical lower-case hex, `0x`-prefixed.
    pub address: String,
    pub private_key: String,
    pub public_key: String,
    pub network: String,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProfileEntry {
    network: String,
    private_key: String,
    public_key: String,
    account: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    rest_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ProfileConfig {
    profiles: BTreeMap<String, ProfileEntry>,
}

/// Persistent profile store bound to one workspace.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    config_path: PathBuf,
}

impl ProfileStore {
    pub fn new(workspace: &Path) -> Self {
        Self {
            config_path: workspace.join(CONFIG_DIR).join(CONFIG_FILE),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Create a profile, generating a fresh keypair when no private key is
    /// supplied. Fails with `DuplicateProfile` without touching stored state.
    pub fn init_profile(
        &self,
        name: &str,
        private_key: Option<&str>,
        network: &str,
        endpoint: Option<&str>,
    ) -> Result<Profile> {
        let mut config = self.load()?;
        if config.profiles.contains_key(name) {
            return Err(HarnessError::DuplicateProfile(name.to_string()));
        }

        let signing = match private_key {
            Some(hex_key) => parse_private_key(hex_key)?,
            None => SigningKey::generate(&mut OsRng),
        };
        let public = signing.verifying_key();
        let address = derive_address(public.as_bytes());

        let entry = ProfileEntry {
            network: network.to_string(),
            private_key: format!("0x{}", hex::encode(signing.to_bytes())),
            public_key: format!("0x{}", hex::encode(public.to_bytes())),
            account: address.clone(),
            rest_url: endpoint.map(String::from),
        };
        let profile = Profile {
            name: name.to_string(),
            address,
            private_key: entry.private_key.clone(),
            public_key: entry.public_key.clone(),
            network: entry.network.clone(),
            endpoint: entry.rest_url.clone(),
        };
        config.profiles.insert(name.to_string(), entry);
        self.save(&config)?;
        Ok(profile)
    }

    /// Look up a stored profile by name.
    pub fn get(&self, name: &str) -> Result<Option<Profile>> {
        let config = self.load()?;
        Ok(config.profiles.get(name).map(|entry| Profile {
            name: name.to_string(),
            address: entry.account.clone(),
            private_key: entry.private_key.clone(),
            public_key: entry.public_key.clone(),
            network: entry.network.clone(),
            endpoint: entry.rest_url.clone(),
        }))
    }

    fn load(&self) -> Result<ProfileConfig> {
        if !self.config_path.exists() {
            return Ok(ProfileConfig::default());
        }
        let text = fs::read_to_string(&self.config_path)?;
        serde_yaml::from_str(&text).map_err(|err| HarnessError::ConfigParse(err.to_string()))
    }

    fn save(&self, config: &ProfileConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_yaml::to_string(config)
            .map_err(|err| HarnessError::ConfigParse(err.to_string()))?;
        fs::write(&self.config_path, text)?;
        Ok(())
    }
}

/// Account address: SHA3-256 over the public key followed by the scheme byte.
fn derive_address(public_key: &[u8; 32]) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update(public_key);
    hasher.update([ED25519_AUTH_SCHEME]);
    format!("0x{}", hex::encode(hasher.finalize()))
}

fn parse_private_key(hex_key: &str) -> Result<SigningKey> {
    let trimmed = hex_key.trim();
    let bare = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let bytes =
        hex::decode(bare).map_err(|err| HarnessError::InvalidKey(err.to_string()))?;
    let seed: [u8; 32] = bytes
        .try_into()
        .map_err(|_| HarnessError::InvalidKey("expected a 32-byte seed".to_string()))?;
    Ok(SigningKey::from_bytes(&seed))
}
