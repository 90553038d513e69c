//! Live-mode network reads and faucet funding.
//!
//! A thin synchronous client over the node's REST API. Only the calls the
//! harness needs are wrapped: resource-by-type-and-address, transaction-by-
//! hash, and the faucet mint. "Resource not found" is an absent result, not
//! an error; every other non-2xx or transport failure surfaces as `Http`
//! with the status and body attached.

use std::time::Duration;

use serde_json::Value;

use crate::error::{HarnessError, Result};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default connect timeout in seconds.
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// REST client bound to one node endpoint.
pub struct RestClient {
    agent: ureq::Agent,
    base: String,
}

impl RestClient {
    pub fn new(base: &str) -> Self {
        Self {
            agent: build_agent(),
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Fetch one resource by account address and fully qualified type.
    /// HTTP 404 normalizes to `Ok(None)`.
    pub fn get_resource(&self, address: &str, resource_type: &str) -> Result<Option<Value>> {
        let url = format!(
            "{}/v1/accounts/{}/resource/{}",
            self.base,
            address,
            encode_resource_type(resource_type)
        );
        tracing::debug!(%url, "fetching resource");
        match self.agent.get(&url).call() {
            Ok(response) => Ok(Some(into_json(response, &url)?)),
            Err(ureq::Error::Status(404, _)) => Ok(None),
            Err(err) => Err(http_error(err, url)),
        }
    }

    /// Fetch a committed transaction by hash (used for event lookup).
    pub fn get_transaction(&self, hash: &str) -> Result<Value> {
        let url = format!("{}/v1/transactions/by_hash/{}", self.base, hash);
        tracing::debug!(%url, "fetching transaction");
        match self.agent.get(&url).call() {
            Ok(response) => into_json(response, &url),
            Err(err) => Err(http_error(err, url)),
        }
    }
}

/// Ask a faucet to credit `address` with `amount`. The faucet acknowledges
/// with a JSON array of submitted transaction hashes; anything else is
/// treated as a failure.
pub fn faucet_fund(faucet_base: &str, address: &str, amount: u64) -> Result<()> {
    let url = format!(
        "{}/mint?amount={}&address={}",
        faucet_base.trim_end_matches('/'),
        amount,
        address
    );
    tracing::debug!(%url, "requesting faucet funding");
    let response = build_agent()
        .post(&url)
        .send_string("")
        .map_err(|err| http_error(err, url.clone()))?;
    let body = response.into_string().map_err(|err| HarnessError::Http {
        url: url.clone(),
        status: None,
        message: err.to_string(),
    })?;
    if body.trim_start().starts_with('[') {
        Ok(())
    } else {
        Err(HarnessError::Http {
            url,
            status: None,
            message: format!("unexpected faucet response: {body}"),
        })
    }
}

fn build_agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .timeout_connect(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .build()
}

fn into_json(response: ureq::Response, url: &str) -> Result<Value> {
    response.into_json().map_err(|err| HarnessError::Http {
        url: url.to_string(),
        status: None,
        message: err.to_string(),
    })
}

fn http_error(err: ureq::Error, url: String) -> HarnessError {
    match err {
        ureq::Error::Status(status, response) => HarnessError::Http {
            url,
            status: Some(status),
            message: response.into_string().unwrap_or_default(),
        },
        other => HarnessError::Http {
            url,
            status: None,
            message: other.to_string(),
        },
    }
}

/// Percent-encode the characters a generic type tag may carry that are not
/// valid in a URL path segment. `::` stays literal; the node accepts it.
fn encode_resource_type(resource_type: &str) -> String {
    let mut out = String::with_capacity(resource_type.len());
    for c in resource_type.chars() {
        match c {
            '<' => out.push_str("%3C"),
            '>' => out.push_str("%3E"),
            ',' => out.push_str("%2C"),
            ' ' => out.push_str("%20"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_type_tags_are_path_safe() {
        let encoded =
            encode_resource_type("0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin, u8>");
        assert_eq!(
            encoded,
            "0x1::coin::CoinStore%3C0x1::aptos_coin::AptosCoin%2C%20u8%3E"
        );
    }

    #[test]
    fn base_url_is_normalized() {
        let client = RestClient::new("https://node.example.com/");
        assert_eq!(client.base_url(), "https://node.example.com");
    }
}
