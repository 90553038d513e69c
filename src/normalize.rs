//! Cross-mode result normalization.
//!
//! The engine's JSON output and the live REST responses are treated as
//! untrusted, loosely-typed documents. Everything leaving the crate goes
//! through this module: address prefixing, transaction-summary extraction,
//! event reshaping, and the fungible-store address derivation.

use std::path::Path;

use serde_json::Value;
use sha3::{Digest, Sha3_256};

use crate::error::{HarnessError, Result};
use crate::types::{Event, TransactionResult};

/// Scheme tag for deriving an object address from a source address,
/// appended after `owner bytes || seed bytes` before hashing.
const OBJECT_DERIVATION_SCHEME: u8 = 0xFC;

// =============================================================================
// Addresses
// =============================================================================

/// Prefix a backend-returned address with `0x` when it lacks one.
pub fn ensure_hex_prefix(value: &str) -> String {
    if value.starts_with("0x") || value.starts_with("0X") {
        value.to_string()
    } else {
        format!("0x{value}")
    }
}

/// Parse an address in short or long form, with or without `0x`, into its
/// 32-byte canonical form.
pub fn parse_address(addr: &str) -> Result<[u8; 32]> {
    let s = addr.trim();
    let hex_str = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    if hex_str.is_empty()
        || hex_str.len() > 64
        || !hex_str.chars().all(|c| c.is_ascii_hexdigit())
    {
        return Err(HarnessError::InvalidAddress(addr.to_string()));
    }
    let padded = format!("{hex_str:0>64}");
    let decoded =
        hex::decode(&padded).map_err(|_| HarnessError::InvalidAddress(addr.to_string()))?;
    let mut out = [0u8; 32];
    out.copy_from_slice(&decoded);
    Ok(out)
}

/// Full 64-character lower-case form with `0x` prefix.
pub fn canonical_address(addr: &str) -> Result<String> {
    Ok(format!("0x{}", hex::encode(parse_address(addr)?)))
}

/// Derive the primary fungible-store object address for an owner and an
/// asset's metadata address: SHA3-256(owner || metadata || scheme tag).
pub fn primary_store_address(owner: &str, metadata: &str) -> Result<String> {
    let mut hasher = Sha3_256::new();
    hasher.update(parse_address(owner)?);
    hasher.update(parse_address(metadata)?);
    hasher.update([OBJECT_DERIVATION_SCHEME]);
    Ok(format!("0x{}", hex::encode(hasher.finalize())))
}

// =============================================================================
// Transaction summaries
// =============================================================================

/// Interpret a trailing engine payload as a transaction summary.
///
/// The payload is either `{"Result": {...}}` or `{"Error": ...}`; an `Error`
/// body means the engine committed a failing transaction and reported it, so
/// the result carries `succeeded = false` rather than raising.
pub fn transaction_result_from_payload(payload: Value) -> TransactionResult {
    let body = payload
        .get("Result")
        .cloned()
        .unwrap_or(Value::Null);
    let succeeded = if payload.get("Error").is_some() {
        false
    } else {
        match body.get("success").and_then(Value::as_bool) {
            Some(flag) => flag,
            None => body
                .get("vm_status")
                .and_then(Value::as_str)
                .map(|status| status.contains("Executed"))
                .unwrap_or(true),
        }
    };
    let transaction_hash = body
        .get("transaction_hash")
        .and_then(Value::as_str)
        .map(ensure_hex_prefix);
    let deployed_object_address = body
        .get("deployed_object_address")
        .or_else(|| body.get("object_address"))
        .and_then(Value::as_str)
        .map(ensure_hex_prefix);
    TransactionResult {
        succeeded,
        transaction_hash,
        deployed_object_address,
        events: None,
        raw: payload,
    }
}

/// Read a `u64` that a backend may encode as a JSON number or string.
pub fn u64_from_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Extract the balance from a `0x1::fungible_asset::FungibleStore` resource
/// view; a missing store reads as zero.
pub fn balance_from_store(resource: Option<&Value>) -> u64 {
    resource
        .and_then(|r| r.get("data"))
        .and_then(|data| data.get("balance"))
        .and_then(u64_from_value)
        .unwrap_or(0)
}

// =============================================================================
// Events
// =============================================================================

/// Map the `events` array of a REST transaction-by-hash response into the
/// uniform `{type, data}` shape.
pub fn events_from_rest_transaction(transaction: &Value) -> Option<Vec<Event>> {
    let entries = transaction.get("events")?.as_array()?;
    Some(entries.iter().filter_map(reshape_event).collect())
}

/// Read and reshape a simulation session's on-disk event log for one
/// transaction. Returns `None` when the log is missing or malformed; the
/// caller downgrades that to "no events attached".
pub fn events_from_session_log(path: &Path) -> Option<Vec<Event>> {
    let text = std::fs::read_to_string(path).ok()?;
    let records: Value = serde_json::from_str(&text).ok()?;
    let entries = records.as_array()?;
    Some(entries.iter().filter_map(reshape_event).collect())
}

/// Reshape one native event record into `{type, data}`, dropping bookkeeping
/// fields (guid, sequence number) the live shape does not carry.
fn reshape_event(record: &Value) -> Option<Event> {
    let event_type = record.get("type")?.as_str()?;
    Some(Event {
        event_type: ensure_hex_prefix(event_type),
        data: record.get("data").cloned().unwrap_or(Value::Null),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prefix_is_added_only_when_missing() {
        assert_eq!(ensure_hex_prefix("abc123"), "0xabc123");
        assert_eq!(ensure_hex_prefix("0xabc123"), "0xabc123");
    }

    #[test]
    fn short_and_long_addresses_parse_to_the_same_bytes() {
        let short = parse_address("0x1").unwrap();
        let long = parse_address(&format!("0x{}", "0".repeat(63) + "1")).unwrap();
        let bare = parse_address("1").unwrap();
        assert_eq!(short, long);
        assert_eq!(short, bare);
        assert_eq!(short[31], 1);
    }

    #[test]
    fn invalid_addresses_are_rejected() {
        let too_long = "f".repeat(65);
        for bad in ["", "0x", "0xzz", too_long.as_str()] {
            assert!(matches!(
                parse_address(bad),
                Err(HarnessError::InvalidAddress(_))
            ));
        }
    }

    #[test]
    fn canonical_form_is_prefixed_full_width_lower_case() {
        let canonical = canonical_address("0xA").unwrap();
        assert_eq!(canonical.len(), 66);
        assert!(canonical.starts_with("0x"));
        assert!(canonical.ends_with('a'));
        assert_eq!(canonical, canonical.to_lowercase());
    }

    #[test]
    fn store_derivation_is_deterministic_and_input_sensitive() {
        let a = primary_store_address("0x1", "0xa").unwrap();
        let b = primary_store_address("0x1", "0xa").unwrap();
        let c = primary_store_address("0x2", "0xa").unwrap();
        let d = primary_store_address("0x1", "0xb").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert!(a.starts_with("0x"));
        assert_eq!(a.len(), 66);
    }

    #[test]
    fn success_flag_is_read_from_the_result_body() {
        let ok = transaction_result_from_payload(json!({
            "Result": {"transaction_hash": "0xabc", "success": true}
        }));
        assert!(ok.succeeded);
        assert_eq!(ok.transaction_hash.as_deref(), Some("0xabc"));

        let failed = transaction_result_from_payload(json!({
            "Result": {"transaction_hash": "0xdef", "success": false}
        }));
        assert!(!failed.succeeded);
    }

    #[test]
    fn error_payload_is_a_failed_result_not_an_error() {
        let result = transaction_result_from_payload(json!({
            "Error": "Move abort in 0x1::demo: code 7"
        }));
        assert!(!result.succeeded);
        assert!(result.transaction_hash.is_none());
        assert!(result.raw.get("Error").is_some());
    }

    #[test]
    fn vm_status_is_the_fallback_success_signal() {
        let result = transaction_result_from_payload(json!({
            "Result": {"vm_status": "Executed successfully"}
        }));
        assert!(result.succeeded);
    }

    #[test]
    fn deployed_address_is_prefixed_regardless_of_backend_form() {
        for key in ["deployed_object_address", "object_address"] {
            let result = transaction_result_from_payload(json!({
                "Result": {"success": true, key: "cafe01"}
            }));
            assert_eq!(result.deployed_object_address.as_deref(), Some("0xcafe01"));
        }
    }

    #[test]
    fn balance_defaults_to_zero_when_the_store_is_absent() {
        assert_eq!(balance_from_store(None), 0);
        let store = json!({"type": "0x1::fungible_asset::FungibleStore", "data": {"balance": "250"}});
        assert_eq!(balance_from_store(Some(&store)), 250);
        let numeric = json!({"data": {"balance": 77}});
        assert_eq!(balance_from_store(Some(&numeric)), 77);
    }

    #[test]
    fn rest_and_session_events_share_one_shape() {
        let rest_tx = json!({
            "hash": "0xabc",
            "events": [
                {"guid": {"creation_number": "2"}, "sequence_number": "0",
                 "type": "0x1::coin::DepositEvent", "data": {"amount": "100"}}
            ]
        });
        let live = events_from_rest_transaction(&rest_tx).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("tx_1.json");
        std::fs::write(
            &log,
            serde_json::to_string(&rest_tx["events"]).unwrap(),
        )
        .unwrap();
        let simulated = events_from_session_log(&log).unwrap();

        assert_eq!(live, simulated);
        assert_eq!(live[0].event_type, "0x1::coin::DepositEvent");
        assert_eq!(live[0].data["amount"], "100");
    }

    #[test]
    fn missing_session_log_reads_as_no_events() {
        assert!(events_from_session_log(Path::new("/nonexistent/tx_9.json")).is_none());
    }
}
