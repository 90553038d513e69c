//! Public request/response types shared across modes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Transaction-shaping parameters applied uniformly to every
/// transaction-executing operation. Read-only operations ignore them.
#[derive(Debug, Clone, Default)]
pub struct TxOptions {
    /// Gas unit price in octas.
    pub gas_unit_price: Option<u64>,
    /// Maximum gas units the transaction may consume.
    pub max_gas: Option<u64>,
    /// Seconds until the transaction expires.
    pub expiration_secs: Option<u64>,
    /// Attach the emitted events to the result when the transaction succeeds.
    pub include_events: bool,
    /// Raw flags appended verbatim after everything else. Escape hatch,
    /// primarily useful for exercising the command builders themselves.
    pub extra_args: Vec<String>,
}

/// Options common to `publish`, `deploy-object` and `upgrade-object`.
#[derive(Debug, Clone, Default)]
pub struct PackageOptions {
    /// Named address bindings, rendered as `key=value` and comma-joined.
    pub named_addresses: Vec<(String, String)>,
    /// Included-artifacts policy string (e.g. `none`, `sparse`, `all`).
    pub included_artifacts: Option<String>,
    /// Split oversized packages across multiple transactions.
    pub chunked: bool,
}

/// Options for the compile phase of `run_script`.
#[derive(Debug, Clone, Default)]
pub struct ScriptOptions {
    pub named_addresses: Vec<(String, String)>,
    /// Extra flags for the compile invocation only.
    pub compile_args: Vec<String>,
}

/// One event emitted by a transaction, shape-equivalent across modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Fully qualified type tag, e.g. `0x1::coin::DepositEvent`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Opaque structured payload.
    pub data: Value,
}

/// Normalized outcome of a transaction-executing operation.
///
/// A transaction the engine reports as failed (an on-chain abort, say) is a
/// normal value with `succeeded == false`, not an error. The raw backend
/// payload is preserved for forward compatibility.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionResult {
    pub succeeded: bool,
    pub transaction_hash: Option<String>,
    /// Address the package was deployed to, `0x`-prefixed. Only populated by
    /// object deploy/upgrade operations whose backend reports one.
    pub deployed_object_address: Option<String>,
    /// Populated only when `include_events` was requested and the
    /// transaction succeeded; `None` also when the backend offers no event
    /// lookup (that is not an error).
    pub events: Option<Vec<Event>>,
    /// Verbatim engine payload.
    pub raw: Value,
}
