//! Shared test fixtures: a stub engine implementing just enough of the
//! session contract (on-disk ledger, per-transaction event logs, the
//! `{"Result": ...}` / `{"Error": ...}` payload shapes) to exercise the
//! harness end to end without a real `aptos` binary.

use std::path::PathBuf;
use std::sync::OnceLock;

use aptos_harness::invoker::ENGINE_BIN_ENV;

static STUB_ENGINE: OnceLock<PathBuf> = OnceLock::new();

const STUB_SCRIPT: &str = r#"#!/usr/bin/env bash
# Stand-in engine for integration tests.
set -eu

cmd="${1:-}"; sub="${2:-}"
if [ $# -ge 2 ]; then shift 2; else shift $#; fi

session=""; account=""; amount=""; resource=""; function_id=""; package_dir=""

while [ $# -gt 0 ]; do
  case "$1" in
    --session-dir) session="${2:-}"; shift ;;
    --account) account="${2:-}"; shift ;;
    --amount) amount="${2:-}"; shift ;;
    --resource-type) resource="${2:-}"; shift ;;
    --function-id) function_id="${2:-}"; shift ;;
    --package-dir) package_dir="${2:-}"; shift ;;
  esac
  shift
done

ok() { printf '{\n  "Result": %s\n}\n' "$1"; }

next_txn() {
  n=0
  if [ -f "$session/.txn" ]; then n=$(cat "$session/.txn"); fi
  n=$((n + 1))
  echo "$n" > "$session/.txn"
  mkdir -p "$session/events"
  cat > "$session/events/tx_$n.json" <<'EOF'
[
  {
    "guid": { "creation_number": "2", "account_address": "0x1" },
    "sequence_number": "0",
    "type": "0x1::coin::DepositEvent",
    "data": { "amount": "100" }
  }
]
EOF
}

case "$cmd $sub" in
  "simulation init")
    mkdir -p "$session"
    ok '{ "success": true }'
    ;;
  "simulation fund")
    mkdir -p "$session/balances"
    ledger="$session/balances/$account"
    current=0
    if [ -f "$ledger" ]; then current=$(cat "$ledger"); fi
    echo $((current + amount)) > "$ledger"
    ok '{ "success": true }'
    ;;
  "simulation view-resource")
    ledger="$session/balances/$account"
    if [ "$resource" = "0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>" ] && [ -f "$ledger" ]; then
      ok "{ \"type\": \"$resource\", \"data\": { \"coin\": { \"value\": \"$(cat "$ledger")\" } } }"
    else
      ok 'null'
    fi
    ;;
  "simulation view-resource-group")
    ok '{ "0x1::object::ObjectCore": { "owner": "0x1" } }'
    ;;
  "move compile")
    name=$(sed -n 's/^name *= *"\(.*\)".*/\1/p' "$package_dir/Move.toml" | head -1)
    mkdir -p "$package_dir/build/$name/bytecode_scripts"
    : > "$package_dir/build/$name/bytecode_scripts/main.mv"
    ok '{ "success": true }'
    ;;
  "move run"|"move run-script"|"move publish"|"move deploy-object"|"move upgrade-object")
    if [ -n "$session" ]; then next_txn; fi
    if [ "$function_id" = "0x1::stub::abort_now" ]; then
      printf '{\n  "Error": "Simulation error: Move abort in 0x1::stub::abort_now"\n}\n'
      exit 1
    fi
    if [ "$cmd $sub" = "move deploy-object" ]; then
      ok '{ "transaction_hash": "0x11", "success": true, "object_address": "c0ffee" }'
    else
      echo "Executing transaction against local session"
      ok '{ "transaction_hash": "0x11", "success": true, "vm_status": "Executed successfully" }'
    fi
    ;;
  "move view")
    ok '[ "1" ]'
    ;;
  *)
    echo "stub engine: unknown command: $cmd $sub" >&2
    exit 2
    ;;
esac
"#;

/// Write the stub engine once and point `APTOS_HARNESS_BIN` at it.
pub fn install_stub_engine() {
    let path = STUB_ENGINE.get_or_init(|| {
        let dir = tempfile::Builder::new()
            .prefix("aptos-harness-stub-")
            .tempdir()
            .expect("stub engine dir");
        let path = dir.path().join("aptos-stub");
        std::fs::write(&path, STUB_SCRIPT).expect("write stub engine");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path).expect("stat stub engine").permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&path, perms).expect("chmod stub engine");
        }
        // The script must outlive every test in the binary.
        std::mem::forget(dir);
        path
    });
    std::env::set_var(ENGINE_BIN_ENV, path);
}
