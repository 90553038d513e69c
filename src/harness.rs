//! The harness façade: session/profile lifecycle, transaction execution and
//! read-only queries behind one mode-independent surface.
//!
//! A `Harness` owns one ephemeral workspace directory. The active state is
//! modeled as `Option<ActiveState>`: `release()` takes it, so every
//! operation's first step is a state check that fails with `Released`
//! before any backend resource can be touched. Instances are synchronous
//! and not re-entrant; callers wanting parallelism create one instance per
//! concurrent unit of work.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

use crate::adapter::ModeAdapter;
use crate::command;
use crate::error::{FaucetUnavailableReason, HarnessError, Result};
use crate::invoker;
use crate::normalize;
use crate::output;
use crate::profile::{Profile, ProfileStore};
use crate::rest::{self, RestClient};
use crate::session::{resolve_network, FaucetAccess, SessionOptions};
use crate::types::{Event, PackageOptions, ScriptOptions, TransactionResult, TxOptions};

/// Profile created automatically by every factory.
pub const DEFAULT_PROFILE: &str = "default";

const FUNGIBLE_STORE_TYPE: &str = "0x1::fungible_asset::FungibleStore";
const TIMESTAMP_TYPE: &str = "0x1::timestamp::CurrentTimeMicroseconds";
const GAS_SCHEDULE_TYPE: &str = "0x1::gas_schedule::GasScheduleV2";
const FRAMEWORK_ADDRESS: &str = "0x1";

pub struct Harness {
    state: Option<ActiveState>,
}

struct ActiveState {
    workspace: TempDir,
    engine_bin: String,
    adapter: ModeAdapter,
    profiles: ProfileStore,
    /// Label recorded on profiles: `local`, the forked network, or the live
    /// network label.
    network_label: String,
    /// Counts transactions the simulation session has committed, used to
    /// locate the most recent transaction's on-disk event log.
    tx_counter: u64,
}

impl Harness {
    /// Isolated local simulation with an empty ledger.
    pub fn new_local() -> Result<Self> {
        Self::new_simulation(SessionOptions::default())
    }

    /// Simulation forked from a real network's state, optionally at a
    /// historical version.
    pub fn new_forked(network: &str, api_key: &str, network_version: Option<u64>) -> Result<Self> {
        Self::new_simulation(SessionOptions {
            network: Some(network.to_string()),
            api_key: Some(api_key.to_string()),
            network_version,
        })
    }

    /// Shared simulation entry point; validates the option combination
    /// before the engine is ever invoked.
    pub fn new_simulation(options: SessionOptions) -> Result<Self> {
        options.validate()?;
        let workspace = new_workspace()?;
        let engine_bin = invoker::engine_binary();
        let session_dir = workspace.path().join("session");
        let init = command::build_session_init_command(&session_dir, &options);
        let payload = invoker::run_engine(&engine_bin, &init, workspace.path())?;
        let reported = payload
            .get("Result")
            .and_then(|result| result.get("success"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !reported {
            return Err(HarnessError::SessionInit(payload.to_string()));
        }
        let network_label = options.network.clone().unwrap_or_else(|| "local".to_string());
        let profiles = ProfileStore::new(workspace.path());
        Self::finish_creation(ActiveState {
            workspace,
            engine_bin,
            adapter: ModeAdapter::Simulation { session_dir },
            profiles,
            network_label,
            tx_counter: 0,
        })
    }

    /// Live execution against a real network (label or custom endpoint URL).
    /// No simulation session is created.
    pub fn new_live(network: &str) -> Result<Self> {
        let endpoints = resolve_network(network);
        let workspace = new_workspace()?;
        let profiles = ProfileStore::new(workspace.path());
        let network_label = endpoints.label.clone();
        let rest = RestClient::new(&endpoints.rest_url);
        Self::finish_creation(ActiveState {
            workspace,
            engine_bin: invoker::engine_binary(),
            adapter: ModeAdapter::Live { endpoints, rest },
            profiles,
            network_label,
            tx_counter: 0,
        })
    }

    fn finish_creation(state: ActiveState) -> Result<Self> {
        let mut harness = Self { state: Some(state) };
        harness.init_profile(DEFAULT_PROFILE, None)?;
        Ok(harness)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Tear down the instance and remove its workspace. Filesystem errors
    /// are logged and swallowed so cleanup paths never cascade; repeated
    /// calls are no-ops.
    pub fn release(&mut self) {
        if let Some(state) = self.state.take() {
            let path = state.workspace.path().to_path_buf();
            tracing::debug!(path = %path.display(), "releasing harness workspace");
            if let Err(err) = state.workspace.close() {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "workspace removal failed during release"
                );
            }
        }
    }

    pub fn is_released(&self) -> bool {
        self.state.is_none()
    }

    /// The instance's exclusively owned workspace directory.
    pub fn workspace_path(&self) -> Result<&Path> {
        Ok(self.active()?.workspace.path())
    }

    // =========================================================================
    // Profiles and funding
    // =========================================================================

    /// Create a named signing identity; a fresh keypair is generated when no
    /// private key is supplied.
    pub fn init_profile(&mut self, name: &str, private_key: Option<&str>) -> Result<Profile> {
        let state = self.active()?;
        let endpoint = state.adapter.endpoints().map(|e| e.rest_url.clone());
        state
            .profiles
            .init_profile(name, private_key, &state.network_label, endpoint.as_deref())
    }

    /// Address of a stored profile, `0x`-prefixed.
    pub fn address_of(&self, profile: &str) -> Result<String> {
        let state = self.active()?;
        match state.profiles.get(profile)? {
            Some(profile) => Ok(profile.address),
            None => Err(HarnessError::UnknownProfile(profile.to_string())),
        }
    }

    /// Credit an account (profile name or raw address). Simulation modes
    /// credit the session ledger directly; live mode goes through the
    /// network faucet when one is available.
    pub fn fund_account(&mut self, account: &str, amount: u64) -> Result<()> {
        let state = self.active()?;
        let address = state.resolve_account(account)?;
        match &state.adapter {
            ModeAdapter::Simulation { session_dir } => {
                let argv = command::build_session_fund_command(session_dir, &address, amount);
                invoker::run_engine(&state.engine_bin, &argv, state.workspace.path())?;
                Ok(())
            }
            ModeAdapter::Live { endpoints, .. } => match &endpoints.faucet {
                FaucetAccess::Open(faucet_url) => rest::faucet_fund(faucet_url, &address, amount),
                FaucetAccess::Authenticated => Err(HarnessError::FaucetUnavailable(
                    FaucetUnavailableReason::RequiresAuthentication,
                )),
                FaucetAccess::None { custom: true } => Err(HarnessError::FaucetUnavailable(
                    FaucetUnavailableReason::CustomEndpointWithoutFaucet,
                )),
                FaucetAccess::None { custom: false } => Err(HarnessError::FaucetUnavailable(
                    FaucetUnavailableReason::NoFaucetForNetwork,
                )),
            },
        }
    }

    // =========================================================================
    // Transaction-executing operations
    // =========================================================================

    /// Execute an entry function.
    pub fn run_function(
        &mut self,
        sender: &str,
        function_id: &str,
        type_args: &[String],
        args: &[String],
        opts: &TxOptions,
    ) -> Result<TransactionResult> {
        let state = self.active_mut()?;
        let argv = state
            .adapter
            .run_function_command(sender, function_id, type_args, args, opts);
        state.execute_transaction(argv, opts)
    }

    /// Compile the containing package, locate the script artifact by
    /// convention, and execute it. A compile failure surfaces as-is; the
    /// execution phase is not attempted.
    pub fn run_script(
        &mut self,
        sender: &str,
        package_dir: &Path,
        script_name: &str,
        script: &ScriptOptions,
        opts: &TxOptions,
    ) -> Result<TransactionResult> {
        let state = self.active_mut()?;
        let compile =
            command::build_compile_command(package_dir, &script.named_addresses, &script.compile_args);
        invoker::run_engine(&state.engine_bin, &compile, state.workspace.path())?;
        let artifact = command::compiled_script_path(package_dir, script_name)?;
        let argv = state.adapter.run_script_command(sender, &artifact, opts);
        state.execute_transaction(argv, opts)
    }

    /// Publish a package at the sender's own address.
    pub fn publish_package(
        &mut self,
        sender: &str,
        package_dir: &Path,
        package: &PackageOptions,
        opts: &TxOptions,
    ) -> Result<TransactionResult> {
        let state = self.active_mut()?;
        let argv = state
            .adapter
            .publish_command(sender, package_dir, package, opts);
        state.execute_transaction(argv, opts)
    }

    /// Deploy a package to a fresh code object address.
    pub fn deploy_object(
        &mut self,
        sender: &str,
        address_name: &str,
        package_dir: &Path,
        package: &PackageOptions,
        opts: &TxOptions,
    ) -> Result<TransactionResult> {
        let state = self.active_mut()?;
        let argv = state
            .adapter
            .deploy_object_command(sender, address_name, package_dir, package, opts);
        state.execute_transaction(argv, opts)
    }

    /// Upgrade the package at an existing code object address.
    pub fn upgrade_object(
        &mut self,
        sender: &str,
        address_name: &str,
        object_address: &str,
        package_dir: &Path,
        package: &PackageOptions,
        opts: &TxOptions,
    ) -> Result<TransactionResult> {
        let state = self.active_mut()?;
        let argv = state.adapter.upgrade_object_command(
            sender,
            address_name,
            object_address,
            package_dir,
            package,
            opts,
        );
        state.execute_transaction(argv, opts)
    }

    // =========================================================================
    // Read-only queries
    // =========================================================================

    /// Call a read-only view function; returns the engine's result value.
    pub fn view(
        &self,
        function_id: &str,
        type_args: &[String],
        args: &[String],
    ) -> Result<Value> {
        let state = self.active()?;
        let argv = state.adapter.view_command(function_id, type_args, args);
        let payload = invoker::run_engine(&state.engine_bin, &argv, state.workspace.path())?;
        Ok(payload.get("Result").cloned().unwrap_or(payload))
    }

    /// Read one resource. A nonexistent resource or account is `Ok(None)`,
    /// never an error, in every mode.
    pub fn view_resource(&self, account: &str, resource_type: &str) -> Result<Option<Value>> {
        let state = self.active()?;
        let address = state.resolve_account(account)?;
        match &state.adapter {
            ModeAdapter::Simulation { session_dir } => {
                let argv =
                    command::build_session_resource_command(session_dir, &address, resource_type);
                let payload = invoker::run_engine(&state.engine_bin, &argv, state.workspace.path())?;
                Ok(non_null_result(payload))
            }
            ModeAdapter::Live { rest, .. } => rest.get_resource(&address, resource_type),
        }
    }

    /// Enumerate a resource group. Only the simulation backend can do this;
    /// live mode has no equivalent aggregate endpoint and callers must query
    /// individual resource types instead.
    pub fn view_resource_group(&self, account: &str, group_type: &str) -> Result<Option<Value>> {
        let state = self.active()?;
        let address = state.resolve_account(account)?;
        match &state.adapter {
            ModeAdapter::Simulation { session_dir } => {
                let argv = command::build_session_resource_group_command(
                    session_dir,
                    &address,
                    group_type,
                );
                let payload = invoker::run_engine(&state.engine_bin, &argv, state.workspace.path())?;
                Ok(non_null_result(payload))
            }
            ModeAdapter::Live { .. } => {
                Err(HarnessError::UnsupportedInLiveMode("resource-group view"))
            }
        }
    }

    /// Balance held in the owner's primary fungible store for the given
    /// asset metadata address; zero when the store does not exist.
    pub fn fungible_balance(&self, owner: &str, metadata: &str) -> Result<u64> {
        let state = self.active()?;
        let owner_addr = state.resolve_account(owner)?;
        let metadata_addr = normalize::canonical_address(metadata)?;
        let store = normalize::primary_store_address(&owner_addr, &metadata_addr)?;
        let resource = self.view_resource(&store, FUNGIBLE_STORE_TYPE)?;
        Ok(normalize::balance_from_store(resource.as_ref()))
    }

    /// Current chain time in microseconds (zero at an unstarted local
    /// session's genesis).
    pub fn chain_timestamp_usecs(&self) -> Result<u64> {
        let resource = self.view_resource(FRAMEWORK_ADDRESS, TIMESTAMP_TYPE)?;
        Ok(resource
            .as_ref()
            .and_then(|r| r.get("data"))
            .and_then(|data| data.get("microseconds"))
            .and_then(normalize::u64_from_value)
            .unwrap_or(0))
    }

    /// The on-chain gas schedule resource, when present.
    pub fn gas_schedule(&self) -> Result<Option<Value>> {
        self.view_resource(FRAMEWORK_ADDRESS, GAS_SCHEDULE_TYPE)
    }

    // =========================================================================
    // Guard
    // =========================================================================

    fn active(&self) -> Result<&ActiveState> {
        self.state.as_ref().ok_or(HarnessError::Released)
    }

    fn active_mut(&mut self) -> Result<&mut ActiveState> {
        self.state.as_mut().ok_or(HarnessError::Released)
    }
}

impl ActiveState {
    /// Map a profile name or raw address to a canonical address.
    fn resolve_account(&self, account: &str) -> Result<String> {
        let trimmed = account.trim();
        if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
            return normalize::canonical_address(trimmed);
        }
        if let Some(profile) = self.profiles.get(trimmed)? {
            return Ok(profile.address);
        }
        // A bare hex string with no matching profile reads as an address.
        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
            return normalize::canonical_address(trimmed);
        }
        Err(HarnessError::UnknownProfile(trimmed.to_string()))
    }

    /// Run one transaction-executing engine invocation and normalize the
    /// outcome. A non-zero exit whose stdout still carries a structured
    /// `Error` payload is a committed-but-failed transaction and becomes a
    /// result with `succeeded == false`.
    fn execute_transaction(
        &mut self,
        argv: Vec<String>,
        opts: &TxOptions,
    ) -> Result<TransactionResult> {
        let payload = match invoker::run_engine(&self.engine_bin, &argv, self.workspace.path()) {
            Ok(payload) => payload,
            Err(HarnessError::ProcessExit {
                code,
                stdout,
                stderr,
            }) => match output::extract_payload(&stdout) {
                Ok(payload) if payload.get("Error").is_some() => payload,
                _ => {
                    return Err(HarnessError::ProcessExit {
                        code,
                        stdout,
                        stderr,
                    })
                }
            },
            Err(other) => return Err(other),
        };
        if !self.adapter.is_live() {
            self.tx_counter += 1;
        }
        let mut result = normalize::transaction_result_from_payload(payload);
        if opts.include_events && result.succeeded {
            result.events = self.fetch_events(&result);
        }
        Ok(result)
    }

    /// Best-effort event lookup; any failure downgrades to "no events
    /// attached" rather than failing the overall operation.
    fn fetch_events(&self, result: &TransactionResult) -> Option<Vec<Event>> {
        match &self.adapter {
            ModeAdapter::Simulation { session_dir } => {
                let log = session_event_log(session_dir, self.tx_counter);
                let events = normalize::events_from_session_log(&log);
                if events.is_none() {
                    tracing::warn!(
                        path = %log.display(),
                        "no readable event log for transaction; returning without events"
                    );
                }
                events
            }
            ModeAdapter::Live { rest, .. } => {
                let hash = result.transaction_hash.as_deref()?;
                match rest.get_transaction(hash) {
                    Ok(transaction) => normalize::events_from_rest_transaction(&transaction),
                    Err(err) => {
                        tracing::warn!(
                            hash,
                            error = %err,
                            "event lookup failed; returning without events"
                        );
                        None
                    }
                }
            }
        }
    }
}

/// Unwrap a `{"Result": ...}` payload, treating a null result as absent.
fn non_null_result(payload: Value) -> Option<Value> {
    match payload.get("Result") {
        None | Some(Value::Null) => None,
        Some(value) => Some(value.clone()),
    }
}

/// Event log written by the simulation engine for the n-th committed
/// transaction of a session.
fn session_event_log(session_dir: &Path, counter: u64) -> PathBuf {
    session_dir.join("events").join(format!("tx_{counter}.json"))
}

fn new_workspace() -> Result<TempDir> {
    let workspace = tempfile::Builder::new()
        .prefix("aptos-harness-")
        .tempdir()?;
    tracing::debug!(path = %workspace.path().display(), "created harness workspace");
    Ok(workspace)
}
