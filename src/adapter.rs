//! Mode adapter: per-mode command construction and result routing.
//!
//! One adapter is selected at instance creation and owns every rule that
//! differs between simulation and live execution, instead of scattering
//! `if live` branches through each operation. Simulation modes pass an
//! explicit session-path argument and never need interactive confirmation;
//! live mode omits the session path and passes a non-interactive
//! confirmation flag instead.

use std::path::{Path, PathBuf};

use crate::command::push_named_addresses;
use crate::rest::RestClient;
use crate::session::NetworkEndpoints;
use crate::types::{PackageOptions, TxOptions};

pub enum ModeAdapter {
    /// Local or forked simulation; state is addressed by the on-disk
    /// session directory.
    Simulation { session_dir: PathBuf },
    /// Real network; reads go through the REST endpoint directly.
    Live {
        endpoints: NetworkEndpoints,
        rest: RestClient,
    },
}

impl ModeAdapter {
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live { .. })
    }

    pub fn session_dir(&self) -> Option<&Path> {
        match self {
            Self::Simulation { session_dir } => Some(session_dir),
            Self::Live { .. } => None,
        }
    }

    pub fn rest(&self) -> Option<&RestClient> {
        match self {
            Self::Simulation { .. } => None,
            Self::Live { rest, .. } => Some(rest),
        }
    }

    pub fn endpoints(&self) -> Option<&NetworkEndpoints> {
        match self {
            Self::Simulation { .. } => None,
            Self::Live { endpoints, .. } => Some(endpoints),
        }
    }

    /// `move run` for an entry function.
    pub fn run_function_command(
        &self,
        sender: &str,
        function_id: &str,
        type_args: &[String],
        args: &[String],
        opts: &TxOptions,
    ) -> Vec<String> {
        let mut argv = vec![
            "move".to_string(),
            "run".to_string(),
            "--function-id".to_string(),
            function_id.to_string(),
        ];
        push_values(&mut argv, "--type-args", type_args);
        push_values(&mut argv, "--args", args);
        push_sender(&mut argv, sender);
        self.finish_transaction(&mut argv, opts);
        argv
    }

    /// `move run-script` for an already-compiled script artifact.
    pub fn run_script_command(
        &self,
        sender: &str,
        compiled_script: &Path,
        opts: &TxOptions,
    ) -> Vec<String> {
        let mut argv = vec![
            "move".to_string(),
            "run-script".to_string(),
            "--compiled-script-path".to_string(),
            compiled_script.display().to_string(),
        ];
        push_sender(&mut argv, sender);
        self.finish_transaction(&mut argv, opts);
        argv
    }

    /// `move publish` at the sender's own address.
    pub fn publish_command(
        &self,
        sender: &str,
        package_dir: &Path,
        package: &PackageOptions,
        opts: &TxOptions,
    ) -> Vec<String> {
        let mut argv = vec![
            "move".to_string(),
            "publish".to_string(),
            "--package-dir".to_string(),
            package_dir.display().to_string(),
        ];
        push_package_flags(&mut argv, package);
        push_sender(&mut argv, sender);
        self.finish_transaction(&mut argv, opts);
        argv
    }

    /// `move deploy-object`: publish to a fresh code object address.
    pub fn deploy_object_command(
        &self,
        sender: &str,
        address_name: &str,
        package_dir: &Path,
        package: &PackageOptions,
        opts: &TxOptions,
    ) -> Vec<String> {
        let mut argv = vec![
            "move".to_string(),
            "deploy-object".to_string(),
            "--address-name".to_string(),
            address_name.to_string(),
            "--package-dir".to_string(),
            package_dir.display().to_string(),
        ];
        push_package_flags(&mut argv, package);
        push_sender(&mut argv, sender);
        self.finish_transaction(&mut argv, opts);
        argv
    }

    /// `move upgrade-object`: upgrade the package at an existing code object.
    pub fn upgrade_object_command(
        &self,
        sender: &str,
        address_name: &str,
        object_address: &str,
        package_dir: &Path,
        package: &PackageOptions,
        opts: &TxOptions,
    ) -> Vec<String> {
        let mut argv = vec![
            "move".to_string(),
            "upgrade-object".to_string(),
            "--address-name".to_string(),
            address_name.to_string(),
            "--object-address".to_string(),
            object_address.to_string(),
            "--package-dir".to_string(),
            package_dir.display().to_string(),
        ];
        push_package_flags(&mut argv, package);
        push_sender(&mut argv, sender);
        self.finish_transaction(&mut argv, opts);
        argv
    }

    /// `move view`: read-only function call, no transaction shaping.
    pub fn view_command(
        &self,
        function_id: &str,
        type_args: &[String],
        args: &[String],
    ) -> Vec<String> {
        let mut argv = vec![
            "move".to_string(),
            "view".to_string(),
            "--function-id".to_string(),
            function_id.to_string(),
        ];
        push_values(&mut argv, "--type-args", type_args);
        push_values(&mut argv, "--args", args);
        match self {
            Self::Simulation { session_dir } => {
                argv.push("--session-dir".to_string());
                argv.push(session_dir.display().to_string());
            }
            Self::Live { endpoints, .. } => {
                argv.push("--url".to_string());
                argv.push(endpoints.rest_url.clone());
            }
        }
        argv
    }

    /// Transaction tail: gas trio, mode-specific arguments, then raw
    /// passthrough flags last.
    fn finish_transaction(&self, argv: &mut Vec<String>, opts: &TxOptions) {
        if let Some(price) = opts.gas_unit_price {
            argv.push("--gas-unit-price".to_string());
            argv.push(price.to_string());
        }
        if let Some(max_gas) = opts.max_gas {
            argv.push("--max-gas".to_string());
            argv.push(max_gas.to_string());
        }
        if let Some(expiration) = opts.expiration_secs {
            argv.push("--expiration-secs".to_string());
            argv.push(expiration.to_string());
        }
        match self {
            Self::Simulation { session_dir } => {
                argv.push("--session-dir".to_string());
                argv.push(session_dir.display().to_string());
            }
            Self::Live { .. } => {
                argv.push("--assume-yes".to_string());
            }
        }
        argv.extend(opts.extra_args.iter().cloned());
    }
}

fn push_values(argv: &mut Vec<String>, flag: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    argv.push(flag.to_string());
    argv.extend(values.iter().cloned());
}

/// A raw `0x` address becomes `--sender-account`; anything else is a
/// profile name.
fn push_sender(argv: &mut Vec<String>, sender: &str) {
    if sender.starts_with("0x") || sender.starts_with("0X") {
        argv.push("--sender-account".to_string());
        argv.push(sender.to_string());
    } else {
        argv.push("--profile".to_string());
        argv.push(sender.to_string());
    }
}

fn push_package_flags(argv: &mut Vec<String>, package: &PackageOptions) {
    push_named_addresses(argv, &package.named_addresses);
    if let Some(policy) = package.included_artifacts.as_deref() {
        argv.push("--included-artifacts".to_string());
        argv.push(policy.to_string());
    }
    if package.chunked {
        argv.push("--chunked-publish".to_string());
    }
}
