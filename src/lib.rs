//! Aptos Harness
//!
//! A synchronous harness that drives an external blockchain-transaction
//! engine (the `aptos` command-line program) through three operating modes
//! behind one uniform API:
//!
//! - **Local simulation**: an engine-managed, file-backed ledger starting
//!   from an empty state
//! - **Forked simulation**: a simulation session seeded from a real
//!   network's state as of a given version
//! - **Live**: execution against a real network, with real cost
//!
//! The harness orchestrates and observes; it implements no transaction
//! semantics, gas accounting, or consensus of its own. Heterogeneous
//! backend shapes (on-disk session queries vs. remote REST reads) are
//! reconciled into one result contract, and a released instance
//! deterministically refuses every further operation.
//!
//! ```ignore
//! use aptos_harness::{Harness, TxOptions, DEFAULT_PROFILE};
//!
//! let mut harness = Harness::new_local()?;
//! harness.fund_account(DEFAULT_PROFILE, 100_000_000)?;
//! let result = harness.run_function(
//!     DEFAULT_PROFILE,
//!     "0x1::aptos_account::transfer",
//!     &[],
//!     &["address:0x1".into(), "u64:100".into()],
//!     &TxOptions::default(),
//! )?;
//! assert!(result.succeeded);
//! harness.release();
//! ```

pub mod adapter;
pub mod command;
pub mod error;
pub mod harness;
pub mod invoker;
pub mod normalize;
pub mod output;
pub mod profile;
pub mod rest;
pub mod session;
pub mod types;

pub use error::{FaucetUnavailableReason, HarnessError, Result};
pub use harness::{Harness, DEFAULT_PROFILE};
pub use profile::Profile;
pub use session::{NetworkEndpoints, SessionOptions};
pub use types::{Event, PackageOptions, ScriptOptions, TransactionResult, TxOptions};
