//! Lockup/staking lifecycle core for velock.
//!
//! Drives the multi-step unlock/withdraw lifecycle of a NEAR lockup
//! contract and reconciles it against an optional delegated staking pool:
//! - balance and staking pool readers (per-query fault isolated)
//! - the public account registry reader (factory enumeration with paging,
//!   per-account lockup and pool detail)
//! - dust classification (display threshold vs the contract's bit-exact
//!   zero deletion check)
//! - the lifecycle controller (one signed call per action, settle delay,
//!   forced refresh, single in-flight gate)
//! - the cleanup orchestrator (minimal ordered action sequence that drives
//!   every balance to exact zero)
//! - a cancellable periodic poller

pub mod cleanup;
pub mod config;
pub mod constants;
pub mod controller;
pub mod dust;
pub mod error;
pub mod logging;
pub mod poller;
pub mod reader;
pub mod registry;
pub mod staking;

pub use cleanup::{plan_cleanup, CleanupAction};
pub use config::LockupConfig;
pub use controller::{LockupController, ReadModel};
pub use dust::{classify, dust_report, DustClass};
pub use error::LockupError;
pub use logging::{init_logging, LogFormat};
pub use poller::Poller;
pub use registry::{fetch_account_count, fetch_public_accounts, PublicAccount};
