//! Fundamental types for the velock lockup orchestrator.
//!
//! This crate defines the types shared across every other crate in the
//! workspace: yoctoNEAR amounts, nanosecond timestamps, account ids, balance
//! snapshots, and staking pool state.

pub mod account;
pub mod amount;
pub mod error;
pub mod snapshot;
pub mod staking;
pub mod time;

pub use account::AccountId;
pub use amount::YoctoNear;
pub use error::TypeError;
pub use snapshot::{BalanceSnapshot, DustReport};
pub use staking::{StakingPoolInfo, StakingStatus};
pub use time::TimestampNs;
