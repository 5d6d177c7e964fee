//! Balance snapshot of a single owner's lockup contract.

use serde::{Deserialize, Serialize};

use crate::account::AccountId;
use crate::amount::YoctoNear;
use crate::time::TimestampNs;

/// One poll's view of a lockup contract, replaced wholesale on every refresh
/// (never mutated in place).
///
/// Invariants the contract maintains and readers rely on:
/// - `account_balance >= liquid`
/// - `locked == 0` while an unlock is pending
/// - `pending == 0` when no unlock is in flight
/// - `lockup_exists == false` implies every balance is zero
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    /// Tokens locked for governance; unlock not started.
    pub locked: YoctoNear,
    /// Tokens with an unlock timer running.
    pub pending: YoctoNear,
    /// Unlocked, transferable tokens held by the lockup.
    pub liquid: YoctoNear,
    /// Total native balance of the lockup account.
    pub account_balance: YoctoNear,
    /// When the pending unlock completes; `None` when no unlock is in flight.
    pub unlock_timestamp: Option<TimestampNs>,
    /// The deterministic lockup account derived from the owner id.
    pub lockup_account_id: AccountId,
    /// The lockup contract may not have been deployed yet. Not an error.
    pub lockup_exists: bool,
}

impl BalanceSnapshot {
    /// A snapshot for an owner whose lockup contract does not exist.
    pub fn not_created(lockup_account_id: AccountId) -> Self {
        Self {
            locked: YoctoNear::ZERO,
            pending: YoctoNear::ZERO,
            liquid: YoctoNear::ZERO,
            account_balance: YoctoNear::ZERO,
            unlock_timestamp: None,
            lockup_account_id,
            lockup_exists: false,
        }
    }

    /// Whether the pending unlock timer has elapsed.
    pub fn is_unlock_ready(&self, now: TimestampNs) -> bool {
        match self.unlock_timestamp {
            Some(ts) => ts.is_reached(now),
            None => false,
        }
    }

    /// All lockup-side balances are bit-exact zero (the contract's own
    /// deletion precondition; pool balances are checked separately).
    pub fn all_zero(&self) -> bool {
        self.locked.is_zero() && self.pending.is_zero() && self.liquid.is_zero()
    }
}

/// Per-field dust flags for one snapshot. "Dust" is a positive balance below
/// the display threshold — distinct from the bit-exact zero the contract
/// requires before deletion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DustReport {
    pub has_locked_dust: bool,
    pub has_pending_dust: bool,
    pub has_liquid_dust: bool,
}

impl DustReport {
    pub fn any(&self) -> bool {
        self.has_locked_dust || self.has_pending_dust || self.has_liquid_dust
    }
}
