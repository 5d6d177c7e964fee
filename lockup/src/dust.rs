//! Dust classification.
//!
//! Two thresholds exist deliberately and are never interchangeable: the
//! *display* threshold ([`crate::constants::DUST_THRESHOLD`]) hides trivial
//! amounts from the UI, while the *deletion* threshold is bit-exact zero —
//! the contract's self-destruct check tolerates nothing. Substituting one
//! for the other makes deletion attempts fail against the contract.

use velock_types::{BalanceSnapshot, DustReport, YoctoNear};

use crate::constants::DUST_THRESHOLD;

/// Three-way classification of a single balance.
///
/// Exactly one flag is set for any amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DustClass {
    /// Bit-exact zero — the only state the deletion precondition accepts.
    pub is_zero: bool,
    /// Positive but below the threshold.
    pub is_dust: bool,
    /// At or above the threshold.
    pub is_significant: bool,
}

/// Classify `amount` against `threshold`.
pub fn classify(amount: YoctoNear, threshold: YoctoNear) -> DustClass {
    DustClass {
        is_zero: amount.is_zero(),
        is_dust: !amount.is_zero() && amount < threshold,
        is_significant: amount >= threshold && !amount.is_zero(),
    }
}

/// Per-field dust flags for a snapshot, at the display threshold.
pub fn dust_report(snapshot: &BalanceSnapshot) -> DustReport {
    DustReport {
        has_locked_dust: classify(snapshot.locked, DUST_THRESHOLD).is_dust,
        has_pending_dust: classify(snapshot.pending, DUST_THRESHOLD).is_dust,
        has_liquid_dust: classify(snapshot.liquid, DUST_THRESHOLD).is_dust,
    }
}
