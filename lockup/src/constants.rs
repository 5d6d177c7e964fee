//! Tuning constants for the lifecycle controller.

use std::time::Duration;

use velock_types::YoctoNear;

/// Display dust threshold: 10^20 yocto = 0.0001 NEAR. Balances below this
/// are hidden from the unlock/transfer UI. Never used for the deletion
/// gate, which the contract enforces at bit-exact zero.
pub const DUST_THRESHOLD: YoctoNear = YoctoNear::new(100_000_000_000_000_000_000);

/// Transfer requests within this margin of the fresh on-chain liquid
/// balance snap to the exact balance, so rounding in the caller cannot
/// strand 1-unit dust.
pub const TRANSFER_SNAP_MARGIN: YoctoNear = YoctoNear::new(1_000);

/// Wait after a submission acknowledgment before the forced re-poll;
/// chain finality lags the acknowledgment.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(3);

/// Periodic background refresh interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
