//! Reconciliation/cleanup orchestrator.
//!
//! Dust can accumulate across locked, pending, and liquid simultaneously;
//! this module computes the minimal ordered action sequence that drives
//! every balance to exact zero, so the user does not have to discover and
//! trigger each step manually.

use velock_types::{BalanceSnapshot, TimestampNs};

use crate::controller::LockupController;
use crate::error::LockupError;

/// Re-planning bound for one cleanup run. Each pass shrinks the set of
/// nonzero buckets, so real chains converge in two or three.
const MAX_CLEANUP_PASSES: u32 = 8;

/// One step of a cleanup plan. Ordering matters: each step's postcondition
/// is the next step's precondition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CleanupAction {
    /// Unlock the entire locked balance (`amount: null`).
    BeginUnlock,
    /// Complete the elapsed unlock for the entire pending balance.
    EndUnlock,
    /// Transfer the entire liquid balance, dust included — the exact
    /// on-chain amount is fetched immediately before submission.
    TransferAll,
}

/// Compute the ordered action list for a snapshot. Pure; recomputed from
/// the latest snapshot, never cached.
pub fn plan_cleanup(snapshot: &BalanceSnapshot, now: TimestampNs) -> Vec<CleanupAction> {
    let mut plan = Vec::new();
    if !snapshot.lockup_exists {
        return plan;
    }
    if !snapshot.locked.is_zero() {
        plan.push(CleanupAction::BeginUnlock);
    }
    if !snapshot.pending.is_zero() && snapshot.is_unlock_ready(now) {
        plan.push(CleanupAction::EndUnlock);
    }
    if !snapshot.liquid.is_zero() {
        plan.push(CleanupAction::TransferAll);
    }
    plan
}

impl LockupController {
    /// Plan and execute a cleanup of all residual balances.
    ///
    /// Steps run strictly sequentially — never in parallel — with the
    /// settle delay and a full re-poll between them. The first failure
    /// aborts the remaining sequence and surfaces that step's error.
    ///
    /// After a pass completes, the plan is recomputed from the fresh
    /// snapshot: a begin-unlock step creates new pending balance that only
    /// a later pass can complete. Execution stops when a pass plans
    /// nothing more (all clean, or the remaining pending is still inside
    /// its unlock window). Returns every executed step in order.
    pub async fn run_cleanup(&self) -> Result<Vec<CleanupAction>, LockupError> {
        let _guard = self.begin_action()?;
        let mut executed = Vec::new();

        for pass in 0..MAX_CLEANUP_PASSES {
            let snapshot = self.snapshot().await;
            let plan = plan_cleanup(&snapshot, TimestampNs::now());
            if plan.is_empty() {
                break;
            }
            tracing::info!(pass, steps = plan.len(), "executing cleanup plan");

            for action in &plan {
                tracing::info!(?action, "cleanup step");
                match action {
                    CleanupAction::BeginUnlock => self.begin_unlock_inner(None).await?,
                    CleanupAction::EndUnlock => self.end_unlock_inner(None).await?,
                    CleanupAction::TransferAll => self.transfer_inner(None, None).await?,
                }
            }
            executed.extend_from_slice(&plan);
        }

        // Final re-poll so the caller observes the settled end state.
        self.refresh().await?;
        Ok(executed)
    }
}
