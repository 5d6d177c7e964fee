//! Lifecycle controller for a single owner + lockup pair.
//!
//! Owns the decision of which action is currently valid. Every action is
//! exactly one signed contract call: client-side precondition check, submit
//! with the fixed gas budget and 1 yocto deposit, wait the settle delay
//! (finality lags the submission acknowledgment), then force a refresh.
//!
//! A single in-flight flag serializes mutating actions; a second action
//! started while one is running fails fast with [`LockupError::Busy`].
//! Reads are never blocked.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use velock_provider::{CallError, Provider, Signer, MAX_GAS, ONE_YOCTO_DEPOSIT};
use velock_types::{
    AccountId, BalanceSnapshot, DustReport, StakingPoolInfo, StakingStatus, TimestampNs,
    YoctoNear,
};

use crate::constants::{DEFAULT_SETTLE_DELAY, TRANSFER_SNAP_MARGIN};
use crate::dust::dust_report;
use crate::error::LockupError;
use crate::{reader, staking};

/// Everything the UI layer reads: the latest snapshot plus derived flags,
/// recomputed on every call rather than cached.
#[derive(Clone, Debug)]
pub struct ReadModel {
    pub snapshot: BalanceSnapshot,
    pub pool: StakingPoolInfo,
    pub status: StakingStatus,
    pub dust: DustReport,
    pub unlock_ready: bool,
}

struct SessionState {
    snapshot: BalanceSnapshot,
    pool: StakingPoolInfo,
}

pub struct LockupController {
    provider: Arc<dyn Provider>,
    signer: Arc<dyn Signer>,
    owner: AccountId,
    lockup_id: AccountId,
    state: RwLock<SessionState>,
    in_flight: AtomicBool,
    settle_delay: Duration,
}

impl LockupController {
    /// Resolve the owner's lockup account and take the initial snapshot.
    pub async fn connect(
        provider: Arc<dyn Provider>,
        signer: Arc<dyn Signer>,
        venear_contract: &AccountId,
    ) -> Result<Self, LockupError> {
        let owner = signer.account_id().clone();
        let lockup_id =
            reader::resolve_lockup_account_id(provider.as_ref(), venear_contract, &owner).await?;

        let initial = BalanceSnapshot::not_created(lockup_id.clone());
        let controller = Self {
            provider,
            signer,
            owner,
            lockup_id,
            state: RwLock::new(SessionState {
                snapshot: initial,
                pool: StakingPoolInfo::no_pool(),
            }),
            in_flight: AtomicBool::new(false),
            settle_delay: DEFAULT_SETTLE_DELAY,
        };
        controller.refresh().await?;
        Ok(controller)
    }

    /// Override the settle delay (tests use zero).
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    pub fn lockup_account_id(&self) -> &AccountId {
        &self.lockup_id
    }

    /// Whether a mutating action is currently in flight. The caller must
    /// treat this as a mutual-exclusion gate and disable action triggers
    /// while set.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub async fn snapshot(&self) -> BalanceSnapshot {
        self.state.read().await.snapshot.clone()
    }

    pub async fn staking_info(&self) -> StakingPoolInfo {
        self.state.read().await.pool.clone()
    }

    pub async fn read_model(&self) -> ReadModel {
        let state = self.state.read().await;
        ReadModel {
            snapshot: state.snapshot.clone(),
            pool: state.pool.clone(),
            status: state.pool.status(),
            dust: dust_report(&state.snapshot),
            unlock_ready: state.snapshot.is_unlock_ready(TimestampNs::now()),
        }
    }

    /// Re-poll the lockup and pool and replace the cached state.
    ///
    /// If the lockup does not exist the pool fetch is skipped — there is
    /// nothing to delegate from.
    pub async fn refresh(&self) -> Result<(), LockupError> {
        let snapshot = reader::fetch_snapshot(self.provider.as_ref(), &self.lockup_id).await?;
        let pool = if snapshot.lockup_exists {
            staking::fetch_staking_pool_info(self.provider.as_ref(), &self.lockup_id).await?
        } else {
            StakingPoolInfo::no_pool()
        };

        let mut state = self.state.write().await;
        state.snapshot = snapshot;
        state.pool = pool;
        Ok(())
    }

    // ── Lifecycle actions ───────────────────────────────────────────────

    /// Start the unlock timer for the entire locked balance
    /// (`amount: null` — the canonical form).
    pub async fn begin_unlock(&self) -> Result<(), LockupError> {
        let _guard = self.begin_action()?;
        self.begin_unlock_inner(None).await
    }

    /// Opt-in partial variant.
    pub async fn begin_unlock_partial(&self, amount: YoctoNear) -> Result<(), LockupError> {
        let _guard = self.begin_action()?;
        self.begin_unlock_inner(Some(amount)).await
    }

    /// Complete an elapsed unlock for the entire pending balance.
    ///
    /// Deliberately not blocked by outstanding staking pool balances: pool
    /// withdrawal is a logically independent, parallel pipeline and the
    /// user must be able to finish the unlock timer regardless.
    pub async fn end_unlock(&self) -> Result<(), LockupError> {
        let _guard = self.begin_action()?;
        self.end_unlock_inner(None).await
    }

    /// Opt-in partial variant.
    pub async fn end_unlock_partial(&self, amount: YoctoNear) -> Result<(), LockupError> {
        let _guard = self.begin_action()?;
        self.end_unlock_inner(Some(amount)).await
    }

    /// Transfer liquid balance out of the lockup. The recipient defaults to
    /// the owner.
    pub async fn transfer(
        &self,
        amount: YoctoNear,
        receiver: Option<&AccountId>,
    ) -> Result<(), LockupError> {
        let _guard = self.begin_action()?;
        self.transfer_inner(Some(amount), receiver).await
    }

    /// Transfer the entire liquid balance, dust included: the amount is the
    /// exact on-chain balance fetched immediately before submission.
    pub async fn transfer_all(&self, receiver: Option<&AccountId>) -> Result<(), LockupError> {
        let _guard = self.begin_action()?;
        self.transfer_inner(None, receiver).await
    }

    /// Unstake everything from the configured staking pool. The funds
    /// become withdrawable only after the pool's unbonding epochs.
    pub async fn unstake_all(&self) -> Result<(), LockupError> {
        let _guard = self.begin_action()?;
        self.unstake_all_inner().await
    }

    /// Withdraw all unbonded funds from the staking pool back into the
    /// lockup's liquid balance.
    pub async fn withdraw_from_staking_pool(&self) -> Result<(), LockupError> {
        let _guard = self.begin_action()?;
        self.withdraw_inner().await
    }

    /// Irreversibly delete the lockup contract and return the deployment
    /// deposit to the owner. The contract enforces bit-exact zero balances;
    /// this is validated client-side first so no transaction is wasted.
    pub async fn delete_lockup(&self) -> Result<(), LockupError> {
        let _guard = self.begin_action()?;

        let (snapshot, pool) = {
            let state = self.state.read().await;
            (state.snapshot.clone(), state.pool.clone())
        };
        if !snapshot.lockup_exists {
            return Err(LockupError::LockupNotCreated);
        }
        for (field, amount) in [
            ("locked", snapshot.locked),
            ("pending", snapshot.pending),
            ("liquid", snapshot.liquid),
            ("staked", pool.staked),
            ("unstaked", pool.unstaked),
        ] {
            if !amount.is_zero() {
                return Err(LockupError::NonZeroBalance { field, amount });
            }
        }

        self.submit("delete_lockup", serde_json::json!({})).await?;

        // The account no longer exists; re-polling it would only race the
        // tombstone. Replace the cache directly.
        tokio::time::sleep(self.settle_delay).await;
        let mut state = self.state.write().await;
        state.snapshot = BalanceSnapshot::not_created(self.lockup_id.clone());
        state.pool = StakingPoolInfo::no_pool();
        Ok(())
    }

    // ── Inner actions (in-flight gate already held) ─────────────────────

    pub(crate) async fn begin_unlock_inner(
        &self,
        amount: Option<YoctoNear>,
    ) -> Result<(), LockupError> {
        let snapshot = self.snapshot().await;
        if !snapshot.lockup_exists {
            return Err(LockupError::LockupNotCreated);
        }
        if !snapshot.pending.is_zero() {
            return Err(LockupError::UnlockAlreadyPending);
        }
        if snapshot.locked.is_zero() {
            return Err(LockupError::NothingToUnlock);
        }
        if let Some(amount) = amount {
            if amount.is_zero() {
                return Err(LockupError::InvalidAmount);
            }
            if amount > snapshot.locked {
                return Err(LockupError::ExceedsBalance {
                    requested: amount,
                    available: snapshot.locked,
                });
            }
        }

        self.submit("begin_unlock_near", amount_args(amount)).await?;
        self.settle_and_refresh().await
    }

    pub(crate) async fn end_unlock_inner(
        &self,
        amount: Option<YoctoNear>,
    ) -> Result<(), LockupError> {
        let snapshot = self.snapshot().await;
        if !snapshot.lockup_exists {
            return Err(LockupError::LockupNotCreated);
        }
        if snapshot.pending.is_zero() {
            return Err(LockupError::NothingPending);
        }
        let now = TimestampNs::now();
        match snapshot.unlock_timestamp {
            Some(ts) if ts.is_reached(now) => {}
            Some(ts) => {
                return Err(LockupError::UnlockNotReady {
                    remaining: ts.format_remaining(now),
                })
            }
            None => return Err(LockupError::NothingPending),
        }
        if let Some(amount) = amount {
            if amount.is_zero() {
                return Err(LockupError::InvalidAmount);
            }
            if amount > snapshot.pending {
                return Err(LockupError::ExceedsBalance {
                    requested: amount,
                    available: snapshot.pending,
                });
            }
        }

        self.submit("end_unlock_near", amount_args(amount)).await?;
        self.settle_and_refresh().await
    }

    pub(crate) async fn transfer_inner(
        &self,
        amount: Option<YoctoNear>,
        receiver: Option<&AccountId>,
    ) -> Result<(), LockupError> {
        if !self.snapshot().await.lockup_exists {
            return Err(LockupError::LockupNotCreated);
        }

        // Always settle against the exact on-chain balance fetched now, not
        // a cached snapshot — interest and rent accrue concurrently.
        let actual = reader::fetch_exact_liquid(self.provider.as_ref(), &self.lockup_id).await?;

        let requested = match amount {
            None => actual,
            // A request within the snap margin of the fresh balance means
            // "everything"; honoring it literally would strand dust.
            Some(a) if a.abs_diff(actual) <= TRANSFER_SNAP_MARGIN => actual,
            Some(a) => a,
        };

        if requested.is_zero() {
            return Err(LockupError::InvalidAmount);
        }
        if requested > actual {
            return Err(LockupError::ExceedsBalance {
                requested,
                available: actual,
            });
        }

        let recipient = receiver.unwrap_or(&self.owner);
        self.submit(
            "transfer",
            serde_json::json!({
                "amount": requested,
                "receiver_id": recipient.as_str(),
            }),
        )
        .await?;
        self.settle_and_refresh().await
    }

    pub(crate) async fn unstake_all_inner(&self) -> Result<(), LockupError> {
        let pool = self.staking_info().await;
        if pool.pool_id.is_none() {
            return Err(LockupError::NoStakingPool);
        }
        if pool.staked.is_zero() {
            return Err(LockupError::NothingStaked);
        }
        if pool.is_unstaking {
            return Err(LockupError::PoolBusy);
        }

        self.submit("unstake_all", serde_json::json!({})).await?;
        self.settle_and_refresh().await
    }

    pub(crate) async fn withdraw_inner(&self) -> Result<(), LockupError> {
        let pool = self.staking_info().await;
        if pool.pool_id.is_none() {
            return Err(LockupError::NoStakingPool);
        }
        if pool.unstaked.is_zero() || !pool.can_withdraw {
            return Err(LockupError::NotWithdrawable);
        }

        self.submit("withdraw_all_from_staking_pool", serde_json::json!({}))
            .await?;
        self.settle_and_refresh().await
    }

    // ── Plumbing ────────────────────────────────────────────────────────

    pub(crate) fn begin_action(&self) -> Result<FlightGuard<'_>, LockupError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| LockupError::Busy)?;
        Ok(FlightGuard(&self.in_flight))
    }

    async fn submit(&self, method: &str, args: serde_json::Value) -> Result<(), LockupError> {
        tracing::info!(method, lockup = %self.lockup_id, "submitting contract call");
        self.signer
            .call(&self.lockup_id, method, args, MAX_GAS, ONE_YOCTO_DEPOSIT)
            .await
            .map_err(|e| match e {
                CallError::Execution(raw) => {
                    LockupError::Contract(rewrite_contract_panic(&raw))
                }
                CallError::Transport(msg) | CallError::Rejected(msg) => {
                    LockupError::Submission(msg)
                }
            })
    }

    pub(crate) async fn settle_and_refresh(&self) -> Result<(), LockupError> {
        tokio::time::sleep(self.settle_delay).await;
        self.refresh().await
    }
}

/// Clears the in-flight flag when the action completes or errors.
pub(crate) struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn amount_args(amount: Option<YoctoNear>) -> serde_json::Value {
    // `amount: null` is the contract's "entire balance" sentinel and must
    // be sent explicitly, not omitted.
    match amount {
        Some(a) => serde_json::json!({ "amount": a }),
        None => serde_json::json!({ "amount": null }),
    }
}

/// Rewrite known contract panic texts into actionable messages. The raw
/// panics leak contract internals; unrecognized ones pass through verbatim.
fn rewrite_contract_panic(raw: &str) -> String {
    let lower = raw.to_lowercase();
    if lower.contains("timestamp") || lower.contains("not ready") {
        "Unlock period not yet complete. Wait until the timer reaches zero.".to_string()
    } else if lower.contains("non-zero") || (lower.contains("balance") && lower.contains("zero"))
    {
        "The lockup still holds funds. Every balance must be exactly zero (dust included) \
         before the contract can be deleted."
            .to_string()
    } else if lower.contains("busy") || lower.contains("in progress") {
        "The staking pool is still processing a previous action. Retry once it settles."
            .to_string()
    } else {
        raw.to_string()
    }
}
