//! End-to-end lifecycle tests against an in-memory chain.
//!
//! The mock implements both seams (`Provider` for view calls, `Signer` for
//! mutating calls) over one shared state, applying the lockup contract's
//! state transitions so the controller can be driven through the full
//! begin-unlock → end-unlock → transfer → delete pipeline and the
//! unstake → withdraw sub-pipeline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use velock_lockup::{CleanupAction, LockupController, LockupError, Poller};
use velock_provider::{CallError, Provider, ProviderError, Signer};
use velock_types::{AccountId, StakingStatus, TimestampNs, YoctoNear};

const VENEAR: &str = "v.voteagora.near";
const OWNER: &str = "alice.near";
const LOCKUP: &str = "alice.lockup.near";
const POOL: &str = "validator.poolv1.near";

#[derive(Clone, Default)]
struct ChainState {
    lockup_exists: bool,
    locked: u128,
    pending: u128,
    liquid: u128,
    unlock_timestamp: u64,
    /// Applied when begin_unlock_near runs; 0 models a test chain with no
    /// unlock window.
    unlock_duration_ns: u64,
    pool_id: Option<String>,
    staked: u128,
    unstaked: u128,
    unstaked_available: bool,
    /// Scripted panic: (method, panic text).
    panic_on: Option<(String, String)>,
}

struct MockChain {
    state: Mutex<ChainState>,
    calls: Mutex<Vec<(String, serde_json::Value)>>,
    owner: AccountId,
    in_call: AtomicBool,
    gate: Notify,
    gated_method: Mutex<Option<String>>,
    in_view: AtomicBool,
    view_gate: Notify,
    gated_view: Mutex<Option<String>>,
}

impl MockChain {
    fn new(state: ChainState) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(state),
            calls: Mutex::new(Vec::new()),
            owner: AccountId::new(OWNER).unwrap(),
            in_call: AtomicBool::new(false),
            gate: Notify::new(),
            gated_method: Mutex::new(None),
            in_view: AtomicBool::new(false),
            view_gate: Notify::new(),
            gated_view: Mutex::new(None),
        })
    }

    fn calls(&self) -> Vec<(String, serde_json::Value)> {
        self.calls.lock().unwrap().clone()
    }

    fn call_methods(&self) -> Vec<String> {
        self.calls().into_iter().map(|(m, _)| m).collect()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut ChainState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    /// Make the next call of `method` block until [`release`] is invoked.
    fn hold_calls_to(&self, method: &str) {
        *self.gated_method.lock().unwrap() = Some(method.to_string());
    }

    fn release(&self) {
        self.gate.notify_one();
    }

    /// Make the next view call of `method` block until [`release_view`].
    fn hold_views_of(&self, method: &str) {
        *self.gated_view.lock().unwrap() = Some(method.to_string());
    }

    fn release_view(&self) {
        self.view_gate.notify_one();
    }

    fn string_json(n: u128) -> serde_json::Value {
        serde_json::json!(n.to_string())
    }
}

#[async_trait]
impl Provider for MockChain {
    async fn view_call(
        &self,
        contract: &AccountId,
        method: &str,
        args: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        let gated = self.gated_view.lock().unwrap().clone();
        if gated.as_deref() == Some(method) {
            self.in_view.store(true, Ordering::SeqCst);
            self.view_gate.notified().await;
        }

        let state = self.state.lock().unwrap().clone();
        let value = match (contract.as_str(), method) {
            (VENEAR, "get_lockup_account_id") => serde_json::json!(LOCKUP),
            (LOCKUP, "get_venear_locked_balance") => Self::string_json(state.locked),
            (LOCKUP, "get_venear_pending_balance") => Self::string_json(state.pending),
            (LOCKUP, "get_venear_unlock_timestamp") => {
                if state.unlock_timestamp == 0 {
                    serde_json::Value::Null
                } else {
                    serde_json::json!(state.unlock_timestamp.to_string())
                }
            }
            (LOCKUP, "get_liquid_owners_balance") => Self::string_json(state.liquid),
            (LOCKUP, "get_account_balance") => {
                Self::string_json(state.locked + state.pending + state.liquid)
            }
            (LOCKUP, "get_staking_pool_account_id") => match &state.pool_id {
                Some(id) => serde_json::json!(id),
                None => serde_json::Value::Null,
            },
            (POOL, "get_account_staked_balance") => Self::string_json(state.staked),
            (POOL, "get_account_unstaked_balance") => Self::string_json(state.unstaked),
            (POOL, "is_account_unstaked_balance_available") => {
                serde_json::json!(state.unstaked_available)
            }
            other => {
                return Err(ProviderError::Rpc {
                    endpoint: "mock".into(),
                    message: format!("unexpected view call {other:?} with args {args}"),
                })
            }
        };
        Ok(value)
    }

    async fn account_exists(&self, account: &AccountId) -> Result<bool, ProviderError> {
        if account.as_str() == LOCKUP {
            Ok(self.state.lock().unwrap().lockup_exists)
        } else {
            Ok(true)
        }
    }
}

#[async_trait]
impl Signer for MockChain {
    fn account_id(&self) -> &AccountId {
        &self.owner
    }

    async fn call(
        &self,
        receiver: &AccountId,
        method: &str,
        args: serde_json::Value,
        _gas: u64,
        deposit: YoctoNear,
    ) -> Result<(), CallError> {
        assert_eq!(receiver.as_str(), LOCKUP, "all calls target the lockup");
        assert_eq!(deposit, YoctoNear::new(1), "1 yocto confirmation deposit");
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), args.clone()));

        let gated = self.gated_method.lock().unwrap().clone();
        if gated.as_deref() == Some(method) {
            self.in_call.store(true, Ordering::SeqCst);
            self.gate.notified().await;
            self.in_call.store(false, Ordering::SeqCst);
        }

        let panic_on = self.state.lock().unwrap().panic_on.clone();
        if let Some((m, text)) = panic_on {
            if m == method {
                return Err(CallError::Execution(text));
            }
        }

        let amount_arg = |state_default: u128| -> u128 {
            match args.get("amount") {
                Some(serde_json::Value::String(s)) => s.parse().unwrap(),
                _ => state_default,
            }
        };

        let mut state = self.state.lock().unwrap();
        match method {
            "begin_unlock_near" => {
                let amount = amount_arg(state.locked);
                state.locked -= amount;
                state.pending += amount;
                state.unlock_timestamp =
                    TimestampNs::now().as_nanos() + state.unlock_duration_ns;
            }
            "end_unlock_near" => {
                if TimestampNs::now().as_nanos() < state.unlock_timestamp {
                    return Err(CallError::Execution(
                        "Smart contract panicked: unlock timestamp not reached".into(),
                    ));
                }
                let amount = amount_arg(state.pending);
                state.pending -= amount;
                state.liquid += amount;
                if state.pending == 0 {
                    state.unlock_timestamp = 0;
                }
            }
            "transfer" => {
                let amount = amount_arg(0);
                if amount > state.liquid {
                    return Err(CallError::Execution(
                        "Smart contract panicked: not enough liquid balance".into(),
                    ));
                }
                state.liquid -= amount;
            }
            "unstake_all" => {
                state.unstaked += state.staked;
                state.staked = 0;
                state.unstaked_available = false;
            }
            "withdraw_all_from_staking_pool" => {
                if !state.unstaked_available {
                    return Err(CallError::Execution(
                        "Smart contract panicked: unstaked balance not yet available".into(),
                    ));
                }
                state.liquid += state.unstaked;
                state.unstaked = 0;
            }
            "delete_lockup" => {
                let clean = state.locked == 0
                    && state.pending == 0
                    && state.liquid == 0
                    && state.staked == 0
                    && state.unstaked == 0;
                if !clean {
                    return Err(CallError::Execution(
                        "Smart contract panicked: all balances must be zero".into(),
                    ));
                }
                state.lockup_exists = false;
            }
            other => panic!("unexpected call method {other}"),
        }
        Ok(())
    }
}

async fn connect(chain: &Arc<MockChain>) -> LockupController {
    let provider: Arc<dyn Provider> = chain.clone();
    let signer: Arc<dyn Signer> = chain.clone();
    LockupController::connect(provider, signer, &AccountId::new(VENEAR).unwrap())
        .await
        .expect("connect")
        .with_settle_delay(Duration::ZERO)
}

fn near(n: u64) -> u128 {
    YoctoNear::from_near(n).raw()
}

#[tokio::test]
async fn nonexistent_lockup_is_a_state_not_an_error() {
    let chain = MockChain::new(ChainState::default());
    let controller = connect(&chain).await;

    let model = controller.read_model().await;
    assert!(!model.snapshot.lockup_exists);
    assert!(model.snapshot.all_zero());
    assert_eq!(model.snapshot.account_balance, YoctoNear::ZERO);
    assert_eq!(model.status, StakingStatus::NotStaked);
    assert!(!model.dust.any());

    assert!(matches!(
        controller.begin_unlock().await,
        Err(LockupError::LockupNotCreated)
    ));
    assert!(chain.calls().is_empty(), "no transaction was attempted");
}

#[tokio::test]
async fn begin_unlock_moves_locked_to_pending() {
    let chain = MockChain::new(ChainState {
        lockup_exists: true,
        locked: near(5),
        unlock_duration_ns: 90 * 24 * 3600 * 1_000_000_000,
        ..Default::default()
    });
    let controller = connect(&chain).await;
    let before = TimestampNs::now();

    controller.begin_unlock().await.expect("begin unlock");

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.locked, YoctoNear::ZERO);
    assert_eq!(snapshot.pending, YoctoNear::from_near(5));
    assert!(snapshot.unlock_timestamp.unwrap() > before);

    // The canonical form sends the `amount: null` sentinel.
    let (method, args) = &chain.calls()[0];
    assert_eq!(method, "begin_unlock_near");
    assert_eq!(args, &serde_json::json!({ "amount": null }));

    // A second unlock while one is pending is refused before submission.
    assert!(matches!(
        controller.begin_unlock().await,
        Err(LockupError::UnlockAlreadyPending)
    ));
    assert_eq!(chain.calls().len(), 1);
}

#[tokio::test]
async fn end_unlock_before_timer_is_rejected_without_a_transaction() {
    let chain = MockChain::new(ChainState {
        lockup_exists: true,
        pending: near(5),
        unlock_timestamp: TimestampNs::now().as_nanos() + 3_600_000_000_000,
        ..Default::default()
    });
    let controller = connect(&chain).await;

    let err = controller.end_unlock().await.unwrap_err();
    assert!(matches!(err, LockupError::UnlockNotReady { .. }));
    assert!(chain.calls().is_empty(), "rejected client-side, no call");
}

#[tokio::test]
async fn end_unlock_after_timer_completes_to_liquid() {
    let chain = MockChain::new(ChainState {
        lockup_exists: true,
        pending: near(5),
        unlock_timestamp: TimestampNs::now()
            .as_nanos()
            .saturating_sub(2_000_000_000),
        ..Default::default()
    });
    let controller = connect(&chain).await;

    controller.end_unlock().await.expect("end unlock");

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.pending, YoctoNear::ZERO);
    assert_eq!(snapshot.liquid, YoctoNear::from_near(5));
    assert_eq!(snapshot.unlock_timestamp, None);
}

#[tokio::test]
async fn end_unlock_is_not_blocked_by_staking_balances() {
    // Pool withdrawal is a parallel pipeline; an elapsed unlock completes
    // regardless of outstanding pool funds.
    let chain = MockChain::new(ChainState {
        lockup_exists: true,
        pending: near(5),
        unlock_timestamp: 1, // long elapsed
        pool_id: Some(POOL.to_string()),
        staked: near(100),
        unstaked: near(2),
        ..Default::default()
    });
    let controller = connect(&chain).await;

    controller.end_unlock().await.expect("end unlock");
    assert_eq!(controller.snapshot().await.liquid, YoctoNear::from_near(5));
}

#[tokio::test]
async fn transfer_snaps_near_total_requests_to_the_exact_balance() {
    let chain = MockChain::new(ChainState {
        lockup_exists: true,
        liquid: near(3),
        ..Default::default()
    });
    let controller = connect(&chain).await;

    // Request 500 yocto short of the full balance: snapped to exact.
    let request = YoctoNear::new(near(3) - 500);
    controller.transfer(request, None).await.expect("transfer");

    let (method, args) = &chain.calls()[0];
    assert_eq!(method, "transfer");
    assert_eq!(args["amount"], serde_json::json!(near(3).to_string()));
    assert_eq!(args["receiver_id"], serde_json::json!(OWNER));
    assert_eq!(controller.snapshot().await.liquid, YoctoNear::ZERO);
}

#[tokio::test]
async fn transfer_beyond_liquid_is_rejected_client_side() {
    let chain = MockChain::new(ChainState {
        lockup_exists: true,
        liquid: near(3),
        ..Default::default()
    });
    let controller = connect(&chain).await;

    let err = controller
        .transfer(YoctoNear::from_near(4), None)
        .await
        .unwrap_err();
    assert!(matches!(err, LockupError::ExceedsBalance { .. }));
    assert!(chain.calls().is_empty());
}

#[tokio::test]
async fn staking_pipeline_unstake_wait_withdraw() {
    let chain = MockChain::new(ChainState {
        lockup_exists: true,
        pool_id: Some(POOL.to_string()),
        staked: near(500),
        ..Default::default()
    });
    let controller = connect(&chain).await;
    assert_eq!(controller.read_model().await.status, StakingStatus::Staked);

    controller.unstake_all().await.expect("unstake");
    let model = controller.read_model().await;
    assert_eq!(model.status, StakingStatus::Unstaking);
    assert_eq!(model.pool.unstaked, YoctoNear::from_near(500));
    assert!(!model.pool.can_withdraw);

    // Unbonding epochs not elapsed: withdraw is refused before submission.
    assert!(matches!(
        controller.withdraw_from_staking_pool().await,
        Err(LockupError::NotWithdrawable)
    ));

    // The pool reports availability after the unbonding epochs.
    chain.with_state(|s| s.unstaked_available = true);
    controller.refresh().await.unwrap();
    assert_eq!(
        controller.read_model().await.status,
        StakingStatus::Unstaked
    );

    controller
        .withdraw_from_staking_pool()
        .await
        .expect("withdraw");
    let model = controller.read_model().await;
    assert_eq!(model.pool.unstaked, YoctoNear::ZERO);
    assert_eq!(model.snapshot.liquid, YoctoNear::from_near(500));
    assert_eq!(model.status, StakingStatus::NotStaked);
}

#[tokio::test]
async fn unstake_requires_a_pool_and_a_staked_balance() {
    let chain = MockChain::new(ChainState {
        lockup_exists: true,
        ..Default::default()
    });
    let controller = connect(&chain).await;
    assert!(matches!(
        controller.unstake_all().await,
        Err(LockupError::NoStakingPool)
    ));

    chain.with_state(|s| s.pool_id = Some(POOL.to_string()));
    controller.refresh().await.unwrap();
    assert!(matches!(
        controller.unstake_all().await,
        Err(LockupError::NothingStaked)
    ));
    assert!(chain.calls().is_empty());
}

#[tokio::test]
async fn delete_requires_every_balance_exactly_zero() {
    let chain = MockChain::new(ChainState {
        lockup_exists: true,
        liquid: 1, // one yocto of dust
        pool_id: Some(POOL.to_string()),
        ..Default::default()
    });
    let controller = connect(&chain).await;

    match controller.delete_lockup().await.unwrap_err() {
        LockupError::NonZeroBalance { field, amount } => {
            assert_eq!(field, "liquid");
            assert_eq!(amount, YoctoNear::new(1));
        }
        other => panic!("expected NonZeroBalance, got {other}"),
    }

    // A single yocto on the pool side also blocks deletion.
    chain.with_state(|s| {
        s.liquid = 0;
        s.unstaked = 1;
    });
    controller.refresh().await.unwrap();
    match controller.delete_lockup().await.unwrap_err() {
        LockupError::NonZeroBalance { field, .. } => assert_eq!(field, "unstaked"),
        other => panic!("expected NonZeroBalance, got {other}"),
    }
    assert!(chain.calls().is_empty(), "nothing was submitted");

    chain.with_state(|s| s.unstaked = 0);
    controller.refresh().await.unwrap();
    controller.delete_lockup().await.expect("delete");

    let snapshot = controller.snapshot().await;
    assert!(!snapshot.lockup_exists);
    assert!(snapshot.all_zero());
}

#[tokio::test]
async fn contract_panics_are_rewritten_into_actionable_messages() {
    // Client-side state looks clean, but the chain refuses: the raw panic
    // must come back rewritten.
    let chain = MockChain::new(ChainState {
        lockup_exists: true,
        panic_on: Some((
            "delete_lockup".to_string(),
            "Smart contract panicked: all balances must be zero".to_string(),
        )),
        ..Default::default()
    });
    let controller = connect(&chain).await;

    match controller.delete_lockup().await.unwrap_err() {
        LockupError::Contract(message) => {
            assert!(message.contains("exactly zero"), "got: {message}");
            assert!(!message.contains("panicked"), "raw panic text leaked");
        }
        other => panic!("expected Contract, got {other}"),
    }
}

#[tokio::test]
async fn cleanup_drives_all_balances_to_exact_zero() {
    // Zero unlock window: the re-planned passes can finish the pipeline.
    let chain = MockChain::new(ChainState {
        lockup_exists: true,
        locked: near(5),
        liquid: near(3),
        unlock_duration_ns: 0,
        ..Default::default()
    });
    let controller = connect(&chain).await;

    let executed = controller.run_cleanup().await.expect("cleanup");

    // First pass: unlock + transfer (pending was zero, complete-unlock
    // skipped); later passes finish the newly pending funds.
    assert_eq!(
        executed[..2],
        [CleanupAction::BeginUnlock, CleanupAction::TransferAll]
    );
    assert_eq!(
        executed[2..],
        [CleanupAction::EndUnlock, CleanupAction::TransferAll]
    );

    let snapshot = controller.snapshot().await;
    assert!(snapshot.all_zero(), "cleanup left residue: {snapshot:?}");
    assert_eq!(
        chain.call_methods(),
        vec!["begin_unlock_near", "transfer", "end_unlock_near", "transfer"]
    );
}

#[tokio::test]
async fn cleanup_stops_at_an_unelapsed_unlock_window() {
    let chain = MockChain::new(ChainState {
        lockup_exists: true,
        locked: near(5),
        unlock_duration_ns: 90 * 24 * 3600 * 1_000_000_000,
        ..Default::default()
    });
    let controller = connect(&chain).await;

    let executed = controller.run_cleanup().await.expect("cleanup");
    assert_eq!(executed, vec![CleanupAction::BeginUnlock]);

    // The pending balance waits out its timer; nothing else to do now.
    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.pending, YoctoNear::from_near(5));
}

#[tokio::test]
async fn poller_applies_fresh_state_each_cycle() {
    let chain = MockChain::new(ChainState {
        lockup_exists: true,
        locked: near(5),
        ..Default::default()
    });
    let controller = Arc::new(connect(&chain).await);

    let poller = Poller::spawn(controller.clone(), Duration::from_millis(5));

    chain.with_state(|s| s.locked = near(7));
    let mut waited = 0;
    while controller.snapshot().await.locked != YoctoNear::from_near(7) {
        tokio::time::sleep(Duration::from_millis(5)).await;
        waited += 1;
        assert!(waited < 200, "poller never picked up the new state");
    }
    poller.stop();
}

#[tokio::test]
async fn cancelled_poll_discards_its_in_flight_result() {
    let chain = MockChain::new(ChainState {
        lockup_exists: true,
        locked: near(5),
        ..Default::default()
    });
    let controller = Arc::new(connect(&chain).await);
    assert_eq!(controller.snapshot().await.locked, YoctoNear::from_near(5));

    // The chain moves on, and the poll that would observe it is held
    // mid-fetch.
    chain.with_state(|s| s.locked = near(7));
    chain.hold_views_of("get_venear_locked_balance");

    let poller = Poller::spawn(controller.clone(), Duration::from_millis(5));
    while !chain.in_view.load(Ordering::SeqCst) {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    // Cancel while the fetch is in flight, then let it unblock.
    poller.stop();
    tokio::time::sleep(Duration::from_millis(20)).await;
    chain.release_view();
    tokio::time::sleep(Duration::from_millis(20)).await;

    // The cancelled cycle's result was dropped, never applied.
    assert_eq!(controller.snapshot().await.locked, YoctoNear::from_near(5));
}

#[tokio::test(flavor = "multi_thread")]
async fn second_action_while_one_is_in_flight_fails_fast() {
    let chain = MockChain::new(ChainState {
        lockup_exists: true,
        locked: near(5),
        liquid: near(1),
        ..Default::default()
    });
    let controller = Arc::new(connect(&chain).await);
    chain.hold_calls_to("begin_unlock_near");

    let background = controller.clone();
    let handle = tokio::spawn(async move { background.begin_unlock().await });

    while !chain.in_call.load(Ordering::SeqCst) {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    assert!(controller.is_busy());
    assert!(matches!(
        controller.transfer_all(None).await,
        Err(LockupError::Busy)
    ));

    chain.release();
    handle.await.unwrap().expect("held action completes");
    assert!(!controller.is_busy());
}
