use thiserror::Error;

use velock_types::YoctoNear;

#[derive(Debug, Error)]
pub enum LockupError {
    #[error("another action is already in flight")]
    Busy,

    #[error("lockup contract has not been created")]
    LockupNotCreated,

    #[error("no locked balance to unlock")]
    NothingToUnlock,

    #[error("an unlock is already pending")]
    UnlockAlreadyPending,

    #[error("no pending balance to complete")]
    NothingPending,

    #[error("unlock period not complete; {remaining} remaining")]
    UnlockNotReady { remaining: String },

    #[error("invalid amount: must be greater than zero")]
    InvalidAmount,

    #[error("amount {requested} exceeds available balance of {available}")]
    ExceedsBalance {
        requested: YoctoNear,
        available: YoctoNear,
    },

    #[error("no staking pool configured")]
    NoStakingPool,

    #[error("no staked balance to unstake")]
    NothingStaked,

    #[error("staking pool is mid-transition; wait for the current unstake to settle")]
    PoolBusy,

    #[error("unstaked funds are not yet available for withdrawal")]
    NotWithdrawable,

    #[error("cannot delete lockup: {field} balance is {amount}, must be exactly zero")]
    NonZeroBalance { field: &'static str, amount: YoctoNear },

    #[error("contract rejected the call: {0}")]
    Contract(String),

    #[error("transaction submission failed: {0}")]
    Submission(String),

    #[error(transparent)]
    Provider(#[from] velock_provider::ProviderError),

    #[error("config error: {0}")]
    Config(String),
}
