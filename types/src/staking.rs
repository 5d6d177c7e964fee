//! Staking pool state associated with a lockup contract.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::account::AccountId;
use crate::amount::YoctoNear;

/// One poll's view of the staking pool a lockup has delegated to.
///
/// Invariant: `can_withdraw` and `is_unstaking` are mutually exclusive and
/// both false when `unstaked` is zero. Availability comes from the pool's
/// own epoch accounting (`is_account_unstaked_balance_available`), never
/// from locally elapsed time — the unbonding duration is consensus
/// determined and must not be approximated client side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingPoolInfo {
    /// `None` means no pool is configured — a common, valid terminal state.
    pub pool_id: Option<AccountId>,
    pub staked: YoctoNear,
    pub unstaked: YoctoNear,
    /// Subset of `unstaked` that has passed the unbonding period.
    pub available: YoctoNear,
    pub can_withdraw: bool,
    pub is_unstaking: bool,
    /// Share-based pools (Meta Pool, LiNEAR) leave unavoidable conversion
    /// dust. Affects display expectations only, never control flow.
    pub is_liquid_staking_pool: bool,
}

impl StakingPoolInfo {
    /// Info for a lockup with no staking pool configured.
    pub fn no_pool() -> Self {
        Self {
            pool_id: None,
            staked: YoctoNear::ZERO,
            unstaked: YoctoNear::ZERO,
            available: YoctoNear::ZERO,
            can_withdraw: false,
            is_unstaking: false,
            is_liquid_staking_pool: false,
        }
    }

    /// Both pool-side balances are bit-exact zero.
    pub fn all_zero(&self) -> bool {
        self.staked.is_zero() && self.unstaked.is_zero()
    }

    /// Derive the display status. Pure function of the latest info,
    /// recomputed on every read, never stored.
    pub fn status(&self) -> StakingStatus {
        if self.pool_id.is_none() {
            return StakingStatus::NotStaked;
        }
        if !self.staked.is_zero() {
            return StakingStatus::Staked;
        }
        if !self.unstaked.is_zero() {
            if self.can_withdraw {
                return StakingStatus::Unstaked;
            }
            if self.is_unstaking {
                return StakingStatus::Unstaking;
            }
            return StakingStatus::Unknown;
        }
        StakingStatus::NotStaked
    }
}

/// Display classification of a lockup's delegation state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StakingStatus {
    NotStaked,
    Staked,
    Unstaking,
    Unstaked,
    Unknown,
}

impl fmt::Display for StakingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StakingStatus::NotStaked => "not staked",
            StakingStatus::Staked => "staked",
            StakingStatus::Unstaking => "unstaking",
            StakingStatus::Unstaked => "unstaked",
            StakingStatus::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_info(staked: u128, unstaked: u128, can_withdraw: bool) -> StakingPoolInfo {
        StakingPoolInfo {
            pool_id: Some(AccountId::new("validator.poolv1.near").unwrap()),
            staked: YoctoNear::new(staked),
            unstaked: YoctoNear::new(unstaked),
            available: YoctoNear::new(if can_withdraw { unstaked } else { 0 }),
            can_withdraw,
            is_unstaking: unstaked > 0 && !can_withdraw,
            is_liquid_staking_pool: false,
        }
    }

    #[test]
    fn no_pool_is_not_staked() {
        assert_eq!(StakingPoolInfo::no_pool().status(), StakingStatus::NotStaked);
    }

    #[test]
    fn staked_balance_dominates() {
        assert_eq!(pool_info(500, 0, false).status(), StakingStatus::Staked);
    }

    #[test]
    fn unstaked_balance_splits_on_availability() {
        assert_eq!(pool_info(0, 500, false).status(), StakingStatus::Unstaking);
        assert_eq!(pool_info(0, 500, true).status(), StakingStatus::Unstaked);
    }

    #[test]
    fn zero_balances_with_pool_is_not_staked() {
        assert_eq!(pool_info(0, 0, false).status(), StakingStatus::NotStaked);
    }
}
