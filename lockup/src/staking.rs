//! Staking pool reader and status classification.

use velock_provider::{Provider, ProviderError};
use velock_types::{AccountId, StakingPoolInfo, YoctoNear};

use crate::error::LockupError;

/// Fetch the staking pool state for a lockup.
///
/// "No pool configured" is the common case and a cheap, valid terminal:
/// one view call, immediate return. When a pool exists, the three balance
/// queries run concurrently with per-query fault isolation.
///
/// Withdrawability comes from the pool's own epoch accounting
/// (`is_account_unstaked_balance_available`) — the unbonding duration is
/// consensus determined and is never approximated from elapsed time here.
pub async fn fetch_staking_pool_info(
    provider: &dyn Provider,
    lockup_id: &AccountId,
) -> Result<StakingPoolInfo, LockupError> {
    let pool_value = provider
        .view_call(
            lockup_id,
            "get_staking_pool_account_id",
            serde_json::json!({}),
        )
        .await?;

    let pool_id = match pool_value.as_str() {
        None => return Ok(StakingPoolInfo::no_pool()),
        Some(raw) => AccountId::new(raw).map_err(|e| {
            LockupError::Provider(ProviderError::InvalidResponse {
                endpoint: String::new(),
                message: format!("get_staking_pool_account_id: {e}"),
            })
        })?,
    };

    let args = serde_json::json!({ "account_id": lockup_id.as_str() });
    let (staked, unstaked, available_flag) = tokio::join!(
        provider.view_call(&pool_id, "get_account_staked_balance", args.clone()),
        provider.view_call(&pool_id, "get_account_unstaked_balance", args.clone()),
        provider.view_call(&pool_id, "is_account_unstaked_balance_available", args),
    );

    let staked = balance_or_zero(staked, "get_account_staked_balance");
    let unstaked = balance_or_zero(unstaked, "get_account_unstaked_balance");
    let is_available = match available_flag {
        Ok(value) => value.as_bool().unwrap_or(false),
        Err(e) => {
            tracing::debug!(error = %e, "availability query failed, assuming unavailable");
            false
        }
    };

    let can_withdraw = !unstaked.is_zero() && is_available;
    let is_unstaking = !unstaked.is_zero() && !is_available;

    Ok(StakingPoolInfo {
        is_liquid_staking_pool: is_liquid_staking_pool(&pool_id),
        pool_id: Some(pool_id),
        staked,
        unstaked,
        available: if can_withdraw { unstaked } else { YoctoNear::ZERO },
        can_withdraw,
        is_unstaking,
    })
}

/// Share-based liquid staking pools (Meta Pool's stNEAR, LiNEAR) produce
/// unavoidable conversion dust. Display expectations only — never gates
/// control flow.
pub fn is_liquid_staking_pool(pool_id: &AccountId) -> bool {
    let id = pool_id.as_str();
    id.contains("meta-pool")
        || id == "meta-v2.pool.near"
        || id.contains("linear")
        || id == "v2-nearx.stader-labs.near"
}

fn balance_or_zero(
    result: Result<serde_json::Value, ProviderError>,
    method: &str,
) -> YoctoNear {
    match result {
        Ok(value) => value
            .as_str()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| {
                tracing::debug!(method, %value, "unparseable pool balance, defaulting to 0");
                YoctoNear::ZERO
            }),
        Err(e) => {
            tracing::debug!(method, error = %e, "pool balance query failed, defaulting to 0");
            YoctoNear::ZERO
        }
    }
}
