//! Balance reader: lockup resolution, existence probe, and the snapshot
//! fetch.
//!
//! Every poll builds a fresh [`BalanceSnapshot`] — prior snapshots are
//! replaced, never mutated. The five balance queries of one fetch run
//! concurrently and are individually fault tolerant: a failed query
//! degrades that field to zero/`None` instead of aborting the snapshot.

use velock_provider::{Provider, ProviderError};
use velock_types::{AccountId, BalanceSnapshot, TimestampNs, YoctoNear};

use crate::error::LockupError;

/// Resolve the deterministic lockup account id for an owner via the veNEAR
/// factory contract.
pub async fn resolve_lockup_account_id(
    provider: &dyn Provider,
    venear_contract: &AccountId,
    owner: &AccountId,
) -> Result<AccountId, LockupError> {
    let value = provider
        .view_call(
            venear_contract,
            "get_lockup_account_id",
            serde_json::json!({ "account_id": owner.as_str() }),
        )
        .await?;

    let raw = value
        .as_str()
        .ok_or_else(|| invalid("get_lockup_account_id", &value))?;
    AccountId::new(raw).map_err(|e| LockupError::Provider(ProviderError::InvalidResponse {
        endpoint: String::new(),
        message: e.to_string(),
    }))
}

/// Fetch a fresh snapshot of the lockup's balances.
///
/// A nonexistent lockup is a first-class state, not an error: the returned
/// snapshot has `lockup_exists == false` and all balances zero.
pub async fn fetch_snapshot(
    provider: &dyn Provider,
    lockup_id: &AccountId,
) -> Result<BalanceSnapshot, LockupError> {
    if !provider.account_exists(lockup_id).await? {
        return Ok(BalanceSnapshot::not_created(lockup_id.clone()));
    }

    let empty = serde_json::json!({});
    let (locked, pending, timestamp, liquid, account_balance) = tokio::join!(
        provider.view_call(lockup_id, "get_venear_locked_balance", empty.clone()),
        provider.view_call(lockup_id, "get_venear_pending_balance", empty.clone()),
        provider.view_call(lockup_id, "get_venear_unlock_timestamp", empty.clone()),
        provider.view_call(lockup_id, "get_liquid_owners_balance", empty.clone()),
        provider.view_call(lockup_id, "get_account_balance", empty),
    );

    Ok(BalanceSnapshot {
        locked: amount_or_zero(locked, "get_venear_locked_balance"),
        pending: amount_or_zero(pending, "get_venear_pending_balance"),
        liquid: amount_or_zero(liquid, "get_liquid_owners_balance"),
        account_balance: amount_or_zero(account_balance, "get_account_balance"),
        unlock_timestamp: timestamp_or_none(timestamp),
        lockup_account_id: lockup_id.clone(),
        lockup_exists: true,
    })
}

/// Fetch the exact current liquid balance, for transfer submission. Unlike
/// the snapshot fields this is on the write path, so failures propagate.
pub async fn fetch_exact_liquid(
    provider: &dyn Provider,
    lockup_id: &AccountId,
) -> Result<YoctoNear, LockupError> {
    let value = provider
        .view_call(lockup_id, "get_liquid_owners_balance", serde_json::json!({}))
        .await?;
    parse_amount(&value).ok_or_else(|| invalid("get_liquid_owners_balance", &value).into())
}

fn parse_amount(value: &serde_json::Value) -> Option<YoctoNear> {
    value.as_str()?.parse().ok()
}

pub(crate) fn amount_or_zero(
    result: Result<serde_json::Value, ProviderError>,
    method: &str,
) -> YoctoNear {
    match result {
        Ok(value) => parse_amount(&value).unwrap_or_else(|| {
            tracing::debug!(method, %value, "unparseable balance, defaulting to 0");
            YoctoNear::ZERO
        }),
        Err(e) => {
            tracing::debug!(method, error = %e, "balance query failed, defaulting to 0");
            YoctoNear::ZERO
        }
    }
}

pub(crate) fn timestamp_or_none(
    result: Result<serde_json::Value, ProviderError>,
) -> Option<TimestampNs> {
    match result {
        Ok(value) => {
            TimestampNs::from_contract_value(value.as_str()).ok().flatten()
        }
        Err(e) => {
            tracing::debug!(error = %e, "unlock timestamp query failed, defaulting to none");
            None
        }
    }
}

fn invalid(method: &str, value: &serde_json::Value) -> ProviderError {
    ProviderError::InvalidResponse {
        endpoint: String::new(),
        message: format!("{method} returned unexpected value {value}"),
    }
}
