//! Public account registry reader.
//!
//! The veNEAR factory keeps an enumerable registry of every registered
//! account. This module pages through it (`get_num_accounts` +
//! `get_accounts`) and aggregates each account's lockup and staking pool
//! detail into a [`PublicAccount`] list, sorted by total locked + pending
//! balance descending.
//!
//! Per-account detail fetches are fault isolated the same way snapshot
//! fields are: a lockup whose queries fail degrades to zeros, and an
//! account whose lockup id cannot even be resolved is skipped rather than
//! failing the whole listing.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use velock_provider::Provider;
use velock_types::{AccountId, StakingPoolInfo, TimestampNs, YoctoNear};

use crate::error::LockupError;
use crate::{reader, staking};

/// Registry page size for `get_accounts`.
pub const ACCOUNTS_PER_PAGE: u64 = 100;

/// One registered account with its lockup and staking detail.
#[derive(Clone, Debug, Serialize)]
pub struct PublicAccount {
    pub account_id: AccountId,
    pub lockup_account_id: AccountId,
    /// The account's balance as recorded in the factory registry.
    pub registry_balance: YoctoNear,
    pub locked: YoctoNear,
    pub pending: YoctoNear,
    pub unlock_timestamp: Option<TimestampNs>,
    pub lockup_exists: bool,
    /// `None` when the lockup has no pool configured or the pool queries
    /// failed outright.
    pub pool: Option<StakingPoolInfo>,
}

impl PublicAccount {
    /// Sort key for the listing: locked plus pending.
    pub fn total(&self) -> YoctoNear {
        self.locked.saturating_add(self.pending)
    }
}

/// Registry entry shape returned by `get_accounts`.
#[derive(Debug, Deserialize)]
struct RegistryEntry {
    account: RegistryAccount,
}

#[derive(Debug, Deserialize)]
struct RegistryAccount {
    account_id: AccountId,
    balance: RegistryBalance,
}

#[derive(Debug, Deserialize)]
struct RegistryBalance {
    near_balance: YoctoNear,
}

/// Total number of accounts registered with the factory.
pub async fn fetch_account_count(
    provider: &dyn Provider,
    venear_contract: &AccountId,
) -> Result<u64, LockupError> {
    let value = provider
        .view_call(venear_contract, "get_num_accounts", serde_json::json!({}))
        .await?;
    value.as_u64().ok_or_else(|| {
        LockupError::Provider(velock_provider::ProviderError::InvalidResponse {
            endpoint: String::new(),
            message: format!("get_num_accounts returned unexpected value {value}"),
        })
    })
}

/// Fetch every registered account with its lockup and staking detail,
/// sorted by total locked + pending balance descending.
///
/// The registry pages and the count are on the listing's critical path and
/// propagate errors; per-account detail is best effort.
pub async fn fetch_public_accounts(
    provider: Arc<dyn Provider>,
    venear_contract: &AccountId,
) -> Result<Vec<PublicAccount>, LockupError> {
    let count = fetch_account_count(provider.as_ref(), venear_contract).await?;

    let mut entries = Vec::with_capacity(count as usize);
    let mut from_index = 0u64;
    while from_index < count {
        let page = provider
            .view_call(
                venear_contract,
                "get_accounts",
                serde_json::json!({ "from_index": from_index, "limit": ACCOUNTS_PER_PAGE }),
            )
            .await?;
        let page: Vec<RegistryEntry> = serde_json::from_value(page).map_err(|e| {
            LockupError::Provider(velock_provider::ProviderError::InvalidResponse {
                endpoint: String::new(),
                message: format!("get_accounts page at {from_index}: {e}"),
            })
        })?;
        entries.extend(page);
        from_index += ACCOUNTS_PER_PAGE;
    }

    let mut tasks = JoinSet::new();
    for entry in entries {
        let provider = provider.clone();
        let venear = venear_contract.clone();
        tasks.spawn(async move {
            fetch_account_detail(
                provider,
                venear,
                entry.account.account_id,
                entry.account.balance.near_balance,
            )
            .await
        });
    }

    let mut accounts = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Some(account)) => accounts.push(account),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "account detail task failed"),
        }
    }

    accounts.sort_by(|a, b| b.total().cmp(&a.total()));
    Ok(accounts)
}

/// Fetch one account's lockup and staking detail. Returns `None` when the
/// lockup id cannot be resolved — that account is dropped from the listing.
async fn fetch_account_detail(
    provider: Arc<dyn Provider>,
    venear_contract: AccountId,
    account_id: AccountId,
    registry_balance: YoctoNear,
) -> Option<PublicAccount> {
    let lockup_id =
        match reader::resolve_lockup_account_id(provider.as_ref(), &venear_contract, &account_id)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(account = %account_id, error = %e, "lockup id resolution failed");
                return None;
            }
        };

    let exists = match provider.account_exists(&lockup_id).await {
        Ok(exists) => exists,
        Err(e) => {
            tracing::warn!(account = %account_id, error = %e, "lockup existence probe failed");
            return None;
        }
    };

    if !exists {
        return Some(PublicAccount {
            account_id,
            lockup_account_id: lockup_id,
            registry_balance,
            locked: YoctoNear::ZERO,
            pending: YoctoNear::ZERO,
            unlock_timestamp: None,
            lockup_exists: false,
            pool: None,
        });
    }

    let empty = serde_json::json!({});
    let (locked, pending, timestamp) = tokio::join!(
        provider.view_call(&lockup_id, "get_venear_locked_balance", empty.clone()),
        provider.view_call(&lockup_id, "get_venear_pending_balance", empty.clone()),
        provider.view_call(&lockup_id, "get_venear_unlock_timestamp", empty),
    );

    let pool = match staking::fetch_staking_pool_info(provider.as_ref(), &lockup_id).await {
        Ok(info) if info.pool_id.is_some() => Some(info),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(lockup = %lockup_id, error = %e, "pool query failed for listing");
            None
        }
    };

    Some(PublicAccount {
        account_id,
        lockup_account_id: lockup_id,
        registry_balance,
        locked: reader::amount_or_zero(locked, "get_venear_locked_balance"),
        pending: reader::amount_or_zero(pending, "get_venear_pending_balance"),
        unlock_timestamp: reader::timestamp_or_none(timestamp),
        lockup_exists: true,
        pool,
    })
}
