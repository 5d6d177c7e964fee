//! velock CLI — read-only inspection of a lockup's lifecycle state.
//!
//! Mutating actions require a connected wallet and are deliberately not
//! exposed here; the binary never touches keys.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use velock_lockup::{
    dust_report, fetch_account_count, fetch_public_accounts, plan_cleanup, reader, staking,
    LockupConfig, LogFormat,
};
use velock_provider::{Provider, RpcClient};
use velock_types::{AccountId, TimestampNs};

#[derive(Parser)]
#[command(name = "velock", about = "NEAR lockup lifecycle inspector")]
struct Cli {
    /// veNEAR factory contract id (defaults to the config file's value).
    #[arg(long, env = "VELOCK_CONTRACT")]
    contract: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "warn", env = "VELOCK_LOG_LEVEL")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print balances, unlock countdown, staking status, and dust flags.
    Status {
        /// Owner account whose lockup to inspect.
        #[arg(env = "VELOCK_ACCOUNT")]
        account: String,
    },
    /// Print the cleanup action sequence the current balances call for.
    Plan {
        /// Owner account whose lockup to inspect.
        #[arg(env = "VELOCK_ACCOUNT")]
        account: String,
    },
    /// List every registered account with its lockup and staking detail,
    /// sorted by total locked + pending balance.
    Accounts,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match LockupConfig::from_toml_file(&path.display().to_string()) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("failed to read config file: {e}, using defaults");
                LockupConfig::default()
            }
        },
        None => LockupConfig::default(),
    };

    velock_lockup::init_logging(
        LogFormat::from_str_or_human(&config.log_format),
        &cli.log_level,
    );

    let contract = AccountId::new(
        cli.contract
            .clone()
            .unwrap_or_else(|| config.venear_contract_id.clone()),
    )?;

    let provider: Arc<dyn Provider> = Arc::new(RpcClient::new(config.endpoints())?);
    let now = TimestampNs::now();

    match cli.command {
        Command::Status { account } => {
            let (lockup_id, snapshot) = fetch_owner_snapshot(&provider, &contract, &account).await?;
            let Some(snapshot) = snapshot else {
                println!("lockup {lockup_id} has not been created yet");
                return Ok(());
            };
            let pool = staking::fetch_staking_pool_info(provider.as_ref(), &lockup_id).await?;
            let dust = dust_report(&snapshot);

            println!("lockup:          {lockup_id}");
            println!("locked:          {}", snapshot.locked);
            println!("pending:         {}", snapshot.pending);
            println!("liquid:          {}", snapshot.liquid);
            println!("account balance: {}", snapshot.account_balance);
            match snapshot.unlock_timestamp {
                Some(ts) => println!("unlock timer:    {}", ts.format_remaining(now)),
                None => println!("unlock timer:    none"),
            }
            println!("staking status:  {}", pool.status());
            if let Some(pool_id) = &pool.pool_id {
                println!("staking pool:    {pool_id}");
                println!("staked:          {}", pool.staked);
                println!("unstaked:        {}", pool.unstaked);
                println!(
                    "withdrawable:    {}",
                    if pool.can_withdraw { "yes" } else { "no" }
                );
            }
            if dust.any() {
                println!(
                    "dust:            locked={} pending={} liquid={}",
                    dust.has_locked_dust, dust.has_pending_dust, dust.has_liquid_dust
                );
            }
        }
        Command::Plan { account } => {
            let (lockup_id, snapshot) = fetch_owner_snapshot(&provider, &contract, &account).await?;
            let Some(snapshot) = snapshot else {
                println!("lockup {lockup_id} has not been created yet");
                return Ok(());
            };
            let plan = plan_cleanup(&snapshot, now);
            if plan.is_empty() {
                println!("nothing to clean up");
            } else {
                for (i, action) in plan.iter().enumerate() {
                    println!("{}. {action:?}", i + 1);
                }
            }
        }
        Command::Accounts => {
            let count = fetch_account_count(provider.as_ref(), &contract).await?;
            println!("{count} registered accounts\n");

            let listing = fetch_public_accounts(provider, &contract).await?;
            for account in &listing {
                println!("{}", account.account_id);
                println!("  lockup:   {}", account.lockup_account_id);
                if !account.lockup_exists {
                    println!("  (lockup not created)");
                    continue;
                }
                println!("  locked:   {}", account.locked);
                println!("  pending:  {}", account.pending);
                if let Some(ts) = account.unlock_timestamp {
                    println!("  unlock:   {}", ts.format_remaining(now));
                }
                if let Some(pool) = &account.pool {
                    if let Some(pool_id) = &pool.pool_id {
                        println!("  pool:     {pool_id} ({})", pool.status());
                    }
                }
            }
        }
    }

    Ok(())
}

/// Resolve an owner's lockup and take one snapshot. `None` when the lockup
/// has not been created.
async fn fetch_owner_snapshot(
    provider: &Arc<dyn Provider>,
    contract: &AccountId,
    account: &str,
) -> anyhow::Result<(AccountId, Option<velock_types::BalanceSnapshot>)> {
    let owner = AccountId::new(account)?;
    let lockup_id = reader::resolve_lockup_account_id(provider.as_ref(), contract, &owner).await?;
    let snapshot = reader::fetch_snapshot(provider.as_ref(), &lockup_id).await?;
    if snapshot.lockup_exists {
        Ok((lockup_id, Some(snapshot)))
    } else {
        Ok((lockup_id, None))
    }
}
