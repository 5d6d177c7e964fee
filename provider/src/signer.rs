//! Interface to the external wallet that signs and submits contract calls.
//!
//! Key custody, transaction construction, and submission all live behind
//! this trait — the orchestrator never touches private keys.

use async_trait::async_trait;

use velock_types::{AccountId, YoctoNear};

use crate::error::CallError;

/// Gas attached to every lockup contract call: 125 TGas, a 25% safety
/// margin above the official guide's 100 TGas.
pub const MAX_GAS: u64 = 125_000_000_000_000;

/// Every mutating lockup method requires exactly 1 yoctoNEAR attached as a
/// confirmation deposit.
pub const ONE_YOCTO_DEPOSIT: YoctoNear = YoctoNear::new(1);

/// A connected wallet able to sign and submit one function call.
#[async_trait]
pub trait Signer: Send + Sync {
    /// The owner account this signer acts for.
    fn account_id(&self) -> &AccountId;

    /// Sign and submit a single function call transaction, waiting for the
    /// submission acknowledgment. Contract panics surface as
    /// [`CallError::Execution`] with the raw panic text.
    async fn call(
        &self,
        receiver: &AccountId,
        method: &str,
        args: serde_json::Value,
        gas: u64,
        deposit: YoctoNear,
    ) -> Result<(), CallError>;
}
