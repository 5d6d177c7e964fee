//! NEAR JSON-RPC view transport for the velock orchestrator.
//!
//! Provides:
//! - [`Provider`] — the read-only view-call seam the readers depend on.
//! - [`RpcClient`] — a reqwest-backed implementation with an ordered
//!   endpoint list, per-endpoint retry/backoff, and failover.
//! - [`Signer`] — the interface to the external wallet collaborator that
//!   signs and submits mutating contract calls.
//!
//! The client is constructed once per process and passed explicitly;
//! there is no hidden module-level singleton.

pub mod client;
pub mod endpoint;
pub mod error;
pub mod signer;

pub use client::{Provider, RpcClient};
pub use endpoint::Endpoint;
pub use error::{CallError, ProviderError};
pub use signer::{Signer, MAX_GAS, ONE_YOCTO_DEPOSIT};
