use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(String),

    #[error("no RPC endpoints configured")]
    NoEndpoints,

    #[error("all {attempted} RPC endpoints failed; last error: {last_error}")]
    AllEndpointsFailed { attempted: usize, last_error: String },

    #[error("RPC error from {endpoint}: {message}")]
    Rpc { endpoint: String, message: String },

    #[error("invalid response from {endpoint}: {message}")]
    InvalidResponse { endpoint: String, message: String },
}

/// Errors from submitting a signed contract call.
#[derive(Debug, Error)]
pub enum CallError {
    /// The contract panicked. Carries the raw panic text so the caller can
    /// pattern-match known messages and rewrite them.
    #[error("contract execution failed: {0}")]
    Execution(String),

    #[error("transaction submission failed: {0}")]
    Transport(String),

    #[error("signer rejected the request: {0}")]
    Rejected(String),
}
