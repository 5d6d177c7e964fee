use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypeError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid account id: {0}")]
    InvalidAccountId(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
