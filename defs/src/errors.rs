use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignError {
    /// Malformed header, body or JSON. Never partially tolerated.
    #[error("{0}")]
    Format(String),

    /// A local name or revision could not be resolved.
    #[error("{0}")]
    Resolution(String),

    /// A local name points somewhere inconsistent with the signed claim.
    #[error("{0}")]
    Conflict(String),

    /// Expired signature or insufficient stake.
    #[error("{0}")]
    Envelope(String),

    /// The manifest is well-formed but doesn't cover what was asked for.
    #[error("{0}")]
    Unverified(String),

    #[error("Transaction and/or receipt not found on Ethereum network")]
    TransactionNotFound,

    #[error("Other error occurred: {0}")]
    Other(#[from] anyhow::Error),
}

impl SignError {
    pub fn format(msg: impl Into<String>) -> Self {
        SignError::Format(msg.into())
    }

    pub fn resolution(msg: impl Into<String>) -> Self {
        SignError::Resolution(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        SignError::Conflict(msg.into())
    }

    pub fn envelope(msg: impl Into<String>) -> Self {
        SignError::Envelope(msg.into())
    }

    pub fn unverified(msg: impl Into<String>) -> Self {
        SignError::Unverified(msg.into())
    }
}

pub type SignResult<T> = Result<T, SignError>;
