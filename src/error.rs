use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("invalid address format")]
    BadAddress,

    #[error("signature expired")]
    StaleSignature,

    #[error("invalid or expired nonce")]
    NonceMissing,

    #[error("nonce mismatch")]
    NonceMismatch,

    #[error("nonce expired")]
    NonceExpired,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("forbidden")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("hashname is not active")]
    Inactive,

    #[error("hashname already claimed by another wallet")]
    AlreadyOwned,

    #[error("request already resolved")]
    AlreadyResolved,

    #[error("hashname has no owner to resolve requests")]
    Unclaimed,

    #[error("store operation timed out")]
    StoreTimeout,
}

impl Error {
    /// True for the unauthorized class: failures of the signature exchange
    /// itself, as opposed to an authenticated caller lacking entitlement.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Error::StaleSignature
                | Error::NonceMissing
                | Error::NonceMismatch
                | Error::NonceExpired
                | Error::InvalidSignature
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
