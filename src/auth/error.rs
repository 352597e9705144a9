use thiserror::Error;

/// Failure taxonomy for the auth core.
///
/// Every operation returns one of these instead of leaking store or crypto
/// internals. `Unauthorized` is deliberately uninformative: unknown username
/// and wrong password produce the same variant so callers cannot enumerate
/// accounts.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Required input absent or empty.
    #[error("{0}")]
    Validation(String),

    /// Password rejected by policy; carries every unmet requirement.
    #[error("password requirements not met")]
    Policy { missing: Vec<&'static str> },

    /// Username already registered.
    #[error("username already exists")]
    Conflict,

    /// Unknown account on a 2FA operation.
    #[error("user not found")]
    NotFound,

    /// Bad credentials or bad 2FA code.
    #[error("unauthorized")]
    Unauthorized,

    /// Unexpected store or cryptographic failure.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
