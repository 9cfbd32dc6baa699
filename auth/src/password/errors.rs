use thiserror::Error;

/// Error type for credential hashing and checking.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    /// Salt generation, parameter setup, or hashing failed.
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// The stored hash could not be parsed.
    #[error("Password verification failed: {0}")]
    VerificationFailed(String),
}
