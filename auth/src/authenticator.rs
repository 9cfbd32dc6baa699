use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::TokenCodec;
use crate::jwt::TokenRejection;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining credential checks and token issuance.
///
/// Constructed once at startup and shared read-only across requests.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_codec: TokenCodec,
}

/// Result of successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResult {
    /// Signed bearer token
    pub access_token: String,
    /// Instant after which the token is refused
    pub expires_at: DateTime<Utc>,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for token signing
    /// * `token_ttl` - Lifetime of every issued token
    pub fn new(jwt_secret: &[u8], token_ttl: Duration) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            token_codec: TokenCodec::new(jwt_secret, token_ttl),
        }
    }

    /// Hash a password for storage.
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and issue a token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `subject` - Principal identifier to bind into the token
    /// * `roles` - Role names to embed
    /// * `now` - Issue instant
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash is unreadable
    /// * `JwtError` - Token generation failed
    pub fn authenticate<I, R>(
        &self,
        password: &str,
        stored_hash: &str,
        subject: &str,
        roles: I,
        now: DateTime<Utc>,
    ) -> Result<AuthenticationResult, AuthenticationError>
    where
        I: IntoIterator<Item = R>,
        R: ToString,
    {
        if !self.password_hasher.matches(password, stored_hash)? {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.issue_token(subject, roles, now)?)
    }

    /// Spend the same work as a credential check when there is nothing to
    /// check against, so an unknown identifier is not distinguishable by
    /// response time. Always yields `InvalidCredentials`.
    pub fn reject_unknown(&self, password: &str) -> AuthenticationError {
        let _ = self.password_hasher.hash(password);
        AuthenticationError::InvalidCredentials
    }

    /// Issue a token without password verification.
    ///
    /// Used right after registration, when the credential was just set.
    pub fn issue_token<I, R>(
        &self,
        subject: &str,
        roles: I,
        now: DateTime<Utc>,
    ) -> Result<AuthenticationResult, JwtError>
    where
        I: IntoIterator<Item = R>,
        R: ToString,
    {
        let access_token = self.token_codec.issue(subject, roles, now)?;

        Ok(AuthenticationResult {
            access_token,
            expires_at: now + self.token_codec.ttl(),
        })
    }

    /// Verify a bearer token at `now`.
    pub fn verify_token(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenRejection> {
        self.token_codec.verify(token, now)
    }
}
