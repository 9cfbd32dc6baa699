use std::collections::HashSet;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::JwtError;
use super::errors::TokenRejection;

/// Signed, time-bounded token codec.
///
/// Uses HS256 (HMAC with SHA-256) with a server-held secret. Holds no state
/// besides the key material and the token lifetime, so a single instance is
/// shared read-only by every request.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl TokenCodec {
    /// Create a new codec with a secret key and token lifetime.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (at least 32 bytes for HS256)
    /// * `ttl` - Lifetime applied to every issued token
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            ttl,
        }
    }

    /// Lifetime applied to issued tokens.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject` valid from `now` until `now + ttl`.
    ///
    /// # Arguments
    /// * `subject` - Principal identifier
    /// * `roles` - Role names to embed in the claims
    /// * `now` - Issue instant
    ///
    /// # Returns
    /// Encoded token string
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue<I, R>(
        &self,
        subject: &str,
        roles: I,
        now: DateTime<Utc>,
    ) -> Result<String, JwtError>
    where
        I: IntoIterator<Item = R>,
        R: ToString,
    {
        let claims = Claims::new(subject, roles, now, self.ttl);
        let header = Header::new(self.algorithm);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify a token's signature and expiry at `now`.
    ///
    /// The signature is checked before the claims are trusted, and the HMAC
    /// comparison is constant-time. Expiry is evaluated against the supplied
    /// instant rather than the system clock.
    ///
    /// # Arguments
    /// * `token` - Encoded token string
    /// * `now` - Verification instant
    ///
    /// # Returns
    /// Decoded claims
    ///
    /// # Errors
    /// * `Malformed` - Token structure, encoding, algorithm, or claims are invalid
    /// * `BadSignature` - Signature does not match the server key
    /// * `Expired` - `now` is at or past the expiry instant
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenRejection> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation())
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenRejection::BadSignature,
                ErrorKind::ExpiredSignature => TokenRejection::Expired,
                _ => TokenRejection::Malformed,
            })?;

        let claims = token_data.claims;
        if claims.is_expired(now.timestamp()) {
            return Err(TokenRejection::Expired);
        }

        Ok(claims)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked against the caller's clock in `verify`
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::from(["exp".to_string(), "sub".to_string()]);
        validation
    }
}
