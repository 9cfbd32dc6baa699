use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Claims carried by an access token.
///
/// Binds a principal ID to the issue and expiry instants. Role
/// names are included for clients; the server re-resolves roles from the
/// credential store on every request and never trusts these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (principal ID)
    pub sub: String,

    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,

    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,

    /// Role names at issue time
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Claims {
    /// Create claims for a subject issued at `now` and valid for `ttl`.
    ///
    /// # Arguments
    /// * `subject` - Principal ID
    /// * `roles` - Role names to embed
    /// * `now` - Issue instant
    /// * `ttl` - Token lifetime
    ///
    /// # Returns
    /// Claims with sub, iat, exp, and roles set
    pub fn new<I, R>(subject: impl ToString, roles: I, now: DateTime<Utc>, ttl: Duration) -> Self
    where
        I: IntoIterator<Item = R>,
        R: ToString,
    {
        Self {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            roles: roles.into_iter().map(|r| r.to_string()).collect(),
        }
    }

    /// Check if the token is expired at `current_timestamp`.
    ///
    /// A token is valid strictly before its expiry instant.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }
}
