//! Authentication utilities library
//!
//! Provides the stateless authentication primitives used by the service:
//! - Credential hashing (Argon2id, build-time cost parameters)
//! - Signed, time-bounded bearer tokens (HS256)
//! - Authentication coordination
//!
//! The service defines its own principal model and credential store; these
//! types only know about identifiers, role names, and secrets.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.matches("my_password", &hash).unwrap());
//! ```
//!
//! ## Tokens
//! ```
//! use auth::TokenCodec;
//! use chrono::{Duration, Utc};
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!", Duration::hours(24));
//! let now = Utc::now();
//! let token = codec.issue("alice", ["USER"], now).unwrap();
//! let claims = codec.verify(&token, now).unwrap();
//! assert_eq!(claims.sub, "alice");
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::Authenticator;
//! use chrono::{Duration, Utc};
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!", Duration::hours(24));
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue token
//! let result = auth
//!     .authenticate("password123", &hash, "alice", ["USER"], Utc::now())
//!     .unwrap();
//!
//! // Every later request: verify token
//! let claims = auth.verify_token(&result.access_token, Utc::now()).unwrap();
//! assert_eq!(claims.sub, "alice");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::TokenCodec;
pub use jwt::TokenRejection;
pub use password::PasswordError;
pub use password::PasswordHasher;
