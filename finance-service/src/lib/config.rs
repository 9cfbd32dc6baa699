use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Minimum signing secret length for HS256.
pub const MIN_JWT_SECRET_BYTES: usize = 32;

/// Longest accepted token lifetime (one year).
pub const MAX_JWT_EXPIRATION_HOURS: i64 = 24 * 365;

/// Application configuration for finance-service.
///
/// Loaded from configuration files with environment variable overrides.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
}

/// PostgreSQL database configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// HTTP server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

/// Token signing configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_expiration_hours")]
    pub expiration_hours: i64,
}

fn default_expiration_hours() -> i64 {
    24
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::default().separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject settings the service cannot run safely with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(ConfigError::Message(format!(
                "jwt.secret must be at least {} bytes",
                MIN_JWT_SECRET_BYTES
            )));
        }
        if self.jwt.expiration_hours <= 0 {
            return Err(ConfigError::Message(
                "jwt.expiration_hours must be positive".to_string(),
            ));
        }
        if self.jwt.expiration_hours > MAX_JWT_EXPIRATION_HOURS {
            return Err(ConfigError::Message(format!(
                "jwt.expiration_hours must be at most {}",
                MAX_JWT_EXPIRATION_HOURS
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str, expiration_hours: i64) -> Config {
        Config {
            database: DatabaseConfig {
                url: "postgresql://localhost/finance".to_string(),
            },
            server: ServerConfig { http_port: 8080 },
            jwt: JwtConfig {
                secret: secret.to_string(),
                expiration_hours,
            },
        }
    }

    #[test]
    fn test_validate_accepts_long_secret() {
        assert!(config("test-secret-key-for-jwt-signing-at-least-32-bytes", 24)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_validate_rejects_short_secret() {
        assert!(config("short", 24).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_lifetime() {
        assert!(config("test-secret-key-for-jwt-signing-at-least-32-bytes", 0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_bounds_lifetime() {
        let secret = "test-secret-key-for-jwt-signing-at-least-32-bytes";

        assert!(config(secret, MAX_JWT_EXPIRATION_HOURS).validate().is_ok());
        assert!(config(secret, MAX_JWT_EXPIRATION_HOURS + 1)
            .validate()
            .is_err());
        assert!(config(secret, 1_000_000_000_000).validate().is_err());
    }

    #[test]
    fn test_load_prefers_environment() {
        let secret = "secret-from-environment-at-least-32-bytes";
        env::set_var("JWT__SECRET", secret);
        env::set_var("JWT__EXPIRATION_HOURS", "12");

        let loaded = Config::load();

        env::remove_var("JWT__SECRET");
        env::remove_var("JWT__EXPIRATION_HOURS");

        let loaded = loaded.expect("Configuration should load");
        assert_eq!(loaded.jwt.secret, secret);
        assert_eq!(loaded.jwt.expiration_hours, 12);
    }
}
