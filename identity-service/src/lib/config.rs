use std::env;
use std::time::Duration;

use auth::AuthError;
use auth::AuthSettings;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub revocation: RevocationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    /// Base64 (standard alphabet) signing secret
    pub secret: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .field("refresh_token_ttl_secs", &self.refresh_token_ttl_secs)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RevocationConfig {
    pub redis_url: String,
    pub timeout_ms: u64,
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
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }

    /// Validated token settings.
    ///
    /// # Errors
    /// * `ConfigInvalid` - Secret undecodable or shorter than 32 bytes, TTLs not
    ///   positive, access TTL not shorter than refresh TTL, or zero timeout
    pub fn auth_settings(&self) -> Result<AuthSettings, AuthError> {
        AuthSettings::new(
            &self.jwt.secret,
            Duration::from_secs(self.jwt.access_token_ttl_secs),
            Duration::from_secs(self.jwt.refresh_token_ttl_secs),
            Duration::from_millis(self.revocation.timeout_ms),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str, access: u64, refresh: u64) -> Config {
        Config {
            database: DatabaseConfig {
                url: "postgresql://localhost/identity".to_string(),
            },
            server: ServerConfig { http_port: 8080 },
            jwt: JwtConfig {
                secret: secret.to_string(),
                access_token_ttl_secs: access,
                refresh_token_ttl_secs: refresh,
            },
            revocation: RevocationConfig {
                redis_url: "redis://localhost:6379".to_string(),
                timeout_ms: 500,
            },
        }
    }

    const ZERO_KEY: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";

    #[test]
    fn test_auth_settings_valid() {
        let settings = config(ZERO_KEY, 900, 604_800).auth_settings().unwrap();

        assert_eq!(settings.access_token_ttl(), chrono::Duration::minutes(15));
        assert_eq!(settings.refresh_token_ttl(), chrono::Duration::days(7));
        assert_eq!(settings.revocation_timeout(), Duration::from_millis(500));
    }

    #[test]
    fn test_auth_settings_rejects_bad_values() {
        for bad in [
            config("not base64!", 900, 604_800),
            config("AAAAAAAAAAAAAAAAAAAAAA==", 900, 604_800),
            config(ZERO_KEY, 0, 604_800),
            config(ZERO_KEY, 604_800, 604_800),
        ] {
            assert!(matches!(
                bad.auth_settings(),
                Err(AuthError::ConfigInvalid(_))
            ));
        }
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", config(ZERO_KEY, 900, 604_800));
        assert!(!rendered.contains(ZERO_KEY));
    }
}
