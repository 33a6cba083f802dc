//! Configuration loading and management
//!
//! Settings come from a YAML file, then selected environment variables are
//! layered on top:
//!
//! ```yaml
//! server:
//!   host: 0.0.0.0
//!   port: 8000
//!   cors: true
//! pricing:
//!   large_unit_price: 10000
//!   small_unit_price: 5000
//! auth:
//!   tokens:
//!     - token: s3cret
//!       username: admin
//!       admin: true
//! ```

use crate::core::auth::{AuthContext, TokenAuthProvider};
use crate::core::error::ConfigError;
use crate::core::pricing::UnitPrices;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "LONTONG_CONFIG";

/// Config file used when [`CONFIG_PATH_ENV`] is unset
pub const DEFAULT_CONFIG_PATH: &str = "config/lontong.yaml";

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub pricing: UnitPrices,
    pub auth: AuthConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Answer cross-origin requests from any origin
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors: false,
        }
    }
}

impl ServerConfig {
    /// `host:port` for binding
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Static bearer tokens
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub tokens: Vec<TokenConfig>,
}

/// One bearer token and the identity it stands for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    pub token: String,
    pub username: String,
    #[serde(default)]
    pub admin: bool,
}

impl AuthConfig {
    pub fn has_admin(&self) -> bool {
        self.tokens.iter().any(|t| t.admin)
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load from the process environment
    ///
    /// Reads the file named by `LONTONG_CONFIG` (falling back to built-in
    /// defaults when the default path does not exist), applies environment
    /// overrides and validates the result.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Same as [`load`](Self::load) with an explicit variable lookup
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = match env(CONFIG_PATH_ENV) {
            Some(path) => Self::from_yaml_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_yaml_file(DEFAULT_CONFIG_PATH)?
            }
            None => {
                tracing::info!("no config file found, using defaults");
                Self::default()
            }
        };

        let config = config.with_env_overrides(&env)?;
        config.validate()?;
        Ok(config)
    }

    /// Layer `LONTONG_*` variables over the file values
    pub fn with_env_overrides(
        mut self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(price) = env("LONTONG_LARGE_PRICE") {
            self.pricing.large_unit_price = parse_env("LONTONG_LARGE_PRICE", &price)?;
        }
        if let Some(price) = env("LONTONG_SMALL_PRICE") {
            self.pricing.small_unit_price = parse_env("LONTONG_SMALL_PRICE", &price)?;
        }
        if let Some(host) = env("LONTONG_HOST") {
            self.server.host = host;
        }
        if let Some(port) = env("LONTONG_PORT") {
            self.server.port = parse_env("LONTONG_PORT", &port)?;
        }

        if let Some(token) = env("LONTONG_ADMIN_TOKEN") {
            if self.auth.has_admin() {
                tracing::warn!("LONTONG_ADMIN_TOKEN ignored: an admin token is already configured");
            } else {
                let username =
                    env("LONTONG_ADMIN_USERNAME").unwrap_or_else(|| "admin".to_string());
                tracing::info!(%username, "registered bootstrap admin token");
                self.auth.tokens.push(TokenConfig {
                    token,
                    username,
                    admin: true,
                });
            }
        }

        Ok(self)
    }

    /// Reject values the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, price) in [
            ("pricing.large_unit_price", self.pricing.large_unit_price),
            ("pricing.small_unit_price", self.pricing.small_unit_price),
        ] {
            if price < Decimal::ZERO {
                return Err(invalid(field, format!("must not be negative, got {}", price)));
            }
        }

        let mut seen = HashSet::new();
        for (i, entry) in self.auth.tokens.iter().enumerate() {
            if entry.token.trim().is_empty() {
                return Err(invalid(format!("auth.tokens[{}].token", i), "must not be empty"));
            }
            if !seen.insert(entry.token.as_str()) {
                return Err(invalid(
                    format!("auth.tokens[{}].token", i),
                    "duplicates an earlier token",
                ));
            }
        }

        Ok(())
    }

    /// Token table for the auth middleware
    pub fn auth_provider(&self) -> TokenAuthProvider {
        self.auth
            .tokens
            .iter()
            .fold(TokenAuthProvider::new(), |provider, entry| {
                let context = AuthContext::from_flags(entry.username.clone(), true, entry.admin);
                provider.with_token(entry.token.clone(), context)
            })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| invalid(key, e.to_string()))
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.into(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config.pricing, UnitPrices::default());
        assert_eq!(config.server.addr(), "127.0.0.1:8000");
        assert!(!config.server.cors);
        assert!(config.auth.tokens.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
server:
  host: 0.0.0.0
  port: 9000
  cors: true
pricing:
  large_unit_price: 12000
  small_unit_price: "6000.50"
auth:
  tokens:
    - token: admin-token
      username: siti
      admin: true
    - token: staff-token
      username: budi
"#;
        let config = AppConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.server.addr(), "0.0.0.0:9000");
        assert!(config.server.cors);
        assert_eq!(config.pricing.large_unit_price, Decimal::from(12_000));
        assert_eq!(config.pricing.small_unit_price.to_string(), "6000.50");
        assert_eq!(config.auth.tokens.len(), 2);
        assert!(!config.auth.tokens[1].admin);
        assert!(config.auth.has_admin());
    }

    #[test]
    fn test_invalid_yaml() {
        let err = AppConfig::from_yaml_str("pricing: [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::default()
            .with_env_overrides(env(&[
                ("LONTONG_LARGE_PRICE", "11000"),
                ("LONTONG_SMALL_PRICE", "5500"),
                ("LONTONG_HOST", "0.0.0.0"),
                ("LONTONG_PORT", "8080"),
            ]))
            .unwrap();
        assert_eq!(
            config.pricing,
            UnitPrices::new(Decimal::from(11_000), Decimal::from(5_500))
        );
        assert_eq!(config.server.addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_bad_env_value() {
        let err = AppConfig::default()
            .with_env_overrides(env(&[("LONTONG_PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "LONTONG_PORT"));
    }

    #[test]
    fn test_admin_bootstrap() {
        let config = AppConfig::default()
            .with_env_overrides(env(&[("LONTONG_ADMIN_TOKEN", "boot")]))
            .unwrap();
        assert_eq!(config.auth.tokens.len(), 1);
        assert_eq!(config.auth.tokens[0].username, "admin");
        assert!(config.auth.tokens[0].admin);
    }

    #[test]
    fn test_admin_bootstrap_skipped_when_admin_exists() {
        let mut config = AppConfig::default();
        config.auth.tokens.push(TokenConfig {
            token: "existing".to_string(),
            username: "siti".to_string(),
            admin: true,
        });
        let config = config
            .with_env_overrides(env(&[
                ("LONTONG_ADMIN_TOKEN", "boot"),
                ("LONTONG_ADMIN_USERNAME", "root"),
            ]))
            .unwrap();
        assert_eq!(config.auth.tokens.len(), 1);
        assert_eq!(config.auth.tokens[0].username, "siti");
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let mut config = AppConfig::default();
        config.pricing.small_unit_price = Decimal::from(-1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "pricing.small_unit_price"
        ));
    }

    #[test]
    fn test_validate_rejects_empty_and_duplicate_tokens() {
        let token = |token: &str| TokenConfig {
            token: token.to_string(),
            username: "u".to_string(),
            admin: false,
        };

        let mut config = AppConfig::default();
        config.auth.tokens = vec![token(" ")];
        assert!(config.validate().is_err());

        config.auth.tokens = vec![token("a"), token("a")];
        assert!(config.validate().is_err());

        config.auth.tokens = vec![token("a"), token("b")];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_auth_provider_maps_identities() {
        let mut config = AppConfig::default();
        config.auth.tokens = vec![
            TokenConfig {
                token: "t1".to_string(),
                username: "siti".to_string(),
                admin: true,
            },
            TokenConfig {
                token: "t2".to_string(),
                username: "budi".to_string(),
                admin: false,
            },
        ];
        let provider = config.auth_provider();
        assert_eq!(provider.len(), 2);
        assert!(provider.resolve("t1").unwrap().is_admin());
        let staff = provider.resolve("t2").unwrap();
        assert!(staff.is_authenticated() && !staff.is_admin());
        assert!(provider.resolve("t3").is_err());
    }

    #[test]
    fn test_load_with_missing_explicit_file_is_an_error() {
        let err = AppConfig::load_with(env(&[(CONFIG_PATH_ENV, "/nonexistent/lontong.yaml")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
