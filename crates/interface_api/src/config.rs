//! Layered server configuration
//!
//! Sources, lowest priority first:
//! 1. the defaults below
//! 2. an optional `config/party-api.{toml,yaml,json}` file
//! 3. `API_`-prefixed environment variables, with `__` between section and
//!    key (`API_SERVER__PORT=9090`, `API_DATABASE__URL=postgres://...`)

use std::net::SocketAddr;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use infra_db::DatabaseConfig;

const CONFIG_FILE: &str = "config/party-api";
const ENV_PREFIX: &str = "API";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret for bearer tokens
    pub jwt_secret: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub statement_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/party".to_string(),
            max_connections: 10,
            statement_timeout_secs: 30,
        }
    }
}

impl DatabaseSettings {
    /// Pool settings for [`infra_db::create_pool`]
    pub fn pool_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(&self.url)
            .max_connections(self.max_connections)
            .statement_timeout(Duration::from_secs(self.statement_timeout_secs))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReferenceDataConfig {
    /// Locale served when a request names none or an unknown one
    pub default_locale: String,
    pub cache_ttl_secs: u64,
}

impl Default for ReferenceDataConfig {
    fn default() -> Self {
        Self {
            default_locale: domain_party::DEFAULT_LOCALE.to_string(),
            cache_ttl_secs: 600,
        }
    }
}

impl ReferenceDataConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Settings for the `party-api` server
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub database: DatabaseSettings,
    pub logging: LoggingConfig,
    pub reference_data: ReferenceDataConfig,
}

impl ApiConfig {
    /// Loads the file and environment layers over the defaults
    pub fn load() -> Result<Self, ConfigError> {
        let environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true);

        Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    pub fn server_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.server_addr().unwrap().to_string(), "0.0.0.0:8080");
        assert_eq!(config.reference_data.default_locale, "en-US");
        assert_eq!(config.reference_data.cache_ttl(), Duration::from_secs(600));
        assert!(!config.logging.json);
    }

    #[test]
    fn test_pool_config_carries_database_settings() {
        let settings = DatabaseSettings {
            max_connections: 4,
            statement_timeout_secs: 5,
            ..DatabaseSettings::default()
        };
        let pool = settings.pool_config();
        assert_eq!(pool.max_connections, 4);
        assert_eq!(pool.statement_timeout, Duration::from_secs(5));
        assert_eq!(pool.url, "postgres://localhost/party");
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config: ApiConfig = Config::builder()
            .set_override("server.port", 9090)
            .unwrap()
            .set_override("logging.json", true)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.logging.json);
        assert_eq!(config.database.max_connections, 10);
    }

    #[test]
    fn test_invalid_host_is_reported() {
        let config = ApiConfig {
            server: ServerConfig {
                host: "not a host".to_string(),
                port: 80,
            },
            ..ApiConfig::default()
        };
        assert!(config.server_addr().is_err());
    }
}
