use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub pagination: PaginationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
    Testing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub max_request_size_bytes: usize,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    pub access_token_expires: u64,
    /// Refresh token lifetime in seconds.
    pub refresh_token_expires: u64,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
    pub denylist_purge_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub default_size: u32,
    pub max_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

impl AppConfig {
    /// Preset, optional YAML overlay from `APP_CONFIG_FILE`, then env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::preset(Self::environment_from_env());
        if let Ok(path) = env::var("APP_CONFIG_FILE") {
            config = config.with_yaml_file(&path)?;
        }
        let config = config.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn environment_from_env() -> Environment {
        match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("testing") | Ok("test") => Environment::Testing,
            _ => Environment::Development,
        }
    }

    pub fn preset(environment: Environment) -> Self {
        match environment {
            Environment::Production => Self::production(),
            Environment::Testing => Self::testing(),
            Environment::Development => Self::development(),
        }
    }

    /// Overlay a YAML file onto this config. Keys absent from the file keep
    /// their current value.
    pub fn with_yaml_file(self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.with_yaml_str(&raw, &path.display().to_string())
    }

    fn with_yaml_str(self, raw: &str, origin: &str) -> Result<Self, ConfigError> {
        let yaml_error = |source: serde_yaml::Error| ConfigError::Yaml {
            path: origin.to_string(),
            source,
        };

        let overlay: serde_yaml::Value = serde_yaml::from_str(raw).map_err(yaml_error)?;
        if overlay.is_null() {
            return Ok(self);
        }

        let mut merged = serde_yaml::to_value(&self).map_err(yaml_error)?;
        merge_yaml(&mut merged, overlay);
        serde_yaml::from_value(merged).map_err(yaml_error)
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // API overrides
        if let Ok(v) = env::var("API_HOST") {
            self.api.host = v;
        }
        if let Some(port) = env::var("API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.api.port = port;
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_TOKEN_EXPIRES") {
            self.security.access_token_expires = v.parse().unwrap_or(self.security.access_token_expires);
        }
        if let Ok(v) = env::var("JWT_REFRESH_TOKEN_EXPIRES") {
            self.security.refresh_token_expires = v.parse().unwrap_or(self.security.refresh_token_expires);
        }
        if let Ok(v) = env::var("BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("SECURITY_DENYLIST_PURGE_INTERVAL_SECS") {
            self.security.denylist_purge_interval_secs =
                v.parse().unwrap_or(self.security.denylist_purge_interval_secs);
        }

        // Pagination overrides
        if let Ok(v) = env::var("PAGINATION_DEFAULT_SIZE") {
            self.pagination.default_size = v.parse().unwrap_or(self.pagination.default_size);
        }
        if let Ok(v) = env::var("PAGINATION_MAX_SIZE") {
            self.pagination.max_size = v.parse().unwrap_or(self.pagination.max_size);
        }

        if let Ok(v) = env::var("LOG_LEVEL") {
            self.logging.level = v;
        }

        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() && self.environment != Environment::Testing {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        if self.security.access_token_expires == 0 || self.security.refresh_token_expires == 0 {
            return Err(ConfigError::Invalid("token lifetimes must be positive".to_string()));
        }
        if self.security.denylist_purge_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "denylist purge interval must be positive".to_string(),
            ));
        }
        if !(4..=31).contains(&self.security.bcrypt_cost) {
            return Err(ConfigError::Invalid(format!(
                "bcrypt cost {} outside 4..=31",
                self.security.bcrypt_cost
            )));
        }
        if self.pagination.default_size == 0 || self.pagination.default_size > self.pagination.max_size {
            return Err(ConfigError::Invalid(format!(
                "default page size {} must be within 1..={}",
                self.pagination.default_size, self.pagination.max_size
            )));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
                enable_request_logging: true,
            },
            security: SecurityConfig {
                jwt_secret: "development-secret-change-me".to_string(),
                access_token_expires: 15 * 60,
                refresh_token_expires: 30 * 24 * 60 * 60,
                bcrypt_cost: 12,
                cors_origins: vec!["http://localhost".to_string()],
                denylist_purge_interval_secs: 60 * 60,
            },
            pagination: PaginationConfig {
                default_size: 50,
                max_size: 100,
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
                enable_request_logging: false,
            },
            security: SecurityConfig {
                // must come from JWT_SECRET
                jwt_secret: String::new(),
                access_token_expires: 15 * 60,
                refresh_token_expires: 30 * 24 * 60 * 60,
                bcrypt_cost: 12,
                cors_origins: vec!["http://localhost".to_string()],
                denylist_purge_interval_secs: 60 * 60,
            },
            pagination: PaginationConfig {
                default_size: 50,
                max_size: 100,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }

    pub fn testing() -> Self {
        Self {
            environment: Environment::Testing,
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 5,
                connection_timeout: 1,
                run_migrations: true,
            },
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                max_request_size_bytes: 1024 * 1024,
                enable_request_logging: false,
            },
            security: SecurityConfig {
                jwt_secret: "testing-secret".to_string(),
                access_token_expires: 15 * 60,
                refresh_token_expires: 24 * 60 * 60,
                bcrypt_cost: 4,
                cors_origins: vec!["http://localhost".to_string()],
                denylist_purge_interval_secs: 60,
            },
            pagination: PaginationConfig {
                default_size: 50,
                max_size: 100,
            },
            logging: LoggingConfig {
                level: "warn".to_string(),
            },
        }
    }
}

/// Recursively merge `overlay` into `base`; mappings merge key by key, any
/// other value replaces.
fn merge_yaml(base: &mut serde_yaml::Value, overlay: serde_yaml::Value) {
    match (base, overlay) {
        (serde_yaml::Value::Mapping(base), serde_yaml::Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge_yaml(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.api.port, 8000);
        assert_eq!(config.security.access_token_expires, 900);
        assert_eq!(config.pagination.default_size, 50);
        assert!(config.database.run_migrations);
    }

    #[test]
    fn test_production_requires_secret_and_database() {
        let mut config = AppConfig::production();
        assert!(matches!(config.validate(), Err(ConfigError::Missing("DATABASE_URL"))));

        config.database.url = "postgres://localhost/chatbot".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Missing("JWT_SECRET"))));

        config.security.jwt_secret = "s3cret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_testing_config_is_valid_without_database() {
        let config = AppConfig::testing();
        assert!(config.validate().is_ok());
        assert_eq!(config.security.bcrypt_cost, 4);
    }

    #[test]
    fn test_rejects_default_page_size_above_max() {
        let mut config = AppConfig::testing();
        config.pagination.default_size = 500;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_zero_purge_interval() {
        let mut config = AppConfig::testing();
        config.security.denylist_purge_interval_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_partial_yaml_overrides_only_its_keys() {
        let yaml = "pagination:\n  max_size: 200\nsecurity:\n  cors_origins: [\"https://chat.example.com\"]\n";
        let config = AppConfig::testing().with_yaml_str(yaml, "inline").unwrap();

        assert_eq!(config.pagination.max_size, 200);
        assert_eq!(config.pagination.default_size, 50);
        assert_eq!(config.security.cors_origins, vec!["https://chat.example.com".to_string()]);
        assert_eq!(config.security.jwt_secret, "testing-secret");
        assert_eq!(config.environment, Environment::Testing);
    }

    #[test]
    fn test_empty_yaml_keeps_preset() {
        let config = AppConfig::development().with_yaml_str("", "inline").unwrap();
        assert_eq!(config.api.port, 8000);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_yaml_with_wrong_type_is_rejected() {
        let result = AppConfig::testing().with_yaml_str("api:\n  port: eighty\n", "inline");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn test_yaml_overlay_roundtrips_sections() {
        let yaml = serde_yaml::to_string(&AppConfig::testing()).unwrap();
        let parsed: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.environment, Environment::Testing);
        assert_eq!(parsed.api.host, "127.0.0.1");
    }
}
