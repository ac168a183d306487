//! Application configuration
//!
//! Loaded from a TOML file, by default `~/.config/staff-portal/config.toml`.
//! Every section and field has a default, so a partial file is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ports::CountMode;
use crate::shared::DEFAULT_PAGE_SIZE;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "PORTAL_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// `~/.config/staff-portal/config.toml`, or `./config.toml` without a home.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("staff-portal").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub security: SecurityConfig,
    pub portal: PortalConfig,
    pub logging: LoggingConfig,
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds to wait for in-flight work on shutdown.
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout: 30,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Hosted PostgREST endpoint (Supabase or compatible).
    Postgrest,
    /// Process-local tables; data is lost on exit.
    #[default]
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// Project base URL; `/rest/v1/` is appended.
    pub url: String,
    /// Anon or service key sent as `apikey` and bearer token.
    pub api_key: String,
    /// Postgres schema; empty means the server default.
    pub schema: String,
    pub timeout_secs: u64,
    pub count_mode: CountMode,
    /// Fill the in-memory backend with demo rows at startup.
    pub seed_on_start: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Memory,
            url: String::new(),
            api_key: String::new(),
            schema: String::new(),
            timeout_secs: 15,
            count_mode: CountMode::Exact,
            seed_on_start: true,
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    /// How often expired sessions are purged.
    pub sweep_interval_secs: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            session_ttl_hours: 8,
            sweep_interval_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub rows_per_page: u32,
    pub max_page_size: u32,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            rows_per_page: DEFAULT_PAGE_SIZE,
            max_page_size: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
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

/// Row counts for the demo seeder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub patients: u32,
    pub employees: u32,
    pub medications: u32,
    pub appointments: u32,
    pub billing: u32,
    pub prescriptions: u32,
    pub announcements: u32,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            patients: 50,
            employees: 20,
            medications: 15,
            appointments: 120,
            billing: 60,
            prescriptions: 80,
            announcements: 3,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let rendered = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, rendered).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.kind == BackendKind::Postgrest {
            if self.backend.url.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "backend.url is required for the postgrest backend".into(),
                ));
            }
            if self.backend.api_key.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "backend.api_key is required for the postgrest backend".into(),
                ));
            }
        }
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::Invalid("security.jwt_secret must not be empty".into()));
        }
        if self.security.session_ttl_hours <= 0 {
            return Err(ConfigError::Invalid(
                "security.session_ttl_hours must be positive".into(),
            ));
        }
        if self.portal.rows_per_page == 0 || self.portal.rows_per_page > self.portal.max_page_size {
            return Err(ConfigError::Invalid(
                "portal.rows_per_page must be between 1 and portal.max_page_size".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            port = 9090

            [backend]
            kind = "postgrest"
            url = "https://example.supabase.co"
            api_key = "anon"
            count_mode = "planned"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.backend.kind, BackendKind::Postgrest);
        assert_eq!(config.backend.count_mode, CountMode::Planned);
        assert_eq!(config.portal.rows_per_page, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_postgrest_requires_url_and_key() {
        let mut config = AppConfig::default();
        config.backend.kind = BackendKind::Postgrest;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        config.backend.url = "https://example.supabase.co".into();
        assert!(config.validate().is_err());
        config.backend.api_key = "anon".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_then_load() {
        let dir = std::env::temp_dir().join(format!("staff-portal-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.toml");
        let mut config = AppConfig::default();
        config.logging.json = true;
        config.seed.patients = 5;
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert!(loaded.logging.json);
        assert_eq!(loaded.seed.patients, 5);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = AppConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
