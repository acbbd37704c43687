use std::path::PathBuf;

use crate::auth::JwtConfig;

/// Server configuration
///
/// # Environment
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/bakery | working directory (database, logs) |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | DATABASE_PATH | `{WORK_DIR}/bakery.db` | SQLite file, `:memory:` for an in-memory store |
/// | ENVIRONMENT | development | development, staging or production |
/// | LOG_LEVEL | info | tracing max level |
/// | LOG_DIR | unset | daily rolling log files when the directory exists |
///
/// ```ignore
/// WORK_DIR=/data/bakery HTTP_PORT=8080 cargo run -p bakery-server
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    /// Explicit database location; derived from `work_dir` when unset
    pub database_path: Option<String>,
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub jwt: JwtConfig,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/bakery".into()),
            http_port: env_or("HTTP_PORT", 3000),
            database_path: std::env::var("DATABASE_PATH").ok(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
            jwt: JwtConfig::default(),
        }
    }

    /// Override the parts tests care about
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config.database_path = None;
        config
    }

    /// Resolved SQLite location
    pub fn database_path(&self) -> String {
        match &self.database_path {
            Some(path) => path.clone(),
            None => PathBuf::from(&self.work_dir)
                .join("bakery.db")
                .to_string_lossy()
                .into_owned(),
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_deref() == Some(":memory:")
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_path_derived_from_work_dir() {
        let config = Config::with_overrides("/tmp/bakery-test", 0);
        assert!(config.database_path().ends_with("bakery.db"));
        assert!(config.database_path().starts_with("/tmp/bakery-test"));
        assert!(!config.is_in_memory());
    }

    #[test]
    fn test_explicit_database_path_wins() {
        let mut config = Config::with_overrides("/tmp/bakery-test", 0);
        config.database_path = Some(":memory:".into());
        assert_eq!(config.database_path(), ":memory:");
        assert!(config.is_in_memory());
    }
}
