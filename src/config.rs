//! Connection pool configuration.
//!
//! Recognized keys and their defaults match the MySQL target: host, port,
//! charset, autocommit, and pool sizing are optional; user, password, and db
//! must be present or `validate` fails with a configuration error.

use crate::error::{OrmError, OrmResult};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3306;
pub const DEFAULT_CHARSET: &str = "utf8";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_MIN_CONNECTIONS: u32 = 1;

/// Configuration for the process-wide connection pool.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct PoolConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub user: String,
    /// Sensitive - redacted from Debug output, never logged.
    pub password: String,
    pub db: String,
    #[serde(default = "default_charset")]
    pub charset: String,
    #[serde(default = "default_autocommit")]
    pub autocommit: bool,
    #[serde(default = "default_maxsize")]
    pub maxsize: u32,
    #[serde(default = "default_minsize")]
    pub minsize: u32,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_charset() -> String {
    DEFAULT_CHARSET.to_string()
}

fn default_autocommit() -> bool {
    true
}

fn default_maxsize() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

fn default_minsize() -> u32 {
    DEFAULT_MIN_CONNECTIONS
}

impl PoolConfig {
    /// Create a configuration with the required keys; everything else
    /// starts at its default value.
    pub fn new(
        user: impl Into<String>,
        password: impl Into<String>,
        db: impl Into<String>,
    ) -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_PORT,
            user: user.into(),
            password: password.into(),
            db: db.into(),
            charset: default_charset(),
            autocommit: true,
            maxsize: DEFAULT_MAX_CONNECTIONS,
            minsize: DEFAULT_MIN_CONNECTIONS,
        }
    }

    /// Validate the configuration before a pool is created.
    pub fn validate(&self) -> OrmResult<()> {
        if self.user.is_empty() {
            return Err(OrmError::config("'user' is required"));
        }
        if self.password.is_empty() {
            return Err(OrmError::config("'password' is required"));
        }
        if self.db.is_empty() {
            return Err(OrmError::config("'db' is required"));
        }
        if self.maxsize == 0 {
            return Err(OrmError::config("maxsize must be greater than 0"));
        }
        if self.minsize > self.maxsize {
            return Err(OrmError::config(format!(
                "minsize ({}) cannot exceed maxsize ({})",
                self.minsize, self.maxsize
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("db", &self.db)
            .field("charset", &self.charset)
            .field("autocommit", &self.autocommit)
            .field("maxsize", &self.maxsize)
            .field("minsize", &self.minsize)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PoolConfig::new("www", "secret", "awesome");
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 3306);
        assert_eq!(config.charset, "utf8");
        assert!(config.autocommit);
        assert_eq!(config.maxsize, 10);
        assert_eq!(config.minsize, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_required_keys() {
        assert!(PoolConfig::new("", "secret", "awesome").validate().is_err());
        assert!(PoolConfig::new("www", "", "awesome").validate().is_err());
        assert!(PoolConfig::new("www", "secret", "").validate().is_err());
    }

    #[test]
    fn test_pool_size_bounds() {
        let mut config = PoolConfig::new("www", "secret", "awesome");
        config.maxsize = 0;
        assert!(config.validate().is_err());

        config.maxsize = 2;
        config.minsize = 5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cannot exceed"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = PoolConfig::new("www", "secret", "awesome");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: PoolConfig = serde_json::from_str(
            r#"{"user": "www", "password": "secret", "db": "awesome", "port": 3307}"#,
        )
        .unwrap();
        assert_eq!(config.port, 3307);
        assert_eq!(config.host, "localhost");
        assert_eq!(config.minsize, 1);
    }
}
