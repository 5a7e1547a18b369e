use std::time::Duration;

use clap::Parser;
use deadpool_postgres::{Config as PgConfig, PoolConfig};

use crate::error::DbError;

/// Default bound on acquiring a connection plus running one query.
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_POOL_SIZE: usize = 16;

/// Connection settings, from flags or the `DB_*` environment variables.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(about = "PostgreSQL connection settings")]
pub struct ConnectOptions {
    #[arg(long = "db-host", env = "DB_HOST", default_value = "localhost")]
    pub host: String,
    #[arg(long = "db-port", env = "DB_PORT", default_value_t = 5432)]
    pub port: u16,
    #[arg(long = "db-user", env = "DB_USER")]
    pub user: String,
    #[arg(long = "db-password", env = "DB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    #[arg(long = "db-name", env = "DB_NAME")]
    pub database: String,
    #[arg(long = "db-pool-size", env = "DB_POOL_SIZE", default_value_t = DEFAULT_POOL_SIZE)]
    pub pool_size: usize,
    #[arg(long = "db-timeout-secs", env = "DB_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl ConnectOptions {
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            user: user.into(),
            password: Some(password.into()),
            database: database.into(),
            pool_size: DEFAULT_POOL_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// # Errors
    /// Returns [`DbError::Config`] naming the first invalid setting.
    pub fn validate(&self) -> Result<(), DbError> {
        if self.host.trim().is_empty() {
            return Err(DbError::Config("host is required".to_string()));
        }
        if self.port == 0 {
            return Err(DbError::Config("port must be non-zero".to_string()));
        }
        if self.user.trim().is_empty() {
            return Err(DbError::Config("user is required".to_string()));
        }
        if self.database.trim().is_empty() {
            return Err(DbError::Config("database is required".to_string()));
        }
        if self.pool_size == 0 {
            return Err(DbError::Config("pool size must be non-zero".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(DbError::Config("timeout must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Validated `deadpool-postgres` configuration.
    ///
    /// The pool's own wait timeout is left unset; callers bound acquire and query together.
    ///
    /// # Errors
    /// Returns [`DbError::Config`] when [`validate`](Self::validate) fails.
    pub fn to_pg_config(&self) -> Result<PgConfig, DbError> {
        self.validate()?;
        let mut cfg = PgConfig::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.user = Some(self.user.clone());
        cfg.password.clone_from(&self.password);
        cfg.dbname = Some(self.database.clone());
        cfg.pool = Some(PoolConfig::new(self.pool_size));
        Ok(cfg)
    }
}
