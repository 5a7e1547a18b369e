pub mod config;

pub use config::ConnectOptions;

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use deadpool_postgres::{Object, Pool, Runtime};
use lazy_static::lazy_static;
use tokio::time::Instant;
use tokio_postgres::NoTls;
use tracing::{debug, info};

use crate::error::DbError;

lazy_static! {
    static ref GLOBAL_POOL: RwLock<Option<PoolHandle>> = RwLock::new(None);
}

/// Shared handle to a `deadpool-postgres` pool plus the timeout applied to each
/// acquire-and-query round trip. Cloning is cheap.
#[derive(Clone, Debug)]
pub struct PoolHandle {
    pool: Pool,
    timeout: Duration,
}

impl PoolHandle {
    #[must_use]
    pub fn new(pool: Pool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Build the pool and prove it works by checking out one connection.
    ///
    /// # Errors
    /// Returns [`DbError::Config`] for invalid options and [`DbError::Connect`] when the pool
    /// cannot be created or the first connection fails.
    pub async fn from_options(opts: &ConnectOptions) -> Result<Self, DbError> {
        let pg_config = opts.to_pg_config()?;
        let pool = pg_config
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| DbError::Connect(format!("failed to create postgres pool: {e}")))?;
        let handle = Self::new(pool, opts.timeout());

        // the checked-out connection goes straight back to the pool
        drop(handle.acquire().await?);
        Ok(handle)
    }

    #[must_use]
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check out a connection within this handle's timeout.
    ///
    /// # Errors
    /// Returns [`DbError::Connect`] when the pool fails or the wait times out.
    pub async fn acquire(&self) -> Result<Object, DbError> {
        self.acquire_before(Instant::now() + self.timeout).await
    }

    /// Check out a connection, giving up at `deadline`.
    ///
    /// # Errors
    /// Returns [`DbError::Connect`] when the pool fails or the deadline passes.
    pub async fn acquire_before(&self, deadline: Instant) -> Result<Object, DbError> {
        let conn = tokio::time::timeout_at(deadline, self.pool.get())
            .await
            .map_err(|_| DbError::Connect("timed out waiting for a pooled connection".into()))?
            .map_err(|e| DbError::Connect(e.to_string()))?;
        debug!(status = ?self.pool.status(), "acquired connection");
        Ok(conn)
    }
}

/// Connect with explicit settings and install the result as the process-wide pool.
///
/// # Errors
/// Returns [`DbError::Connect`] if the settings are incomplete (an empty host, user or
/// database, port 0) or the server cannot be reached.
pub async fn connect(
    host: &str,
    port: u16,
    user: &str,
    password: &str,
    database: &str,
) -> Result<PoolHandle, DbError> {
    connect_with(&ConnectOptions::new(host, port, user, password, database))
        .await
        .map_err(|err| match err {
            DbError::Config(msg) => DbError::Connect(msg),
            other => other,
        })
}

/// [`connect`] with full options (pool size, timeout).
///
/// # Errors
/// Returns [`DbError::Config`] for invalid options or [`DbError::Connect`] on failure.
pub async fn connect_with(opts: &ConnectOptions) -> Result<PoolHandle, DbError> {
    let handle = PoolHandle::from_options(opts).await?;
    install(handle.clone());
    info!(host = %opts.host, port = opts.port, database = %opts.database, "connected to postgres");
    Ok(handle)
}

/// Replace the process-wide pool.
pub fn install(handle: PoolHandle) {
    let mut slot = GLOBAL_POOL.write().unwrap_or_else(PoisonError::into_inner);
    *slot = Some(handle);
}

/// The process-wide pool installed by [`connect`].
///
/// # Errors
/// Returns [`DbError::NotInstantiated`] before any pool has been installed.
pub fn global() -> Result<PoolHandle, DbError> {
    GLOBAL_POOL
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .ok_or(DbError::NotInstantiated)
}
