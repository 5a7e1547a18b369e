use async_trait::async_trait;
use tokio::time::Instant;
use tracing::debug;

use crate::error::DbError;
use crate::pool::PoolHandle;
use crate::postgres::{as_refs, build_row_results};
use crate::results::RowResult;
use crate::statement::Statement;
use crate::translation::PositionalQuery;

/// Where a statement goes: straight to the database, or into a pending batch.
///
/// Data-access code takes `&mut impl Execute` so the same call site works inside and
/// outside a transaction.
///
/// ```rust,no_run
/// use stmt_middleware::prelude::*;
///
/// # async fn demo(pool: PoolHandle) -> Result<(), DbError> {
/// async fn touch<E: Execute + ?Sized>(target: &mut E) -> Result<Vec<RowResult>, DbError> {
///     target.execute(Statement::prepare("SELECT 1 AS one")).await
/// }
///
/// let mut pool = pool;
/// let rows = touch(&mut pool).await?;
/// assert_eq!(rows.len(), 1);
///
/// let mut tx = Transaction::begin(pool.clone());
/// assert!(touch(&mut tx).await?.is_empty());
/// tx.run().await?;
/// # Ok(()) }
/// ```
#[async_trait]
pub trait Execute: Send {
    /// Run `stmt` now and return its rows, or queue it and return no rows.
    ///
    /// # Errors
    /// [`DbError::ParseQuery`] when placeholders cannot be resolved, [`DbError::Connect`] when
    /// no connection could be acquired, [`DbError::Query`]/[`DbError::QueryTimeout`] when the
    /// database rejects or does not answer the query.
    async fn execute(&mut self, stmt: Statement) -> Result<Vec<RowResult>, DbError>;
}

#[async_trait]
impl Execute for PoolHandle {
    async fn execute(&mut self, stmt: Statement) -> Result<Vec<RowResult>, DbError> {
        run_statement(self, &stmt).await
    }
}

/// Resolve placeholders, wrapping failures as [`DbError::ParseQuery`].
///
/// # Errors
/// Returns [`DbError::ParseQuery`] around the underlying [`DbError::MissingValue`].
pub fn resolve(stmt: &Statement) -> Result<PositionalQuery, DbError> {
    stmt.to_positional()
        .map_err(|err| DbError::ParseQuery(Box::new(err)))
}

/// Run one statement on a pooled connection and materialize its rows.
///
/// A single deadline of `pool.timeout()` covers both acquiring the connection and running
/// the query; the connection returns to the pool when this function exits.
///
/// # Errors
/// See [`Execute::execute`].
pub async fn run_statement(pool: &PoolHandle, stmt: &Statement) -> Result<Vec<RowResult>, DbError> {
    let resolved = resolve(stmt)?;
    let timeout = pool.timeout();
    let deadline = Instant::now() + timeout;

    let client = pool.acquire_before(deadline).await?;
    debug!(sql = %resolved.sql, params = resolved.values.len(), "executing statement");

    let params = as_refs(&resolved.values);
    let rows = tokio::time::timeout_at(deadline, client.query(resolved.sql.as_str(), &params))
        .await
        .map_err(|_| DbError::QueryTimeout(timeout))??;
    build_row_results(&rows)
}

/// Execute and insist on at least one row.
///
/// Against a pending batch this always fails, since queued statements return no rows.
///
/// # Errors
/// Returns [`DbError::MissingResult`] when nothing came back, otherwise as
/// [`Execute::execute`].
pub async fn fetch_all<E: Execute + ?Sized>(
    target: &mut E,
    stmt: Statement,
) -> Result<Vec<RowResult>, DbError> {
    let rows = target.execute(stmt).await?;
    if rows.is_empty() {
        return Err(DbError::MissingResult);
    }
    Ok(rows)
}

/// Execute and return only the first row.
///
/// # Errors
/// Same as [`fetch_all`].
pub async fn fetch_one<E: Execute + ?Sized>(
    target: &mut E,
    stmt: Statement,
) -> Result<RowResult, DbError> {
    fetch_all(target, stmt)
        .await?
        .into_iter()
        .next()
        .ok_or(DbError::MissingResult)
}
