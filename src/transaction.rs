use async_trait::async_trait;
use tokio::time::error::Elapsed;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, warn};

use crate::error::DbError;
use crate::executor::{Execute, resolve, run_statement};
use crate::pool::{self, PoolHandle};
use crate::postgres::{as_refs, build_row_results};
use crate::results::RowResult;
use crate::statement::Statement;

/// Statements queued for one atomic run.
///
/// Nothing touches the database until [`run`](Self::run), which replays the batch in
/// insertion order inside a single native transaction.
#[derive(Debug, Clone)]
pub struct Transaction {
    pool: PoolHandle,
    statements: Vec<Statement>,
}

impl Transaction {
    #[must_use]
    pub fn begin(pool: PoolHandle) -> Self {
        Self {
            pool,
            statements: Vec::new(),
        }
    }

    pub fn add_statement(&mut self, stmt: Statement) -> &mut Self {
        self.statements.push(stmt);
        self
    }

    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Execute every queued statement and commit, or roll back on the first failure.
    ///
    /// All placeholders are resolved before a connection is taken. One deadline of
    /// `pool.timeout()` covers the whole batch: acquire, begin, every statement and the
    /// commit. Returns the rows of each statement, in order.
    ///
    /// # Errors
    /// [`DbError::ParseQuery`] when any statement fails to resolve (nothing runs),
    /// [`DbError::Connect`] when no connection is available before the deadline,
    /// [`DbError::QueryTimeout`] when the deadline passes once the batch has started, and
    /// the failing statement's [`DbError::Query`] after the batch was rolled back.
    pub async fn run(self) -> Result<Vec<Vec<RowResult>>, DbError> {
        let resolved = self
            .statements
            .iter()
            .map(resolve)
            .collect::<Result<Vec<_>, _>>()?;
        if resolved.is_empty() {
            return Ok(Vec::new());
        }

        let timeout = self.pool.timeout();
        let deadline = Instant::now() + timeout;
        let timed_out = |_: Elapsed| DbError::QueryTimeout(timeout);

        let mut client = self.pool.acquire_before(deadline).await?;
        let tx = timeout_at(deadline, client.transaction())
            .await
            .map_err(timed_out)??;

        let mut results = Vec::with_capacity(resolved.len());
        for (idx, query) in resolved.iter().enumerate() {
            debug!(statement = idx, sql = %query.sql, "executing batched statement");
            let params = as_refs(&query.values);
            let outcome = match timeout_at(deadline, tx.query(query.sql.as_str(), &params)).await {
                Ok(Ok(rows)) => build_row_results(&rows),
                Ok(Err(err)) => Err(DbError::Query(err)),
                Err(elapsed) => Err(timed_out(elapsed)),
            };

            match outcome {
                Ok(rows) => results.push(rows),
                Err(err @ DbError::QueryTimeout(_)) => {
                    // dropping the open transaction rolls it back
                    warn!(statement = idx, "deadline passed, abandoning transaction");
                    return Err(err);
                }
                Err(err) => {
                    warn!(statement = idx, error = %err, "statement failed, rolling back transaction");
                    match timeout_at(deadline, tx.rollback()).await {
                        Ok(Ok(())) => {}
                        Ok(Err(rollback_err)) => warn!(error = %rollback_err, "rollback failed"),
                        Err(_) => warn!("rollback did not finish before the deadline"),
                    }
                    return Err(err);
                }
            }
        }

        timeout_at(deadline, tx.commit())
            .await
            .map_err(timed_out)??;
        debug!(statements = results.len(), "transaction committed");
        Ok(results)
    }
}

#[async_trait]
impl Execute for Transaction {
    async fn execute(&mut self, stmt: Statement) -> Result<Vec<RowResult>, DbError> {
        self.add_statement(stmt);
        Ok(Vec::new())
    }
}

/// Idle/open state machine over a pool.
///
/// While idle, [`execute`](Execute::execute) runs statements immediately; after
/// [`begin`](Self::begin) it queues them until [`run`](Self::run).
#[derive(Debug, Clone)]
pub struct Session {
    pool: PoolHandle,
    pending: Option<Transaction>,
}

impl Session {
    #[must_use]
    pub fn new(pool: PoolHandle) -> Self {
        Self {
            pool,
            pending: None,
        }
    }

    /// A session on the process-wide pool.
    ///
    /// # Errors
    /// Returns [`DbError::NotInstantiated`] before [`connect`](crate::pool::connect).
    pub fn from_global() -> Result<Self, DbError> {
        Ok(Self::new(pool::global()?))
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn pending(&self) -> Option<&Transaction> {
        self.pending.as_ref()
    }

    /// Open a batch. An already open batch is discarded along with its statements.
    pub fn begin(&mut self) {
        let fresh = Transaction::begin(self.pool.clone());
        if let Some(previous) = self.pending.replace(fresh) {
            warn!(
                discarded = previous.len(),
                "transaction begun while another was open; pending statements dropped"
            );
        }
    }

    /// Drop the open batch without running it.
    pub fn discard(&mut self) -> Option<Transaction> {
        self.pending.take()
    }

    /// Run the open batch and return to idle. Without an open batch this does nothing.
    ///
    /// # Errors
    /// See [`Transaction::run`]; the session is idle afterwards either way.
    pub async fn run(&mut self) -> Result<Vec<Vec<RowResult>>, DbError> {
        match self.pending.take() {
            Some(tx) => tx.run().await,
            None => {
                debug!("run called without an open transaction");
                Ok(Vec::new())
            }
        }
    }
}

#[async_trait]
impl Execute for Session {
    async fn execute(&mut self, stmt: Statement) -> Result<Vec<RowResult>, DbError> {
        match self.pending.as_mut() {
            Some(tx) => tx.execute(stmt).await,
            None => run_statement(&self.pool, &stmt).await,
        }
    }
}
