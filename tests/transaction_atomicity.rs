#![cfg(feature = "test-utils")]

use std::time::Duration;

use stmt_middleware::prelude::*;
use stmt_middleware::test_utils::{setup_postgres_embedded, stop_postgres_embedded};

fn insert(id: i32, note: &str) -> Statement {
    let mut stmt = Statement::prepare("INSERT INTO ledger (id, note) VALUES (:id:, :note:)");
    stmt.bind("id", id).bind("note", note);
    stmt
}

async fn ledger_count(pool: &mut PoolHandle) -> Result<i32, DbError> {
    let mut row = fetch_one(pool, Statement::prepare("SELECT count(*)::int AS n FROM ledger")).await?;
    let mut n = None;
    row.get("n", &mut n)?;
    Ok(n.unwrap_or_default())
}

#[test]
fn failing_statement_rolls_back_the_whole_batch() -> Result<(), Box<dyn std::error::Error>> {
    let pg = setup_postgres_embedded("tx_atomicity")?;
    let opts = pg.options.clone();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let mut pool = connect_with(&opts).await?;
        pool.execute(Statement::prepare(
            "CREATE TABLE ledger (id int PRIMARY KEY, note text NOT NULL)",
        ))
        .await?;

        // the second insert collides with the first on the primary key
        let mut tx = Transaction::begin(pool.clone());
        tx.add_statement(insert(1, "first"))
            .add_statement(insert(1, "duplicate"))
            .add_statement(insert(3, "third"));
        let err = tx.run().await.unwrap_err();
        assert!(matches!(err, DbError::Query(_)), "unexpected error: {err:?}");
        assert_eq!(ledger_count(&mut pool).await?, 0);

        let mut tx = Transaction::begin(pool.clone());
        tx.add_statement(insert(1, "first"))
            .add_statement(insert(2, "second"))
            .add_statement(insert(3, "third"));
        let results = tx.run().await?;
        assert_eq!(results.len(), 3);
        assert_eq!(ledger_count(&mut pool).await?, 3);

        Ok::<(), DbError>(())
    })?;

    stop_postgres_embedded(pg);
    Ok(())
}

#[test]
fn one_deadline_covers_the_whole_batch() -> Result<(), Box<dyn std::error::Error>> {
    let pg = setup_postgres_embedded("tx_deadline")?;
    let opts = pg.options.clone();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let mut pool = connect_with(&opts).await?;
        pool.execute(Statement::prepare(
            "CREATE TABLE ledger (id int PRIMARY KEY, note text NOT NULL)",
        ))
        .await?;

        // each statement fits the timeout on its own, the batch does not
        let mut tx = Transaction::begin(pool.clone().with_timeout(Duration::from_millis(600)));
        tx.add_statement(insert(1, "first"))
            .add_statement(Statement::prepare("SELECT 1 AS slept FROM pg_sleep(0.4)"))
            .add_statement(Statement::prepare("SELECT 1 AS slept FROM pg_sleep(0.4)"));
        let err = tx.run().await.unwrap_err();
        assert!(matches!(err, DbError::QueryTimeout(_)), "unexpected error: {err:?}");
        assert_eq!(ledger_count(&mut pool).await?, 0);

        Ok::<(), DbError>(())
    })?;

    stop_postgres_embedded(pg);
    Ok(())
}

#[test]
fn session_batches_until_run() -> Result<(), Box<dyn std::error::Error>> {
    let pg = setup_postgres_embedded("tx_session")?;
    let opts = pg.options.clone();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let mut pool = connect_with(&opts).await?;
        pool.execute(Statement::prepare(
            "CREATE TABLE ledger (id int PRIMARY KEY, note text NOT NULL)",
        ))
        .await?;

        assert!(global().is_ok());
        let mut session = Session::new(pool.clone());
        session.begin();
        session.execute(insert(1, "queued")).await?;
        session.execute(insert(2, "queued")).await?;
        assert_eq!(ledger_count(&mut pool).await?, 0);

        session.run().await?;
        assert!(!session.is_open());
        assert_eq!(ledger_count(&mut pool).await?, 2);

        // idle sessions run statements immediately
        let mut select = Statement::prepare("SELECT note FROM ledger WHERE id = :id:");
        select.bind("id", 2);
        let mut rows = session.execute(select).await?;
        let mut note: Option<String> = None;
        rows[0].get("note", &mut note)?;
        assert_eq!(note.as_deref(), Some("queued"));

        // an unresolved placeholder fails the batch before anything runs
        session.begin();
        session.execute(insert(5, "never")).await?;
        session
            .execute(Statement::prepare("DELETE FROM ledger WHERE id = :missing:"))
            .await?;
        assert!(matches!(session.run().await, Err(DbError::ParseQuery(_))));
        assert_eq!(ledger_count(&mut pool).await?, 2);

        Ok::<(), DbError>(())
    })?;

    stop_postgres_embedded(pg);
    Ok(())
}
