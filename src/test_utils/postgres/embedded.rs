use postgresql_embedded::PostgreSQL;

use super::super::SHARED_RUNTIME;
use crate::error::DbError;
use crate::pool::{ConnectOptions, PoolHandle};

/// Tables used by the DAO layer.
pub const TEST_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS account (
    id uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    name text NOT NULL,
    email text NOT NULL UNIQUE,
    password text NOT NULL
);
CREATE TABLE IF NOT EXISTS game_category (
    id uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    name jsonb NOT NULL,
    description jsonb,
    img text,
    "order" int NOT NULL
);
CREATE TABLE IF NOT EXISTS game (
    id uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    game_category uuid NOT NULL REFERENCES game_category (id),
    name jsonb NOT NULL,
    alias jsonb,
    player_count int NOT NULL,
    img text,
    credits text,
    description jsonb,
    highlight bool NOT NULL DEFAULT false,
    views int NOT NULL DEFAULT 0,
    "order" int NOT NULL,
    created_at timestamptz NOT NULL DEFAULT now()
);
CREATE TABLE IF NOT EXISTS game_necessity (
    game uuid NOT NULL REFERENCES game (id) ON DELETE CASCADE,
    necessity uuid NOT NULL,
    PRIMARY KEY (game, necessity)
);
"#;

/// Represents a running embedded `PostgreSQL` instance.
pub struct EmbeddedPostgres {
    pub postgresql: PostgreSQL,
    /// Working settings for the created database
    pub options: ConnectOptions,
}

/// Start an embedded `PostgreSQL`, create `database` and check that it accepts connections.
///
/// # Errors
/// Returns an error if the server cannot be set up or started, the database cannot be
/// created, or the connectivity check fails.
pub fn setup_postgres_embedded(
    database: &str,
) -> Result<EmbeddedPostgres, Box<dyn std::error::Error>> {
    SHARED_RUNTIME.block_on(async {
        let mut postgresql = PostgreSQL::default();

        // bundled binaries, so no download
        postgresql.setup().await?;
        postgresql.start().await?;
        postgresql.create_database(database).await?;

        let settings = postgresql.settings();
        let options = ConnectOptions::new(
            settings.host.clone(),
            settings.port,
            settings.username.clone(),
            settings.password.clone(),
            database,
        );

        let pool = PoolHandle::from_options(&options).await?;
        pool.acquire().await?.batch_execute("SELECT 1").await?;
        println!("PostgreSQL started on port {}", options.port);

        Ok(EmbeddedPostgres {
            postgresql,
            options,
        })
    })
}

/// Create the DAO tables if they are missing.
///
/// # Errors
/// Returns [`DbError::Connect`] or [`DbError::Query`] when the schema cannot be applied.
pub async fn apply_schema(pool: &PoolHandle) -> Result<(), DbError> {
    pool.acquire().await?.batch_execute(TEST_SCHEMA).await?;
    Ok(())
}

/// Stop a previously started embedded `PostgreSQL` instance.
pub fn stop_postgres_embedded(postgres: EmbeddedPostgres) {
    let EmbeddedPostgres { postgresql, .. } = postgres;
    SHARED_RUNTIME.block_on(async move {
        let _ = postgresql.stop().await;
    });
}
