//! Connect with the `DB_*` settings and print every game category as JSON.
//!
//! Usage:
//!   DB_USER=cdb DB_NAME=cdb cdb-check
//!   RUST_LOG=stmt_middleware=debug cdb-check --db-host db.internal

use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use stmt_middleware::ConnectOptions;
use stmt_middleware::dao::game_category;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // a subscriber may already be installed when embedded; keep that one
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let opts = ConnectOptions::parse();

    let mut pool = match stmt_middleware::connect_with(&opts).await {
        Ok(pool) => pool,
        Err(err) => {
            error!(error = %err, "could not connect");
            return ExitCode::FAILURE;
        }
    };

    let categories = match game_category::categories(&mut pool).await {
        Ok(categories) => categories,
        Err(err) => {
            error!(error = %err, "could not list categories");
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&categories) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "could not encode categories");
            ExitCode::FAILURE
        }
    }
}
