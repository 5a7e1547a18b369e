//! Statement-driven data access for PostgreSQL.
//!
//! Domain objects with optional fields are turned into parameterized statements through a
//! static column mapping, named `:placeholders:` are resolved to `$n` markers at execution
//! time, rows come back as [`RowResult`]s with typed accessors that collect every decode
//! error, and statements can be batched into one atomic [`Transaction`].
//!
//! ```rust,no_run
//! use stmt_middleware::prelude::*;
//! use stmt_middleware::dao::game_category;
//!
//! # async fn demo() -> Result<(), DbError> {
//! let mut pool = connect("localhost", 5432, "cdb", "secret", "cdb").await?;
//! let categories = game_category::categories(&mut pool).await?;
//!
//! let mut tx = Transaction::begin(pool.clone());
//! for category in &categories {
//!     game_category::update_category(
//!         &mut tx,
//!         &GameCategory { img: Some("default.png".into()), ..Default::default() },
//!         [("id", category.id)],
//!     )
//!     .await?;
//! }
//! tx.run().await?;
//! # Ok(()) }
//! ```

pub mod dao;
pub mod entity;
pub mod error;
pub mod executor;
pub mod identifier;
pub mod model;
pub mod pool;
pub mod postgres;
pub mod prelude;
pub mod query_builder;
pub mod results;
pub mod statement;
pub mod transaction;
pub mod translation;
pub mod types;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use error::{DbError, DecodeError};
pub use executor::{Execute, fetch_all, fetch_one};
pub use identifier::Identifier;
pub use pool::{ConnectOptions, PoolHandle, connect, connect_with, global};
pub use results::RowResult;
pub use statement::Statement;
pub use transaction::{Session, Transaction};
pub use types::RowValues;
