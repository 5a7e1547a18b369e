//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::entity::{Bindable, ColumnMapping, Field};
pub use crate::error::{DbError, DecodeError};
pub use crate::executor::{Execute, fetch_all, fetch_one};
pub use crate::identifier::Identifier;
pub use crate::model::{Account, Game, GameCategory, GameNecessity, Translations};
pub use crate::pool::{ConnectOptions, PoolHandle, connect, connect_with, global};
pub use crate::query_builder::{prepare_delete, prepare_insert, prepare_select, prepare_update};
pub use crate::results::{FromRowResult, FromRowValue, RowResult, decode_rows};
pub use crate::statement::{Statement, create_fields};
pub use crate::transaction::{Session, Transaction};
pub use crate::translation::PositionalQuery;
pub use crate::types::RowValues;
