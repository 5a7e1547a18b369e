//! Per-entity column mappings, row decoding and CRUD built on [`Execute`](crate::executor::Execute).

pub mod account;
pub mod game;
pub mod game_category;
pub mod game_necessity;

use crate::error::DbError;
use crate::identifier::Identifier;
use crate::results::RowResult;

/// The `id` of the first row an `INSERT ... RETURNING id` produced, if it ran immediately.
fn returned_id(rows: Vec<RowResult>) -> Result<Option<Identifier>, DbError> {
    let Some(mut row) = rows.into_iter().next() else {
        return Ok(None);
    };
    let mut id = None;
    let _ = row.get("id", &mut id);
    row.ensure_parsed("returned id")?;
    Ok(id)
}
