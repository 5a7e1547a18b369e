pub mod decode;
pub mod row;

pub use decode::{FromRowValue, parse_timestamp};
pub use row::RowResult;

use crate::error::DbError;

/// A domain object that can be decoded from one row.
///
/// Implementations should call every accessor they need, ignore the individual results,
/// and finish with [`RowResult::ensure_parsed`] so all field errors are reported together.
pub trait FromRowResult: Sized {
    /// # Errors
    /// Returns [`DbError::ParseResult`] when any field failed to decode.
    fn from_row(row: &mut RowResult) -> Result<Self, DbError>;
}

/// Decode every row, stopping at the first row that fails.
///
/// # Errors
/// Propagates the first [`FromRowResult::from_row`] failure.
pub fn decode_rows<T: FromRowResult>(rows: Vec<RowResult>) -> Result<Vec<T>, DbError> {
    rows.into_iter()
        .map(|mut row| T::from_row(&mut row))
        .collect()
}
