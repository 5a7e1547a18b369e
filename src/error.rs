use thiserror::Error;

/// Errors produced while decoding a single field of a [`RowResult`](crate::results::RowResult).
///
/// These are cloneable so a row can both hand them back to the caller and keep them in its
/// own error list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The accessor was called on the nil row.
    #[error("no results found")]
    MissingResult,

    /// The row has no column with this name.
    #[error("key '{0}' doesn't exist")]
    NoSuchKey(String),

    /// The column exists but its value cannot be turned into the requested type.
    #[error("malformed object: {key}: {value} cannot be parsed to {target}")]
    Malformed {
        key: String,
        value: String,
        target: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to connect: {0}")]
    Connect(String),

    #[error("pool is not yet instantiated")]
    NotInstantiated,

    #[error("query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    #[error("query timed out after {0:?}")]
    QueryTimeout(std::time::Duration),

    #[error("failed to parse query: {0}")]
    ParseQuery(#[source] Box<DbError>),

    #[error("failed to parse result{}", describe_decode_errors(.0))]
    ParseResult(Vec<DecodeError>),

    #[error("missing value: {0}")]
    MissingValue(String),

    #[error("key '{0}' doesn't exist")]
    NoSuchKey(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("no results found")]
    MissingResult,

    #[error("error creating statement: {0}")]
    CreateStatement(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl DbError {
    /// True for the errors that mean "the pool could not hand out a connection".
    #[must_use]
    pub fn is_connect(&self) -> bool {
        matches!(self, DbError::Connect(_) | DbError::NotInstantiated)
    }
}

fn describe_decode_errors(errors: &[DecodeError]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let joined = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    format!(": {joined}")
}
