// PostgreSQL module - driver-facing glue for the statement engine
//
// - params: binding RowValues as tokio-postgres parameters
// - query: turning driver rows into RowResults

pub mod params;
pub mod query;

pub use params::as_refs;
pub use query::{build_row_results, postgres_extract_value};
