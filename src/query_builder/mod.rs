//! Statement factories for the fixed SELECT / INSERT / UPDATE / DELETE shapes.
//!
//! Every factory walks the present fields of a [`Bindable`](crate::entity::Bindable) object
//! through a [`ColumnMapping`](crate::entity::ColumnMapping), so the same code serves every
//! entity:
//! ```rust
//! use stmt_middleware::prelude::*;
//!
//! #[derive(Default)]
//! struct Account {
//!     email: Option<String>,
//!     name: Option<String>,
//! }
//! stmt_middleware::bindable!(Account { email, name });
//!
//! const COLUMNS: ColumnMapping = ColumnMapping::new(&[("email", "email"), ("name", "name")]);
//!
//! let acc = Account { email: Some("a@b.com".into()), ..Default::default() };
//! let stmt = prepare_select("account", &create_fields(&COLUMNS), None, &COLUMNS, &acc).unwrap();
//! assert!(stmt.query().ends_with("WHERE email = :email:"));
//! ```

mod dml;
mod select;

pub use dml::{prepare_delete, prepare_insert, prepare_update};
pub use select::prepare_select;
