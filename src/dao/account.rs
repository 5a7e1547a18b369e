use tracing::error;

use crate::entity::ColumnMapping;
use crate::error::DbError;
use crate::executor::{Execute, fetch_one};
use crate::identifier::Identifier;
use crate::model::Account;
use crate::query_builder::{prepare_insert, prepare_select};
use crate::results::{FromRowResult, RowResult};
use crate::statement::create_fields;

pub const ACCOUNT_COLUMNS: ColumnMapping = ColumnMapping::new(&[
    ("id", "id"),
    ("name", "name"),
    ("email", "email"),
    ("password", "password"),
]);

impl FromRowResult for Account {
    fn from_row(row: &mut RowResult) -> Result<Self, DbError> {
        let mut acc = Account::default();
        let _ = row.get("id", &mut acc.id);
        let _ = row.get("name", &mut acc.name);
        let _ = row.get("email", &mut acc.email);
        let _ = row.get("password", &mut acc.password);
        row.ensure_parsed("unmarshal account")?;
        Ok(acc)
    }
}

/// The first account matching every present field of `filter`.
///
/// # Errors
/// [`DbError::MissingResult`] when nothing matches, [`DbError::ParseResult`] when the row
/// does not decode, and execution errors as-is.
pub async fn get_account<E: Execute + ?Sized>(
    target: &mut E,
    filter: &Account,
) -> Result<Account, DbError> {
    let fields = create_fields(&ACCOUNT_COLUMNS);
    let stmt = prepare_select("account", &fields, Some("a"), &ACCOUNT_COLUMNS, filter)?;
    let mut row = fetch_one(target, stmt).await.inspect_err(|err| {
        error!(error = %err, "account not found");
    })?;
    Account::from_row(&mut row)
}

/// Insert `acc`; returns the new id unless the statement was only queued.
///
/// # Errors
/// [`DbError::CreateStatement`] when `acc` has no fields set, otherwise execution errors.
pub async fn insert_account<E: Execute + ?Sized>(
    target: &mut E,
    acc: &Account,
) -> Result<Option<Identifier>, DbError> {
    let mut stmt = prepare_insert("account", &ACCOUNT_COLUMNS, acc)?;
    stmt.append_returning_id();
    let rows = target.execute(stmt).await?;
    super::returned_id(rows)
}
