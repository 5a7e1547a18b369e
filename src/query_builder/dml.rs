use std::collections::BTreeMap;

use tracing::warn;

use crate::entity::{Bindable, ColumnMapping};
use crate::error::DbError;
use crate::statement::Statement;
use crate::types::RowValues;

/// Prefix for the parameters that carry UPDATE selector values, so they never collide with
/// the SET values of the same column.
pub(crate) const UPDATE_SELECTOR_PREFIX: &str = "UPDATE_";

/// Build `INSERT INTO <table> (<columns>) VALUES(<placeholders>)` from the present fields.
///
/// # Errors
/// Returns [`DbError::NoSuchKey`] for an unmapped present field and
/// [`DbError::CreateStatement`] when nothing is left to insert.
pub fn prepare_insert<B: Bindable + ?Sized>(
    table: &str,
    columns: &ColumnMapping,
    obj: &B,
) -> Result<Statement, DbError> {
    let bound = columns.bound_columns(obj)?;
    if bound.is_empty() {
        return Err(DbError::CreateStatement(format!(
            "insert into {table} has no fields"
        )));
    }

    let names = bound
        .iter()
        .map(|(column, _)| *column)
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = bound
        .iter()
        .map(|(column, _)| format!(":{column}:"))
        .collect::<Vec<_>>()
        .join(", ");

    let mut stmt = Statement::prepare(format!(
        "INSERT INTO {table} ({names})\nVALUES({placeholders})"
    ));
    stmt.bind_map(bound);
    Ok(stmt)
}

/// Build `UPDATE <table> SET ...` for the present fields, restricted by `selectors`.
///
/// Each selector `key = value` becomes a `key = :UPDATE_key:` predicate. Selectors are
/// emitted in key order.
///
/// # Errors
/// Returns [`DbError::NoSuchKey`] for an unmapped present field and
/// [`DbError::CreateStatement`] when there is nothing to set.
pub fn prepare_update<B, I, K, V>(
    table: &str,
    columns: &ColumnMapping,
    obj: &B,
    selectors: I,
) -> Result<Statement, DbError>
where
    B: Bindable + ?Sized,
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<RowValues>,
{
    let bound = columns.bound_columns(obj)?;
    if bound.is_empty() {
        return Err(DbError::CreateStatement(format!(
            "update of {table} has no fields to set"
        )));
    }

    let assignments = bound
        .iter()
        .map(|(column, _)| format!("{column} = :{column}:"))
        .collect::<Vec<_>>()
        .join(", ");

    let mut stmt = Statement::prepare(format!("UPDATE {table}\nSET {assignments}"));

    let selectors: BTreeMap<String, RowValues> = selectors
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect();
    if selectors.is_empty() {
        warn!(table, "update without selectors touches every row");
    }
    for (key, value) in selectors {
        let placeholder = format!("{UPDATE_SELECTOR_PREFIX}{key}");
        stmt.push_predicate(&key, &placeholder);
        stmt.bind(placeholder, value);
    }

    stmt.bind_map(bound);
    Ok(stmt)
}

/// Build `DELETE FROM <table>` filtered on the present fields of `obj`.
///
/// # Errors
/// Returns [`DbError::NoSuchKey`] when a present field has no mapping entry.
pub fn prepare_delete<B: Bindable + ?Sized>(
    table: &str,
    columns: &ColumnMapping,
    obj: &B,
) -> Result<Statement, DbError> {
    let mut stmt = Statement::prepare(format!("DELETE FROM {table}"));
    stmt.append_where(columns, None, obj)?;
    stmt.bind_object(columns, None, obj)?;
    if stmt.params().is_empty() {
        warn!(table, "delete without filters removes every row");
    }
    Ok(stmt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Account {
        id: Option<String>,
        email: Option<String>,
        name: Option<String>,
    }

    crate::bindable!(Account { id, email, name });

    const ACCOUNT_COLUMNS: ColumnMapping =
        ColumnMapping::new(&[("id", "id"), ("email", "email"), ("name", "name")]);

    #[test]
    fn insert_lists_present_columns() {
        let acc = Account {
            email: Some("a@b.com".into()),
            name: Some("joske".into()),
            ..Default::default()
        };
        let stmt = prepare_insert("account", &ACCOUNT_COLUMNS, &acc).unwrap();
        assert_eq!(
            stmt.query(),
            "INSERT INTO account (email, name)\nVALUES(:email:, :name:)"
        );
        let resolved = stmt.to_positional().unwrap();
        assert_eq!(
            resolved.sql,
            "INSERT INTO account (email, name)\nVALUES($1, $2)"
        );
        assert_eq!(
            resolved.values,
            vec![
                RowValues::Text("a@b.com".into()),
                RowValues::Text("joske".into())
            ]
        );
    }

    #[test]
    fn insert_without_fields_fails() {
        let err = prepare_insert("account", &ACCOUNT_COLUMNS, &Account::default()).unwrap_err();
        assert!(matches!(err, DbError::CreateStatement(_)));
    }

    #[test]
    fn update_uses_prefixed_selectors() {
        let acc = Account {
            name: Some("n".into()),
            ..Default::default()
        };
        let stmt = prepare_update("account", &ACCOUNT_COLUMNS, &acc, [("id", "X")]).unwrap();

        assert_eq!(
            stmt.query(),
            "UPDATE account\nSET name = :name:\nWHERE id = :UPDATE_id:"
        );
        assert_eq!(stmt.params().len(), 2);
        assert_eq!(stmt.params()["name"], RowValues::Text("n".into()));
        assert_eq!(stmt.params()["UPDATE_id"], RowValues::Text("X".into()));
    }

    #[test]
    fn update_selector_and_set_on_same_column() {
        let acc = Account {
            id: Some("new".into()),
            ..Default::default()
        };
        let stmt = prepare_update(
            "account",
            &ACCOUNT_COLUMNS,
            &acc,
            [("id", "old"), ("email", "a@b.com")],
        )
        .unwrap();
        assert_eq!(
            stmt.query(),
            "UPDATE account\nSET id = :id:\nWHERE email = :UPDATE_email:\nAND id = :UPDATE_id:"
        );
        assert_eq!(stmt.params()["id"], RowValues::Text("new".into()));
        assert_eq!(stmt.params()["UPDATE_id"], RowValues::Text("old".into()));
    }

    #[test]
    fn update_without_fields_fails() {
        let err = prepare_update(
            "account",
            &ACCOUNT_COLUMNS,
            &Account::default(),
            [("id", "X")],
        )
        .unwrap_err();
        assert!(matches!(err, DbError::CreateStatement(_)));
    }

    #[test]
    fn delete_filters_on_present_fields() {
        let acc = Account {
            email: Some("a@b.com".into()),
            name: Some("daan".into()),
            ..Default::default()
        };
        let stmt = prepare_delete("account", &ACCOUNT_COLUMNS, &acc).unwrap();
        assert_eq!(
            stmt.query(),
            "DELETE FROM account\nWHERE email = :email:\nAND name = :name:"
        );
        assert_eq!(stmt.params().len(), 2);
    }
}
