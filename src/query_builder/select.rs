use crate::entity::{Bindable, ColumnMapping};
use crate::error::DbError;
use crate::statement::Statement;

/// Build `SELECT <fields> FROM <table> [label]` filtered on the present fields of `obj`.
///
/// With a label every selected field, predicate and parameter name is qualified as
/// `label.column`.
///
/// # Errors
/// Returns [`DbError::NoSuchKey`] when a present field of `obj` has no mapping entry.
pub fn prepare_select<B: Bindable + ?Sized>(
    table: &str,
    fields: &[&str],
    label: Option<&str>,
    columns: &ColumnMapping,
    obj: &B,
) -> Result<Statement, DbError> {
    let label = label.filter(|l| !l.is_empty());
    let select_list = fields
        .iter()
        .map(|field| match label {
            Some(label) => format!("{label}.{field}"),
            None => (*field).to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ");

    let from = match label {
        Some(label) => format!("{table} {label}"),
        None => table.to_string(),
    };

    let mut stmt = Statement::prepare(format!("SELECT {select_list}\nFROM {from}"));
    stmt.append_where(columns, label, obj)?;
    stmt.bind_object(columns, label, obj)?;
    Ok(stmt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::create_fields;
    use crate::types::RowValues;

    #[derive(Default)]
    struct Account {
        email: Option<String>,
        name: Option<String>,
    }

    crate::bindable!(Account { email, name });

    const ACCOUNT_COLUMNS: ColumnMapping =
        ColumnMapping::new(&[("email", "email"), ("name", "name")]);

    #[test]
    fn select_filters_on_present_fields() {
        let acc = Account {
            email: Some("a@b.com".into()),
            ..Default::default()
        };
        let stmt = prepare_select(
            "account",
            &create_fields(&ACCOUNT_COLUMNS),
            None,
            &ACCOUNT_COLUMNS,
            &acc,
        )
        .unwrap();

        assert_eq!(
            stmt.query(),
            "SELECT email, name\nFROM account\nWHERE email = :email:"
        );
        assert_eq!(stmt.params().len(), 1);
        assert_eq!(
            stmt.params()["email"],
            RowValues::Text("a@b.com".into())
        );
    }

    #[test]
    fn select_with_label_qualifies_everything() {
        let acc = Account {
            email: Some("a@b.com".into()),
            name: Some("n".into()),
        };
        let stmt = prepare_select(
            "account",
            &["email", "name"],
            Some("a"),
            &ACCOUNT_COLUMNS,
            &acc,
        )
        .unwrap();

        assert_eq!(
            stmt.query(),
            "SELECT a.email, a.name\nFROM account a\nWHERE a.email = :a.email:\nAND a.name = :a.name:"
        );
        assert!(stmt.params().contains_key("a.email"));
        assert!(stmt.params().contains_key("a.name"));
        assert!(stmt.to_positional().is_ok());
    }

    #[test]
    fn select_without_filters_has_no_where() {
        let stmt = prepare_select(
            "account",
            &["email"],
            None,
            &ACCOUNT_COLUMNS,
            &Account::default(),
        )
        .unwrap();
        assert_eq!(stmt.query(), "SELECT email\nFROM account");
        assert!(stmt.params().is_empty());
    }
}
