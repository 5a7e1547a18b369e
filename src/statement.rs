use std::collections::HashMap;

use crate::entity::{Bindable, ColumnMapping};
use crate::error::DbError;
use crate::translation::{PositionalQuery, placeholder_names, translate_named_placeholders};
use crate::types::RowValues;

/// Query text with `:name:` placeholders plus the values bound to those names.
///
/// ```rust
/// use stmt_middleware::prelude::*;
///
/// let mut stmt = Statement::prepare("select id from game where game_category = :category:");
/// stmt.bind("category", "4d3c1c5e-2b4f-4c9a-9a55-0d2f0a3b1e77");
/// let resolved = stmt.to_positional().unwrap();
/// assert_eq!(resolved.sql, "select id from game where game_category = $1");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    query: String,
    params: HashMap<String, RowValues>,
}

impl Statement {
    /// Wrap raw query text; no parameters are bound yet.
    #[must_use]
    pub fn prepare(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            params: HashMap::new(),
        }
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn params(&self) -> &HashMap<String, RowValues> {
        &self.params
    }

    /// Bind one named value, replacing any earlier value under the same name.
    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<RowValues>) -> &mut Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Bind every entry of `params`; on collisions the new values win.
    pub fn bind_map<K, V, I>(&mut self, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<RowValues>,
    {
        for (name, value) in params {
            self.params.insert(name.into(), value.into());
        }
        self
    }

    /// Bind the present fields of `obj` under their column names, prefixed with `label.` when
    /// a label is given.
    ///
    /// # Errors
    /// Returns [`DbError::NoSuchKey`] when a present field has no mapping entry.
    pub fn bind_object<B: Bindable + ?Sized>(
        &mut self,
        columns: &ColumnMapping,
        label: Option<&str>,
        obj: &B,
    ) -> Result<&mut Self, DbError> {
        for (column, value) in columns.bound_columns(obj)? {
            self.params.insert(qualified(label, column), value);
        }
        Ok(self)
    }

    /// Append one `column = :column:` predicate per present field of `obj`.
    ///
    /// The first predicate is joined with `WHERE` unless the text already contains a where
    /// clause (any case); every other predicate is joined with `AND`.
    ///
    /// # Errors
    /// Returns [`DbError::NoSuchKey`] when a present field has no mapping entry.
    pub fn append_where<B: Bindable + ?Sized>(
        &mut self,
        columns: &ColumnMapping,
        label: Option<&str>,
        obj: &B,
    ) -> Result<&mut Self, DbError> {
        for (column, _) in columns.bound_columns(obj)? {
            let name = qualified(label, column);
            self.push_predicate(&name, &name);
        }
        Ok(self)
    }

    /// Append `<column> = :<placeholder>:` with the `WHERE`/`AND` joiner rule of
    /// [`append_where`](Self::append_where).
    pub fn push_predicate(&mut self, column: &str, placeholder: &str) -> &mut Self {
        let joiner = if self.has_where() { "AND" } else { "WHERE" };
        self.query
            .push_str(&format!("\n{joiner} {column} = :{placeholder}:"));
        self
    }

    pub fn append_returning_id(&mut self) -> &mut Self {
        self.query.push_str("\nRETURNING id");
        self
    }

    /// Names of all placeholders in the text, in order, repeats included.
    #[must_use]
    pub fn placeholders(&self) -> Vec<&str> {
        placeholder_names(&self.query)
    }

    /// Rewrite into `$n` markers with the values in marker order.
    ///
    /// # Errors
    /// Returns [`DbError::MissingValue`] when a placeholder has no bound value.
    pub fn to_positional(&self) -> Result<PositionalQuery, DbError> {
        translate_named_placeholders(&self.query, &self.params)
    }

    fn has_where(&self) -> bool {
        self.query.to_lowercase().contains("where")
    }
}

/// Column names used by [`prepare_select`](crate::query_builder::prepare_select).
#[must_use]
pub fn create_fields(columns: &ColumnMapping) -> Vec<&'static str> {
    columns.columns()
}

fn qualified(label: Option<&str>, column: &str) -> String {
    match label {
        Some(label) if !label.is_empty() => format!("{label}.{column}"),
        _ => column.to_string(),
    }
}
