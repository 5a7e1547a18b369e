use crate::error::DbError;
use crate::types::RowValues;

/// One field of a domain object: its logical name and its value when present.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub value: Option<RowValues>,
}

impl Field {
    #[must_use]
    pub fn new(name: &'static str, value: Option<RowValues>) -> Self {
        Self { name, value }
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }
}

/// A domain object whose optional fields can be walked in declaration order.
///
/// Implement it with [`bindable!`](crate::bindable) rather than by hand:
/// ```rust
/// use stmt_middleware::prelude::*;
///
/// #[derive(Default)]
/// struct Account {
///     email: Option<String>,
///     name: Option<String>,
/// }
///
/// stmt_middleware::bindable!(Account { email, name });
///
/// let acc = Account { email: Some("a@b.com".into()), ..Default::default() };
/// let present: Vec<_> = acc.present_fields().into_iter().map(|(name, _)| name).collect();
/// assert_eq!(present, vec!["email"]);
/// ```
pub trait Bindable {
    /// Every field, present or not, in declaration order.
    fn fields(&self) -> Vec<Field>;

    /// Only the fields that currently hold a value.
    fn present_fields(&self) -> Vec<(&'static str, RowValues)> {
        self.fields()
            .into_iter()
            .filter_map(|field| field.value.map(|value| (field.name, value)))
            .collect()
    }
}

impl<T: Bindable + ?Sized> Bindable for &T {
    fn fields(&self) -> Vec<Field> {
        (**self).fields()
    }
}

/// Static field-name to column-name table for one entity type.
///
/// An entry mapping to `""` marks a field that exists on the object but is not stored in
/// the table; binding skips it. A field with no entry at all is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    entries: &'static [(&'static str, &'static str)],
}

impl ColumnMapping {
    #[must_use]
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    /// Column for `field`, `None` when the mapping has no entry for it.
    #[must_use]
    pub fn column(&self, field: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, column)| *column)
    }

    /// Like [`column`](Self::column) but reports an unmapped field as [`DbError::NoSuchKey`]
    /// and a deliberately unstored one as `Ok(None)`.
    ///
    /// # Errors
    /// Returns [`DbError::NoSuchKey`] when `field` has no entry.
    pub fn resolve(&self, field: &str) -> Result<Option<&'static str>, DbError> {
        match self.column(field) {
            None => Err(DbError::NoSuchKey(field.to_string())),
            Some("") => Ok(None),
            Some(column) => Ok(Some(column)),
        }
    }

    /// Every stored column, in mapping order.
    #[must_use]
    pub fn columns(&self) -> Vec<&'static str> {
        self.entries
            .iter()
            .map(|(_, column)| *column)
            .filter(|column| !column.is_empty())
            .collect()
    }

    /// Present fields of `obj` resolved to `(column, value)`, skipping unstored fields.
    ///
    /// # Errors
    /// Returns [`DbError::NoSuchKey`] for the first present field without a mapping entry.
    pub fn bound_columns<B: Bindable + ?Sized>(
        &self,
        obj: &B,
    ) -> Result<Vec<(&'static str, RowValues)>, DbError> {
        let mut out = Vec::new();
        for (name, value) in obj.present_fields() {
            if let Some(column) = self.resolve(name)? {
                out.push((column, value));
            }
        }
        Ok(out)
    }
}

/// Implement [`Bindable`] for a struct whose listed fields are all `Option<T>` with
/// `T: Clone + Into<RowValues>`.
#[macro_export]
macro_rules! bindable {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::entity::Bindable for $ty {
            fn fields(&self) -> Vec<$crate::entity::Field> {
                vec![
                    $(
                        $crate::entity::Field::new(
                            stringify!($field),
                            self.$field.clone().map($crate::types::RowValues::from),
                        )
                    ),*
                ]
            }
        }
    };
}
