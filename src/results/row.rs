use std::collections::HashMap;

use tracing::error;

use crate::error::{DbError, DecodeError};
use crate::types::RowValues;

use super::decode::FromRowValue;

static NIL_ERRORS: [DecodeError; 1] = [DecodeError::MissingResult];

/// One decoded row: column name to value, plus every decode error seen so far.
///
/// Accessors never abort a decode: a required field that is missing or malformed returns its
/// error *and* records it, so a decode routine can walk every field and report all problems
/// at once through [`ensure_parsed`](Self::ensure_parsed).
///
/// The nil row ([`RowResult::nil`]) stands in for "no row at all"; every required accessor on
/// it reports [`DecodeError::MissingResult`].
#[derive(Debug, Clone, PartialEq)]
pub struct RowResult {
    data: Option<HashMap<String, RowValues>>,
    errors: Vec<DecodeError>,
}

impl RowResult {
    #[must_use]
    pub fn new(data: HashMap<String, RowValues>) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    /// The nil row.
    #[must_use]
    pub fn nil() -> Self {
        Self {
            data: None,
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.data.is_none()
    }

    /// Raw column data, `None` for the nil row.
    #[must_use]
    pub fn data(&self) -> Option<&HashMap<String, RowValues>> {
        self.data.as_ref()
    }

    /// Raw value of one column without recording anything.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&RowValues> {
        self.data.as_ref()?.get(key)
    }

    /// Errors recorded so far; the nil row always reports a missing result.
    #[must_use]
    pub fn errors(&self) -> &[DecodeError] {
        if self.is_nil() {
            return &NIL_ERRORS;
        }
        &self.errors
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.is_nil() || !self.errors.is_empty()
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    /// Like [`has_errors`](Self::has_errors) but also logs each error, prefixed with `prefix`.
    pub fn has_errors_log(&self, tag: &str, prefix: &str) -> bool {
        if !self.has_errors() {
            return false;
        }
        for err in self.errors() {
            error!(tag, "{prefix}{err}");
        }
        true
    }

    /// Fold the recorded errors into one [`DbError::ParseResult`].
    ///
    /// # Errors
    /// Returns [`DbError::ParseResult`] when any accessor failed (or the row is nil).
    pub fn ensure_parsed(&self, tag: &str) -> Result<(), DbError> {
        if self.has_errors_log(tag, "") {
            return Err(DbError::ParseResult(self.errors().to_vec()));
        }
        Ok(())
    }

    /// Required accessor: the key must exist and convert to `T`.
    ///
    /// `dest` is only written on success.
    ///
    /// # Errors
    /// [`DecodeError::MissingResult`] on the nil row, [`DecodeError::NoSuchKey`] for an absent
    /// key, [`DecodeError::Malformed`] when the value (null included) does not convert. All but
    /// the first are also recorded on the row.
    pub fn get<T: FromRowValue>(&mut self, key: &str, dest: &mut Option<T>) -> Result<(), DecodeError> {
        let Some(data) = self.data.as_ref() else {
            return Err(DecodeError::MissingResult);
        };
        let Some(raw) = data.get(key) else {
            return self.record(DecodeError::NoSuchKey(key.to_string()));
        };
        match T::from_row_value(raw) {
            Some(value) => {
                *dest = Some(value);
                Ok(())
            }
            None => {
                let err = malformed::<T>(key, raw);
                self.record(err)
            }
        }
    }

    /// Optional accessor: nil row, absent key and null all succeed and leave `dest` alone.
    ///
    /// # Errors
    /// [`DecodeError::Malformed`] (also recorded) when a non-null value does not convert.
    pub fn get_opt<T: FromRowValue>(
        &mut self,
        key: &str,
        dest: &mut Option<T>,
    ) -> Result<(), DecodeError> {
        let Some(raw) = self.value(key) else {
            return Ok(());
        };
        if raw.is_null() {
            return Ok(());
        }
        match T::from_row_value(raw) {
            Some(value) => {
                *dest = Some(value);
                Ok(())
            }
            None => {
                let err = malformed::<T>(key, raw);
                self.record(err)
            }
        }
    }

    /// Required accessor for types built from the column's text by `parse`.
    ///
    /// # Errors
    /// Same as [`get`](Self::get); a non-text value is malformed.
    pub fn get_custom<T, F>(&mut self, key: &str, dest: &mut Option<T>, parse: F) -> Result<(), DecodeError>
    where
        F: FnOnce(&str) -> T,
    {
        let mut text: Option<String> = None;
        self.get(key, &mut text)?;
        if let Some(text) = text {
            *dest = Some(parse(&text));
        }
        Ok(())
    }

    /// Optional form of [`get_custom`](Self::get_custom).
    ///
    /// # Errors
    /// Same as [`get_opt`](Self::get_opt).
    pub fn get_opt_custom<T, F>(
        &mut self,
        key: &str,
        dest: &mut Option<T>,
        parse: F,
    ) -> Result<(), DecodeError>
    where
        F: FnOnce(&str) -> T,
    {
        let mut text: Option<String> = None;
        self.get_opt(key, &mut text)?;
        if let Some(text) = text {
            *dest = Some(parse(&text));
        }
        Ok(())
    }

    fn record(&mut self, err: DecodeError) -> Result<(), DecodeError> {
        self.errors.push(err.clone());
        Err(err)
    }
}

impl FromIterator<(String, RowValues)> for RowResult {
    fn from_iter<I: IntoIterator<Item = (String, RowValues)>>(iter: I) -> Self {
        RowResult::new(iter.into_iter().collect())
    }
}

fn malformed<T: FromRowValue>(key: &str, raw: &RowValues) -> DecodeError {
    DecodeError::Malformed {
        key: key.to_string(),
        value: format!("{raw:?}"),
        target: T::TARGET,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::Identifier;
    use chrono::{DateTime, FixedOffset};
    use serde_json::json;

    fn row(pairs: Vec<(&str, RowValues)>) -> RowResult {
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn required_missing_key_accumulates() {
        let mut r = row(vec![("id", RowValues::Int(1))]);
        assert!(!r.has_errors());

        let mut dest: Option<i32> = None;
        assert_eq!(
            r.get("order", &mut dest),
            Err(DecodeError::NoSuchKey("order".into()))
        );
        assert!(r.has_errors());
        assert_eq!(r.errors().len(), 1);

        assert!(r.get("views", &mut dest).is_err());
        assert_eq!(r.errors().len(), 2);
        assert!(dest.is_none());
    }

    #[test]
    fn required_success_writes_dest() {
        let mut r = row(vec![("player_count", RowValues::Int(4))]);
        let mut dest: Option<i32> = None;
        r.get("player_count", &mut dest).unwrap();
        assert_eq!(dest, Some(4));
        assert!(!r.has_errors());
    }

    #[test]
    fn required_null_is_malformed() {
        let mut r = row(vec![("img", RowValues::Null)]);
        let mut dest: Option<String> = None;
        assert!(matches!(
            r.get("img", &mut dest),
            Err(DecodeError::Malformed { target: "string", .. })
        ));
    }

    #[test]
    fn optional_string_on_bool_is_malformed() {
        let mut r = row(vec![("highlight", RowValues::Bool(true))]);
        let mut dest: Option<String> = None;
        let err = r.get_opt("highlight", &mut dest).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { ref key, .. } if key == "highlight"));
        assert_eq!(r.errors().len(), 1);
        assert!(dest.is_none());
    }

    #[test]
    fn optional_absent_and_null_leave_dest_unset() {
        let mut r = row(vec![("credits", RowValues::Null)]);
        let mut dest: Option<String> = None;
        r.get_opt("credits", &mut dest).unwrap();
        r.get_opt("missing", &mut dest).unwrap();
        assert!(dest.is_none());

        let mut count: Option<u64> = Some(3);
        r.get_opt("credits", &mut count).unwrap();
        assert_eq!(count, Some(3));
        assert!(!r.has_errors());
    }

    #[test]
    fn nil_row_reports_missing_result() {
        let mut r = RowResult::nil();
        let mut dest: Option<bool> = None;
        assert_eq!(r.get("x", &mut dest), Err(DecodeError::MissingResult));
        r.get_opt("x", &mut dest).unwrap();
        assert!(r.has_errors());
        assert_eq!(r.errors(), &[DecodeError::MissingResult]);
        assert!(matches!(
            r.ensure_parsed("nil"),
            Err(DbError::ParseResult(errs)) if errs == vec![DecodeError::MissingResult]
        ));
    }

    #[test]
    fn clear_errors_resets() {
        let mut r = row(vec![]);
        let mut dest: Option<i64> = None;
        let _ = r.get("a", &mut dest);
        assert!(r.has_errors());
        r.clear_errors();
        assert!(!r.has_errors());
        assert!(r.ensure_parsed("clear").is_ok());
    }

    #[test]
    fn ensure_parsed_collects_every_failure() {
        let mut r = row(vec![
            ("id", RowValues::Text("not-an-id".into())),
            ("order", RowValues::Text("x".into())),
            ("name", RowValues::Text("ok".into())),
        ]);
        let mut id: Option<Identifier> = None;
        let mut order: Option<i32> = None;
        let mut name: Option<String> = None;
        let mut img: Option<String> = None;
        let _ = r.get("id", &mut id);
        let _ = r.get("order", &mut order);
        let _ = r.get("name", &mut name);
        let _ = r.get("img", &mut img);

        assert_eq!(name.as_deref(), Some("ok"));
        match r.ensure_parsed("game") {
            Err(DbError::ParseResult(errs)) => assert_eq!(errs.len(), 3),
            other => panic!("expected parse result error, got {other:?}"),
        }
    }

    #[test]
    fn nested_and_list_values_decode_recursively() {
        let mut r = row(vec![
            (
                "category",
                RowValues::from(json!({"id": "8e17f234-9e0a-49dc-8a7d-c967ca2df1c6", "order": 2})),
            ),
            (
                "games",
                RowValues::from(json!([{"name": "a"}, {"name": "b"}])),
            ),
        ]);

        let mut category: Option<RowResult> = None;
        r.get("category", &mut category).unwrap();
        let mut category = category.unwrap();
        let mut id: Option<Identifier> = None;
        let mut order: Option<i32> = None;
        category.get("id", &mut id).unwrap();
        category.get("order", &mut order).unwrap();
        assert_eq!(order, Some(2));
        assert!(id.is_some());

        let mut games: Option<Vec<RowResult>> = None;
        r.get("games", &mut games).unwrap();
        let names: Vec<String> = games
            .unwrap()
            .iter_mut()
            .map(|g| {
                let mut name = None;
                g.get("name", &mut name).unwrap();
                name.unwrap()
            })
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn maps_and_raw_values() {
        let mut r = row(vec![
            ("name", RowValues::from(json!({"en": "Ring of fire", "nl": "Koningsbeker"}))),
            ("meta", RowValues::from(json!({"x": 1}))),
            ("raw", RowValues::Null),
        ]);
        let mut name: Option<HashMap<String, String>> = None;
        r.get("name", &mut name).unwrap();
        assert_eq!(name.unwrap()["nl"], "Koningsbeker");

        let mut meta: Option<HashMap<String, RowValues>> = None;
        r.get("meta", &mut meta).unwrap();
        assert_eq!(meta.unwrap()["x"], RowValues::Int(1));

        let mut raw: Option<RowValues> = None;
        r.get("raw", &mut raw).unwrap();
        assert_eq!(raw, Some(RowValues::Null));
        let mut opt_raw: Option<RowValues> = None;
        r.get_opt("raw", &mut opt_raw).unwrap();
        assert!(opt_raw.is_none());
    }

    #[test]
    fn timestamps_from_text() {
        let mut r = row(vec![
            ("time", RowValues::Text("2022-07-20 10:44:03.670 +0200".into())),
            ("time_2", RowValues::Text("2018-12-19 10:19:39 +0100 CET".into())),
            ("bad", RowValues::Text("yesterday".into())),
        ]);
        let mut start: Option<DateTime<FixedOffset>> = None;
        let mut end: Option<DateTime<FixedOffset>> = None;
        let mut bad: Option<DateTime<FixedOffset>> = None;
        r.get("time", &mut start).unwrap();
        r.get("time_2", &mut end).unwrap();
        assert!(r.get("bad", &mut bad).is_err());
        assert!(start.unwrap() > end.unwrap());
    }

    #[test]
    fn custom_types() {
        #[derive(Debug, PartialEq)]
        enum Level {
            Easy,
            Hard,
        }
        let parse = |s: &str| if s == "hard" { Level::Hard } else { Level::Easy };

        let mut r = row(vec![
            ("level", RowValues::Text("hard".into())),
            ("count", RowValues::Int(1)),
        ]);
        let mut level = None;
        r.get_custom("level", &mut level, parse).unwrap();
        assert_eq!(level, Some(Level::Hard));

        let mut other = None;
        r.get_opt_custom("absent", &mut other, parse).unwrap();
        assert!(other.is_none());

        assert!(r.get_custom("count", &mut other, parse).is_err());
        assert_eq!(r.errors().len(), 1);
    }
}
