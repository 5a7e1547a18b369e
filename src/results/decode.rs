use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};

use crate::identifier::Identifier;
use crate::types::RowValues;

use super::row::RowResult;

/// Fractional seconds with a numeric offset, e.g. `2022-07-20 10:44:03.670 +0200`.
const TIMESTAMP_FRACTIONAL_OFFSET: &str = "%Y-%m-%d %H:%M:%S%.f %z";
/// Whole seconds, numeric offset, then a zone abbreviation, e.g. `2018-12-19 10:19:39 +0100 CET`.
const TIMESTAMP_OFFSET: &str = "%Y-%m-%d %H:%M:%S %z";

/// Conversion from a decoded column value into a destination type.
///
/// `from_row_value` returns `None` when the value is not convertible; the row turns that
/// into a [`DecodeError::Malformed`](crate::error::DecodeError::Malformed) naming `TARGET`.
pub trait FromRowValue: Sized {
    const TARGET: &'static str;

    fn from_row_value(value: &RowValues) -> Option<Self>;
}

macro_rules! impl_from_row_value_numeric {
    ($($ty:ty),*) => {
        $(
            impl FromRowValue for $ty {
                const TARGET: &'static str = stringify!($ty);

                fn from_row_value(value: &RowValues) -> Option<Self> {
                    value.textual_form()?.trim().parse::<$ty>().ok()
                }
            }
        )*
    };
}

impl_from_row_value_numeric!(i8, i16, i32, i64, u8, u16, u32, u64, f64);

impl FromRowValue for f32 {
    const TARGET: &'static str = "f32";

    fn from_row_value(value: &RowValues) -> Option<Self> {
        let parsed = value.textual_form()?.trim().parse::<f64>().ok()?;
        #[allow(clippy::cast_possible_truncation)]
        let narrowed = parsed as f32;
        // a finite value that overflows f32 is out of range, not infinity
        if parsed.is_finite() && !narrowed.is_finite() {
            return None;
        }
        Some(narrowed)
    }
}

impl FromRowValue for String {
    const TARGET: &'static str = "string";

    fn from_row_value(value: &RowValues) -> Option<Self> {
        value.as_text().map(str::to_string)
    }
}

impl FromRowValue for bool {
    const TARGET: &'static str = "bool";

    fn from_row_value(value: &RowValues) -> Option<Self> {
        value.as_bool().copied()
    }
}

impl FromRowValue for DateTime<FixedOffset> {
    const TARGET: &'static str = "timestamp";

    fn from_row_value(value: &RowValues) -> Option<Self> {
        match value {
            RowValues::Timestamp(ts) => Some(*ts),
            RowValues::Text(text) => parse_timestamp(text),
            _ => None,
        }
    }
}

impl FromRowValue for DateTime<Utc> {
    const TARGET: &'static str = "timestamp";

    fn from_row_value(value: &RowValues) -> Option<Self> {
        DateTime::<FixedOffset>::from_row_value(value).map(|ts| ts.with_timezone(&Utc))
    }
}

impl FromRowValue for Identifier {
    const TARGET: &'static str = "identifier";

    fn from_row_value(value: &RowValues) -> Option<Self> {
        match value {
            RowValues::Identifier(id) => Some(*id),
            RowValues::Text(text) => Identifier::parse(text).ok(),
            RowValues::Bytes(bytes) => Identifier::from_slice(bytes).ok(),
            _ => None,
        }
    }
}

impl FromRowValue for RowResult {
    const TARGET: &'static str = "object";

    fn from_row_value(value: &RowValues) -> Option<Self> {
        value.as_nested().cloned().map(RowResult::new)
    }
}

impl FromRowValue for Vec<RowResult> {
    const TARGET: &'static str = "list of objects";

    fn from_row_value(value: &RowValues) -> Option<Self> {
        value
            .as_list()?
            .iter()
            .map(RowResult::from_row_value)
            .collect()
    }
}

impl FromRowValue for Vec<String> {
    const TARGET: &'static str = "list of strings";

    fn from_row_value(value: &RowValues) -> Option<Self> {
        value.as_list()?.iter().map(String::from_row_value).collect()
    }
}

impl FromRowValue for HashMap<String, String> {
    const TARGET: &'static str = "map of strings";

    fn from_row_value(value: &RowValues) -> Option<Self> {
        value
            .as_nested()?
            .iter()
            .map(|(key, inner)| inner.as_text().map(|text| (key.clone(), text.to_string())))
            .collect()
    }
}

impl FromRowValue for HashMap<String, RowValues> {
    const TARGET: &'static str = "map";

    fn from_row_value(value: &RowValues) -> Option<Self> {
        value.as_nested().cloned()
    }
}

impl FromRowValue for RowValues {
    const TARGET: &'static str = "value";

    fn from_row_value(value: &RowValues) -> Option<Self> {
        Some(value.clone())
    }
}

/// Parse the two textual timestamp layouts rows may carry.
///
/// `YYYY-MM-DD hh:mm:ss.fff ±hhmm` is tried first, then `YYYY-MM-DD hh:mm:ss ±hhmm ZONE`
/// where the trailing zone abbreviation is informational only.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_str(text, TIMESTAMP_FRACTIONAL_OFFSET) {
        return Some(ts);
    }

    let (rest, zone) = text.rsplit_once(' ')?;
    if zone.is_empty() || !zone.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    DateTime::parse_from_str(rest, TIMESTAMP_OFFSET).ok()
}
