use std::collections::HashMap;
use std::error::Error;
use std::fmt::Write;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value;
use tokio_postgres::Row;
use tokio_postgres::types::{FromSql, Kind, Type};
use uuid::Uuid;

use crate::error::DbError;
use crate::identifier::Identifier;
use crate::results::RowResult;
use crate::types::RowValues;

/// Materialize driver rows into [`RowResult`]s keyed by column name.
///
/// Every column type materializes: types without a dedicated arm come back as text when the
/// driver can read them as a string, and as raw bytes otherwise.
///
/// # Errors
/// Returns [`DbError::Query`] if a column value cannot be read from the wire format.
pub fn build_row_results(rows: &[Row]) -> Result<Vec<RowResult>, DbError> {
    let mut results = Vec::with_capacity(rows.len());
    for row in rows {
        let mut data = HashMap::with_capacity(row.columns().len());
        for (idx, column) in row.columns().iter().enumerate() {
            data.insert(column.name().to_string(), postgres_extract_value(row, idx)?);
        }
        results.push(RowResult::new(data));
    }
    Ok(results)
}

/// Extracts a `RowValues` from a `tokio_postgres` Row at the given index.
///
/// # Errors
/// Returns [`DbError::Query`] if the column cannot be retrieved.
pub fn postgres_extract_value(row: &Row, idx: usize) -> Result<RowValues, DbError> {
    let type_info = row.columns()[idx].type_();

    if let Kind::Array(member) = type_info.kind() {
        return match member.name() {
            "text" | "varchar" | "bpchar" => {
                let val: Option<Vec<Option<String>>> = row.try_get(idx)?;
                Ok(list(val, |v| v.map_or(RowValues::Null, RowValues::Text)))
            }
            "bool" => {
                let val: Option<Vec<Option<bool>>> = row.try_get(idx)?;
                Ok(list(val, |v| v.map_or(RowValues::Null, RowValues::Bool)))
            }
            "int2" => {
                let val: Option<Vec<Option<i16>>> = row.try_get(idx)?;
                Ok(list(val, |v| v.map_or(RowValues::Null, RowValues::from)))
            }
            "int4" => {
                let val: Option<Vec<Option<i32>>> = row.try_get(idx)?;
                Ok(list(val, |v| v.map_or(RowValues::Null, RowValues::from)))
            }
            "int8" => {
                let val: Option<Vec<Option<i64>>> = row.try_get(idx)?;
                Ok(list(val, |v| v.map_or(RowValues::Null, RowValues::Int)))
            }
            "float4" => {
                let val: Option<Vec<Option<f32>>> = row.try_get(idx)?;
                Ok(list(val, |v| v.map_or(RowValues::Null, RowValues::from)))
            }
            "float8" => {
                let val: Option<Vec<Option<f64>>> = row.try_get(idx)?;
                Ok(list(val, |v| v.map_or(RowValues::Null, RowValues::Float)))
            }
            "numeric" => {
                let val: Option<Vec<Option<NumericText>>> = row.try_get(idx)?;
                Ok(list(val, |v| v.map_or(RowValues::Null, |n| RowValues::Text(n.0))))
            }
            "uuid" => {
                let val: Option<Vec<Option<Uuid>>> = row.try_get(idx)?;
                Ok(list(val, |v| {
                    v.map_or(RowValues::Null, |u| RowValues::Identifier(u.into()))
                }))
            }
            _ if <String as FromSql>::accepts(member) => {
                let val: Option<Vec<Option<String>>> = row.try_get(idx)?;
                Ok(list(val, |v| v.map_or(RowValues::Null, RowValues::Text)))
            }
            _ => {
                let val: Option<Vec<Option<RawValue>>> = row.try_get(idx)?;
                Ok(list(val, |v| v.map_or(RowValues::Null, RawValue::into_row_value)))
            }
        };
    }

    match type_info.name() {
        "int2" => {
            let val: Option<i16> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, |v| RowValues::Int(i64::from(v))))
        }
        "int4" => {
            let val: Option<i32> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, |v| RowValues::Int(i64::from(v))))
        }
        "int8" => {
            let val: Option<i64> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Int))
        }
        "oid" => {
            let val: Option<u32> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::from))
        }
        "char" => {
            let val: Option<i8> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::from))
        }
        "numeric" => {
            let val: Option<NumericText> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, |n| RowValues::Text(n.0)))
        }
        "float4" => {
            let val: Option<f32> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, |v| RowValues::Float(f64::from(v))))
        }
        "float8" => {
            let val: Option<f64> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Float))
        }
        "bool" => {
            let val: Option<bool> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Bool))
        }
        "timestamp" => {
            // no zone on the column: the stored value is taken as UTC
            let val: Option<NaiveDateTime> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, |v| {
                RowValues::Timestamp(v.and_utc().fixed_offset())
            }))
        }
        "timestamptz" => {
            let val: Option<DateTime<Utc>> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, |v| {
                RowValues::Timestamp(DateTime::<FixedOffset>::from(v))
            }))
        }
        "date" => {
            let val: Option<NaiveDate> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, |d| {
                RowValues::Timestamp(d.and_time(NaiveTime::MIN).and_utc().fixed_offset())
            }))
        }
        "time" => {
            let val: Option<NaiveTime> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, |t| RowValues::Text(t.to_string())))
        }
        "json" | "jsonb" => {
            let val: Option<Value> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::from))
        }
        "uuid" => {
            let val: Option<Uuid> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, |v| {
                RowValues::Identifier(Identifier::from(v))
            }))
        }
        "bytea" => {
            let val: Option<Vec<u8>> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Bytes))
        }
        _ if <String as FromSql>::accepts(type_info) => {
            // text, varchar, bpchar, name, citext and friends
            let val: Option<String> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Text))
        }
        _ => {
            let val: Option<RawValue> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RawValue::into_row_value))
        }
    }
}

/// Any column's wire bytes, untouched. Enum labels travel as text and are kept as text.
#[derive(Debug)]
struct RawValue {
    is_enum: bool,
    bytes: Vec<u8>,
}

impl RawValue {
    fn into_row_value(self) -> RowValues {
        if !self.is_enum {
            return RowValues::Bytes(self.bytes);
        }
        match String::from_utf8(self.bytes) {
            Ok(label) => RowValues::Text(label),
            Err(err) => RowValues::Bytes(err.into_bytes()),
        }
    }
}

impl<'a> FromSql<'a> for RawValue {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Ok(Self {
            is_enum: matches!(ty.kind(), Kind::Enum(_)),
            bytes: raw.to_vec(),
        })
    }

    fn accepts(_: &Type) -> bool {
        true
    }
}

/// `numeric` rendered in its decimal text form, so the textual accessors can parse it at
/// any width without losing precision up front.
#[derive(Debug)]
struct NumericText(String);

const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

impl<'a> FromSql<'a> for NumericText {
    fn from_sql(_: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        let word = |at: usize| -> Result<u16, Box<dyn Error + Sync + Send>> {
            raw.get(at..at + 2)
                .map(|b| u16::from_be_bytes([b[0], b[1]]))
                .ok_or_else(|| "truncated numeric value".into())
        };
        let ndigits = usize::from(word(0)?);
        let weight = i32::from(i16::from_be_bytes(word(2)?.to_be_bytes()));
        let sign = word(4)?;
        let dscale = usize::from(word(6)?);
        let digits = (0..ndigits)
            .map(|i| word(8 + 2 * i))
            .collect::<Result<Vec<_>, _>>()?;

        match sign {
            NUMERIC_NAN => return Ok(Self("NaN".into())),
            NUMERIC_PINF => return Ok(Self("Infinity".into())),
            NUMERIC_NINF => return Ok(Self("-Infinity".into())),
            0 | NUMERIC_NEG => {}
            other => return Err(format!("invalid numeric sign {other:#x}").into()),
        }

        // digit i is a base-10000 group worth 10000^(weight - i)
        let group = |i: i32| {
            usize::try_from(i)
                .ok()
                .and_then(|i| digits.get(i).copied())
                .unwrap_or(0)
        };

        let mut out = String::new();
        if sign == NUMERIC_NEG {
            out.push('-');
        }
        if weight < 0 {
            out.push('0');
        } else {
            for i in 0..=weight {
                if i == 0 {
                    write!(out, "{}", group(i))?;
                } else {
                    write!(out, "{:04}", group(i))?;
                }
            }
        }
        if dscale > 0 {
            let mut fraction = String::with_capacity(dscale + 4);
            let mut i = weight + 1;
            while fraction.len() < dscale {
                write!(fraction, "{:04}", group(i))?;
                i += 1;
            }
            fraction.truncate(dscale);
            out.push('.');
            out.push_str(&fraction);
        }
        Ok(Self(out))
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::NUMERIC
    }
}

fn list<T>(values: Option<Vec<T>>, convert: impl Fn(T) -> RowValues) -> RowValues {
    values.map_or(RowValues::Null, |items| {
        RowValues::List(items.into_iter().map(convert).collect())
    })
}
