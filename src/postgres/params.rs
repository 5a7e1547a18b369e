use std::error::Error;

use chrono::{DateTime, FixedOffset};
use tokio_postgres::types::{IsNull, Kind, ToSql, Type, to_sql_checked};
use tokio_util::bytes;
use uuid::Uuid;

use crate::identifier::Identifier;
use crate::results::parse_timestamp;
use crate::types::RowValues;

/// Borrow resolved values as the driver's parameter slice.
#[must_use]
pub fn as_refs(values: &[RowValues]) -> Vec<&(dyn ToSql + Sync)> {
    let mut references = Vec::with_capacity(values.len());
    for value in values {
        references.push(value as &(dyn ToSql + Sync));
    }
    references
}

type BoxError = Box<dyn Error + Sync + Send>;

fn is_text(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN
    )
}

fn is_json(ty: &Type) -> bool {
    matches!(*ty, Type::JSON | Type::JSONB)
}

fn mismatch(value: &RowValues, ty: &Type) -> BoxError {
    let kind = match value {
        RowValues::Null => "null",
        RowValues::Bool(_) => "bool",
        RowValues::Int(_) => "integer",
        RowValues::Float(_) => "float",
        RowValues::Text(_) => "text",
        RowValues::Timestamp(_) => "timestamp",
        RowValues::Identifier(_) => "identifier",
        RowValues::Bytes(_) => "bytes",
        RowValues::Nested(_) => "nested object",
        RowValues::List(_) => "list",
    };
    format!("cannot bind a {kind} value to a {ty} parameter").into()
}

/// Parse the value's textual form at the parameter's width. Floats with a fraction,
/// booleans and timestamps never parse as integers.
fn parse_scalar<T: std::str::FromStr>(value: &RowValues, ty: &Type) -> Result<T, BoxError> {
    let text = value.textual_form().ok_or_else(|| mismatch(value, ty))?;
    text.trim()
        .parse::<T>()
        .map_err(|_| format!("{text:?} is not a valid {ty} value").into())
}

fn parse_bool(value: &RowValues, ty: &Type) -> Result<bool, BoxError> {
    if let RowValues::Bool(b) = value {
        return Ok(*b);
    }
    let text = value.textual_form().ok_or_else(|| mismatch(value, ty))?;
    match text.trim().to_ascii_lowercase().as_str() {
        "t" | "true" | "y" | "yes" | "on" | "1" => Ok(true),
        "f" | "false" | "n" | "no" | "off" | "0" => Ok(false),
        _ => Err(format!("{text:?} is not a valid {ty} value").into()),
    }
}

fn timestamp(value: &RowValues, ty: &Type) -> Result<DateTime<FixedOffset>, BoxError> {
    match value {
        RowValues::Timestamp(ts) => Ok(*ts),
        RowValues::Text(text) => DateTime::parse_from_rfc3339(text.trim())
            .ok()
            .or_else(|| parse_timestamp(text))
            .ok_or_else(|| format!("{text:?} is not a valid {ty} value").into()),
        other => Err(mismatch(other, ty)),
    }
}

fn uuid(value: &RowValues, ty: &Type) -> Result<Uuid, BoxError> {
    match value {
        RowValues::Identifier(id) => Ok(*id.as_uuid()),
        RowValues::Text(text) => Ok(*Identifier::parse(text.trim())?.as_uuid()),
        RowValues::Bytes(bytes) => Ok(*Identifier::from_slice(bytes)?.as_uuid()),
        other => Err(mismatch(other, ty)),
    }
}

impl ToSql for RowValues {
    fn to_sql(&self, ty: &Type, out: &mut bytes::BytesMut) -> Result<IsNull, BoxError> {
        if self.is_null() {
            return Ok(IsNull::Yes);
        }
        if is_json(ty) {
            return self.to_json().to_sql_checked(ty, out);
        }
        if is_text(ty) {
            let text = self.textual_form().ok_or_else(|| mismatch(self, ty))?;
            let text: &str = &text;
            return text.to_sql_checked(ty, out);
        }
        if let Kind::Array(_) = ty.kind() {
            return match self {
                RowValues::List(items) => items.to_sql_checked(ty, out),
                other => Err(mismatch(other, ty)),
            };
        }

        match *ty {
            Type::BOOL => parse_bool(self, ty)?.to_sql_checked(ty, out),
            Type::CHAR => parse_scalar::<i8>(self, ty)?.to_sql_checked(ty, out),
            Type::INT2 => parse_scalar::<i16>(self, ty)?.to_sql_checked(ty, out),
            Type::INT4 => parse_scalar::<i32>(self, ty)?.to_sql_checked(ty, out),
            Type::INT8 => parse_scalar::<i64>(self, ty)?.to_sql_checked(ty, out),
            Type::OID => parse_scalar::<u32>(self, ty)?.to_sql_checked(ty, out),
            Type::FLOAT4 => match self {
                RowValues::Int(_) | RowValues::Float(_) | RowValues::Text(_) => {
                    parse_scalar::<f32>(self, ty)?.to_sql_checked(ty, out)
                }
                other => Err(mismatch(other, ty)),
            },
            Type::FLOAT8 => match self {
                RowValues::Float(f) => f.to_sql_checked(ty, out),
                RowValues::Int(_) | RowValues::Text(_) => {
                    parse_scalar::<f64>(self, ty)?.to_sql_checked(ty, out)
                }
                other => Err(mismatch(other, ty)),
            },
            Type::TIMESTAMPTZ => timestamp(self, ty)?.to_sql_checked(ty, out),
            Type::TIMESTAMP => timestamp(self, ty)?.naive_utc().to_sql_checked(ty, out),
            Type::DATE => timestamp(self, ty)?.date_naive().to_sql_checked(ty, out),
            Type::UUID => uuid(self, ty)?.to_sql_checked(ty, out),
            Type::BYTEA => match self {
                RowValues::Bytes(bytes) => bytes.to_sql_checked(ty, out),
                other => Err(mismatch(other, ty)),
            },
            _ => Err(mismatch(self, ty)),
        }
    }

    fn accepts(ty: &Type) -> bool {
        if let Kind::Array(member) = ty.kind() {
            return Self::accepts(member);
        }
        matches!(
            *ty,
            Type::INT2
                | Type::INT4
                | Type::INT8
                | Type::OID
                | Type::CHAR
                | Type::FLOAT4
                | Type::FLOAT8
                | Type::TEXT
                | Type::VARCHAR
                | Type::BPCHAR
                | Type::NAME
                | Type::UNKNOWN
                | Type::BOOL
                | Type::TIMESTAMP
                | Type::TIMESTAMPTZ
                | Type::DATE
                | Type::JSON
                | Type::JSONB
                | Type::BYTEA
                | Type::UUID
        )
    }

    to_sql_checked!();
}
