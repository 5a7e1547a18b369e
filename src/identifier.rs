use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

/// Length of the hyphenated textual form, e.g. `8e17f234-9e0a-49dc-8a7d-c967ca2df1c6`.
pub const IDENTIFIER_STR_LEN: usize = 36;

const DASH_POSITIONS: [usize; 4] = [8, 13, 18, 23];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("malformed identifier: string must be {IDENTIFIER_STR_LEN} characters long, got {0}")]
    Length(usize),
    #[error("malformed identifier: missing dashes")]
    Dashes,
    #[error("malformed identifier: invalid characters")]
    Characters,
    #[error("malformed identifier: must be 16B long, got {0}B")]
    ByteLength(usize),
}

/// A 16-byte identifier stored in `uuid` columns.
///
/// Parsing is strict: only the 36 character hyphenated form or exactly 16 raw bytes are
/// accepted. Any version/variant is allowed on input; [`Identifier::new_v4`] produces
/// random version 4 identifiers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Identifier(Uuid);

impl Identifier {
    /// The all-zero identifier.
    #[must_use]
    pub const fn nil() -> Self {
        Identifier(Uuid::nil())
    }

    #[must_use]
    pub fn new_v4() -> Self {
        Identifier(Uuid::new_v4())
    }

    /// Parse the hyphenated 36 character form.
    ///
    /// # Errors
    /// Returns an [`IdentifierError`] when the length, dash layout, or hex digits are wrong.
    pub fn parse(s: &str) -> Result<Self, IdentifierError> {
        if s.len() != IDENTIFIER_STR_LEN {
            return Err(IdentifierError::Length(s.len()));
        }
        let bytes = s.as_bytes();
        if DASH_POSITIONS.iter().any(|&pos| bytes[pos] != b'-') {
            return Err(IdentifierError::Dashes);
        }
        let hex_ok = bytes
            .iter()
            .enumerate()
            .filter(|(idx, _)| !DASH_POSITIONS.contains(idx))
            .all(|(_, b)| b.is_ascii_hexdigit());
        if !hex_ok {
            return Err(IdentifierError::Characters);
        }
        Uuid::try_parse(s)
            .map(Identifier)
            .map_err(|_| IdentifierError::Characters)
    }

    /// Read exactly 16 raw bytes.
    ///
    /// # Errors
    /// Returns [`IdentifierError::ByteLength`] for any other length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, IdentifierError> {
        Uuid::from_slice(bytes)
            .map(Identifier)
            .map_err(|_| IdentifierError::ByteLength(bytes.len()))
    }

    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Identifier(Uuid::from_bytes(bytes))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self.0.hyphenated())
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Identifier::parse(s)
    }
}

impl From<Uuid> for Identifier {
    fn from(value: Uuid) -> Self {
        Identifier(value)
    }
}

impl From<Identifier> for Uuid {
    fn from(value: Identifier) -> Self {
        value.0
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Identifier::parse(&raw).map_err(serde::de::Error::custom)
    }
}
