//! Field-at-a-time access to a JSON log record.
//!
//! Values are borrowed from the input buffer while the record is walked and
//! only copied out when a caller asks for their text, so a record is never
//! materialized as a `serde_json::Value` tree.

use std::borrow::Cow;
use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::value::RawValue;

use crate::error::ParseError;

/// JSON type of a top-level value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Number,
    Object,
    Array,
    Boolean,
    Null,
}

impl ValueType {
    fn of(raw: &str) -> Self {
        match raw.as_bytes().first() {
            Some(b'"') => ValueType::String,
            Some(b'{') => ValueType::Object,
            Some(b'[') => ValueType::Array,
            Some(b't') | Some(b'f') => ValueType::Boolean,
            Some(b'n') => ValueType::Null,
            _ => ValueType::Number,
        }
    }
}

/// One top-level `key: value` pair of a record.
#[derive(Debug, Clone)]
pub struct Field<'a> {
    key: Cow<'a, str>,
    raw: &'a str,
    kind: ValueType,
    offset: usize,
}

impl<'a> Field<'a> {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Raw JSON text of the value, quotes and escapes included.
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    pub fn kind(&self) -> ValueType {
        self.kind
    }

    /// Byte offset of the value inside the record.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Text of the value as written in the record.
    ///
    /// Strings lose their quotes but keep escape sequences untouched; any
    /// other value is its JSON text.
    pub fn text(&self) -> &'a str {
        match self.kind {
            ValueType::String => &self.raw[1..self.raw.len() - 1],
            _ => self.raw,
        }
    }
}

/// Return the text of the first top-level `key` in `data`.
pub fn field(data: &[u8], key: &str) -> Result<String, ParseError> {
    let mut found = None;
    each_field(data, |field| {
        if found.is_none() && field.key() == key {
            found = Some(field.text().to_owned());
        }
        Ok::<_, ParseError>(())
    })?;

    found.ok_or_else(|| ParseError::MissingField(key.to_owned()))
}

/// Invoke `callback` for every top-level field of `data`, in encoded order.
///
/// The record is validated as a whole before the first callback runs. The
/// walk stops at the first callback error, which is returned unchanged.
pub fn each_field<'a, F, E>(data: &'a [u8], mut callback: F) -> Result<(), E>
where
    F: FnMut(Field<'a>) -> Result<(), E>,
    E: From<ParseError>,
{
    for field in fields(data).map_err(E::from)? {
        callback(field)?;
    }
    Ok(())
}

fn fields(data: &[u8]) -> Result<Vec<Field<'_>>, ParseError> {
    let mut de = serde_json::Deserializer::from_slice(data);
    let fields = (&mut de).deserialize_map(FieldsVisitor {
        base: data.as_ptr() as usize,
    })?;
    de.end()?;
    Ok(fields)
}

struct FieldsVisitor {
    base: usize,
}

impl<'de> Visitor<'de> for FieldsVisitor {
    type Value = Vec<Field<'de>>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut fields = Vec::with_capacity(map.size_hint().unwrap_or(8));
        while let Some(Key(key)) = map.next_key()? {
            let value: &'de RawValue = map.next_value()?;
            let raw = value.get();
            fields.push(Field {
                key,
                raw,
                kind: ValueType::of(raw),
                offset: raw.as_ptr() as usize - self.base,
            });
        }
        Ok(fields)
    }
}

/// Object key that borrows from the input unless it had to be unescaped.
struct Key<'de>(Cow<'de, str>);

impl<'de> Deserialize<'de> for Key<'de> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct KeyVisitor;

        impl<'de> Visitor<'de> for KeyVisitor {
            type Value = Key<'de>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string key")
            }

            fn visit_borrowed_str<E: de::Error>(self, v: &'de str) -> Result<Self::Value, E> {
                Ok(Key(Cow::Borrowed(v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(Key(Cow::Owned(v.to_owned())))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(Key(Cow::Owned(v)))
            }
        }

        deserializer.deserialize_str(KeyVisitor)
    }
}
