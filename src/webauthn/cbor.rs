//! CBOR encoding for `WebAuthn`
//!
//! A minimal encoder for the subset of CBOR (RFC 8949) that authenticators
//! emit: integers, byte strings, text strings, arrays and maps. Arguments use
//! the shortest form, as required by the CTAP2 canonical encoding.
//!
//! Maps are ordered key/value lists and are written in insertion order. The
//! caller is responsible for inserting keys in canonical order.

use super::errors::WebAuthnError;

const TYPE_UNSIGNED_INT: u8 = 0x00;
const TYPE_NEGATIVE_INT: u8 = 0x01;
const TYPE_BYTE_STRING: u8 = 0x02;
const TYPE_TEXT_STRING: u8 = 0x03;
const TYPE_ARRAY: u8 = 0x04;
const TYPE_MAP: u8 = 0x05;

/// A CBOR data item
#[derive(Debug, Clone, PartialEq)]
pub enum CborValue {
    Integer(i64),
    Bytes(Vec<u8>),
    Text(String),
    Array(Vec<CborValue>),
    /// Ordered key/value pairs, encoded in this order
    Map(Vec<(CborValue, CborValue)>),
    /// Not encodable; present so that floating point input is rejected explicitly
    Float(f64),
}

impl CborValue {
    /// Build a map from `(key, value)` pairs, keeping their order
    #[must_use]
    pub fn map<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (CborValue, CborValue)>,
    {
        CborValue::Map(entries.into_iter().collect())
    }

    /// An empty map (`0xa0`)
    #[must_use]
    pub fn empty_map() -> Self {
        CborValue::Map(Vec::new())
    }
}

impl From<i64> for CborValue {
    fn from(value: i64) -> Self {
        CborValue::Integer(value)
    }
}

impl From<&str> for CborValue {
    fn from(value: &str) -> Self {
        CborValue::Text(value.to_string())
    }
}

impl From<String> for CborValue {
    fn from(value: String) -> Self {
        CborValue::Text(value)
    }
}

impl From<Vec<u8>> for CborValue {
    fn from(value: Vec<u8>) -> Self {
        CborValue::Bytes(value)
    }
}

impl From<&[u8]> for CborValue {
    fn from(value: &[u8]) -> Self {
        CborValue::Bytes(value.to_vec())
    }
}

/// Encode a value to CBOR bytes
///
/// # Errors
/// Returns `WebAuthnError::EncodingError` for floating point values and for
/// lengths or integers whose argument does not fit in 32 bits.
pub fn encode(value: &CborValue) -> Result<Vec<u8>, WebAuthnError> {
    let mut out = Vec::new();
    encode_into(value, &mut out)?;
    Ok(out)
}

fn encode_into(value: &CborValue, out: &mut Vec<u8>) -> Result<(), WebAuthnError> {
    match value {
        CborValue::Integer(n) => {
            if *n >= 0 {
                write_arg(out, TYPE_UNSIGNED_INT, n.unsigned_abs())
            } else {
                // -1 - n, without overflowing on i64::MIN
                write_arg(out, TYPE_NEGATIVE_INT, n.unsigned_abs() - 1)
            }
        }
        CborValue::Bytes(bytes) => {
            write_len(out, TYPE_BYTE_STRING, bytes.len())?;
            out.extend_from_slice(bytes);
            Ok(())
        }
        CborValue::Text(text) => {
            write_len(out, TYPE_TEXT_STRING, text.len())?;
            out.extend_from_slice(text.as_bytes());
            Ok(())
        }
        CborValue::Array(items) => {
            write_len(out, TYPE_ARRAY, items.len())?;
            items.iter().try_for_each(|item| encode_into(item, out))
        }
        CborValue::Map(entries) => {
            write_len(out, TYPE_MAP, entries.len())?;
            for (key, val) in entries {
                encode_into(key, out)?;
                encode_into(val, out)?;
            }
            Ok(())
        }
        CborValue::Float(f) => Err(WebAuthnError::EncodingError(format!(
            "Floating point values are not supported: {f}"
        ))),
    }
}

fn write_len(out: &mut Vec<u8>, major: u8, len: usize) -> Result<(), WebAuthnError> {
    let len = u64::try_from(len)
        .map_err(|_| WebAuthnError::EncodingError("Length does not fit in u64".to_string()))?;
    write_arg(out, major, len)
}

#[allow(clippy::cast_possible_truncation)]
fn write_arg(out: &mut Vec<u8>, major: u8, arg: u64) -> Result<(), WebAuthnError> {
    let t = major << 5;
    if arg < 24 {
        // arg < 24 fits in the low five bits
        out.push(t | arg as u8);
    } else if let Ok(a) = u8::try_from(arg) {
        out.push(t | 24);
        out.push(a);
    } else if let Ok(a) = u16::try_from(arg) {
        out.push(t | 25);
        out.extend_from_slice(&a.to_be_bytes());
    } else if let Ok(a) = u32::try_from(arg) {
        out.push(t | 26);
        out.extend_from_slice(&a.to_be_bytes());
    } else {
        return Err(WebAuthnError::EncodingError(format!(
            "Argument {arg} exceeds 32 bits"
        )));
    }
    Ok(())
}
