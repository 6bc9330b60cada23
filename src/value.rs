//! Fixed-width binary layout of the typed channel.
//!
//! Values carry no tag on disk: a reader has to ask for the same kinds,
//! in the same order, as the writer produced them. All numbers are
//! big-endian. A string is a `u16` byte length followed by its UTF-8 bytes.

use std::fmt;
use std::io::{self, Read};

use crate::{ManagedFileError, Result};

/// Longest string, in UTF-8 bytes, that fits the `u16` length prefix.
pub const MAX_STRING_BYTES: usize = u16::MAX as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Str,
    Int,
    Float,
    Double,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Str => "string",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Double => "double",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Str(String),
    Int(i32),
    Float(f32),
    Double(f64),
}

impl TypedValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            TypedValue::Str(_) => ValueKind::Str,
            TypedValue::Int(_) => ValueKind::Int,
            TypedValue::Float(_) => ValueKind::Float,
            TypedValue::Double(_) => ValueKind::Double,
        }
    }

    /// Encode the value into its on-disk form.
    ///
    /// Fails with `InvalidInput` when a string is too long
    /// for its length prefix.
    pub fn encode(&self) -> io::Result<Vec<u8>> {
        let bytes = match self {
            TypedValue::Str(s) => {
                let len = u16::try_from(s.len()).map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!(
                            "string of {} bytes exceeds the {} bytes limit",
                            s.len(),
                            MAX_STRING_BYTES
                        ),
                    )
                })?;
                let mut bytes = Vec::with_capacity(2 + s.len());
                bytes.extend_from_slice(&len.to_be_bytes());
                bytes.extend_from_slice(s.as_bytes());
                bytes
            }
            TypedValue::Int(v) => v.to_be_bytes().to_vec(),
            TypedValue::Float(v) => v.to_be_bytes().to_vec(),
            TypedValue::Double(v) => v.to_be_bytes().to_vec(),
        };
        Ok(bytes)
    }

    /// Decode the next value of `kind` from `reader`.
    ///
    /// Bytes consumed before a failure are not given back.
    pub fn decode<R: Read + ?Sized>(
        kind: ValueKind,
        reader: &mut R,
    ) -> Result<Self> {
        let value = match kind {
            ValueKind::Str => TypedValue::Str(decode_string(reader)?),
            ValueKind::Int => TypedValue::Int(decode_int(reader)?),
            ValueKind::Float => TypedValue::Float(decode_float(reader)?),
            ValueKind::Double => TypedValue::Double(decode_double(reader)?),
        };
        Ok(value)
    }
}

pub(crate) fn decode_string<R: Read + ?Sized>(
    reader: &mut R,
) -> Result<String> {
    let len = u16::from_be_bytes(read_array(reader)?);
    let mut buf = vec![0; len as usize];
    reader
        .read_exact(&mut buf)
        .map_err(ManagedFileError::from_decode_io)?;
    String::from_utf8(buf).map_err(|err| {
        ManagedFileError::Decode(format!("string is not valid UTF-8: {}", err))
    })
}

pub(crate) fn decode_int<R: Read + ?Sized>(reader: &mut R) -> Result<i32> {
    Ok(i32::from_be_bytes(read_array(reader)?))
}

pub(crate) fn decode_float<R: Read + ?Sized>(reader: &mut R) -> Result<f32> {
    Ok(f32::from_be_bytes(read_array(reader)?))
}

pub(crate) fn decode_double<R: Read + ?Sized>(reader: &mut R) -> Result<f64> {
    Ok(f64::from_be_bytes(read_array(reader)?))
}

fn read_array<const N: usize, R: Read + ?Sized>(
    reader: &mut R,
) -> Result<[u8; N]> {
    let mut buf = [0; N];
    reader
        .read_exact(&mut buf)
        .map_err(ManagedFileError::from_decode_io)?;
    Ok(buf)
}

impl From<i32> for TypedValue {
    fn from(value: i32) -> Self {
        TypedValue::Int(value)
    }
}

impl From<f32> for TypedValue {
    fn from(value: f32) -> Self {
        TypedValue::Float(value)
    }
}

impl From<f64> for TypedValue {
    fn from(value: f64) -> Self {
        TypedValue::Double(value)
    }
}

impl From<String> for TypedValue {
    fn from(value: String) -> Self {
        TypedValue::Str(value)
    }
}

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        TypedValue::Str(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;
    use rstest::rstest;
    use std::io::Cursor;

    #[rstest]
    #[case(TypedValue::Int(42), &[0, 0, 0, 42])]
    #[case(TypedValue::Int(-1), &[0xff, 0xff, 0xff, 0xff])]
    #[case(TypedValue::Float(1.0), &[0x3f, 0x80, 0, 0])]
    #[case(TypedValue::Double(-2.0), &[0xc0, 0, 0, 0, 0, 0, 0, 0])]
    #[case(TypedValue::Str("x".to_owned()), &[0, 1, b'x'])]
    #[case(TypedValue::Str(String::new()), &[0, 0])]
    fn encoded_layout(#[case] value: TypedValue, #[case] expected: &[u8]) {
        assert_eq!(value.encode().unwrap(), expected);
    }

    #[test]
    fn oversized_string_is_rejected() {
        let value = TypedValue::from("a".repeat(MAX_STRING_BYTES + 1));
        let err = value.encode().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        let value = TypedValue::from("a".repeat(MAX_STRING_BYTES));
        assert_eq!(value.encode().unwrap().len(), MAX_STRING_BYTES + 2);
    }

    #[test]
    fn decode_sequence_in_write_order() {
        let mut bytes = TypedValue::Int(7).encode().unwrap();
        bytes.extend(TypedValue::from("héllo").encode().unwrap());
        bytes.extend(TypedValue::Double(0.5).encode().unwrap());
        let mut reader = Cursor::new(bytes);

        assert_eq!(
            TypedValue::decode(ValueKind::Int, &mut reader).unwrap(),
            TypedValue::Int(7)
        );
        assert_eq!(
            TypedValue::decode(ValueKind::Str, &mut reader).unwrap(),
            TypedValue::from("héllo")
        );
        assert_eq!(
            TypedValue::decode(ValueKind::Double, &mut reader).unwrap(),
            TypedValue::Double(0.5)
        );
        assert!(TypedValue::decode(ValueKind::Int, &mut reader)
            .unwrap_err()
            .is_decode());
    }

    #[test]
    fn truncated_value_is_decode_error() {
        let mut reader = Cursor::new(vec![0, 0]);
        let err = TypedValue::decode(ValueKind::Int, &mut reader).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn invalid_utf8_is_decode_error() {
        let mut reader = Cursor::new(vec![0, 2, 0xc3, 0x28]);
        let err = TypedValue::decode(ValueKind::Str, &mut reader).unwrap_err();
        assert!(err.is_decode());
    }

    #[quickcheck]
    fn prop_int_survives_encoding(value: i32) -> bool {
        let bytes = TypedValue::Int(value).encode().unwrap();
        TypedValue::decode(ValueKind::Int, &mut Cursor::new(bytes)).unwrap()
            == TypedValue::Int(value)
    }

    #[quickcheck]
    fn prop_double_bits_survive_encoding(value: f64) -> bool {
        let bytes = TypedValue::Double(value).encode().unwrap();
        match TypedValue::decode(ValueKind::Double, &mut Cursor::new(bytes)) {
            Ok(TypedValue::Double(decoded)) => {
                decoded.to_bits() == value.to_bits()
            }
            _ => false,
        }
    }

    #[quickcheck]
    fn prop_string_survives_encoding(value: String) -> bool {
        let bytes = match TypedValue::from(value.as_str()).encode() {
            Ok(bytes) => bytes,
            Err(_) => return value.len() > MAX_STRING_BYTES,
        };
        TypedValue::decode(ValueKind::Str, &mut Cursor::new(bytes)).unwrap()
            == TypedValue::Str(value)
    }
}
