use std::fmt;

use serde::Serialize;

use super::types::{PointerWidth, ValueType};
use crate::error::{Error, Result};

/// A decoded field value
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Never decoded, or a field kind that carries no scalar (nested instance)
    #[default]
    None,
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Pointer(u64),
    String(String),
}

impl Value {
    /// Zero value for a scalar type
    pub fn zero(value_type: ValueType) -> Self {
        match value_type {
            ValueType::Bool => Self::Bool(false),
            ValueType::I8 => Self::I8(0),
            ValueType::U8 => Self::U8(0),
            ValueType::I16 => Self::I16(0),
            ValueType::U16 => Self::U16(0),
            ValueType::I32 => Self::I32(0),
            ValueType::U32 => Self::U32(0),
            ValueType::I64 => Self::I64(0),
            ValueType::U64 => Self::U64(0),
            ValueType::F32 => Self::F32(0.0),
            ValueType::F64 => Self::F64(0.0),
            ValueType::Pointer => Self::Pointer(0),
        }
    }

    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Self::Bool(_) => Some(ValueType::Bool),
            Self::I8(_) => Some(ValueType::I8),
            Self::U8(_) => Some(ValueType::U8),
            Self::I16(_) => Some(ValueType::I16),
            Self::U16(_) => Some(ValueType::U16),
            Self::I32(_) => Some(ValueType::I32),
            Self::U32(_) => Some(ValueType::U32),
            Self::I64(_) => Some(ValueType::I64),
            Self::U64(_) => Some(ValueType::U64),
            Self::F32(_) => Some(ValueType::F32),
            Self::F64(_) => Some(ValueType::F64),
            Self::Pointer(_) => Some(ValueType::Pointer),
            Self::None | Self::String(_) => None,
        }
    }

    /// Pointer value, or 0 when this isn't a pointer
    pub fn as_pointer(&self) -> u64 {
        match self {
            Self::Pointer(p) => *p,
            _ => 0,
        }
    }

    /// Integer view used for counts and other small header values
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::I8(v) => Some(v as i64),
            Self::U8(v) => Some(v as i64),
            Self::I16(v) => Some(v as i64),
            Self::U16(v) => Some(v as i64),
            Self::I32(v) => Some(v as i64),
            Self::U32(v) => Some(v as i64),
            Self::I64(v) => Some(v),
            Self::U64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::String(_) => "string",
            other => other.value_type().map(|t| t.as_str()).unwrap_or("none"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "-"),
            Self::Bool(v) => write!(f, "{}", v),
            Self::I8(v) => write!(f, "{}", v),
            Self::U8(v) => write!(f, "{}", v),
            Self::I16(v) => write!(f, "{}", v),
            Self::U16(v) => write!(f, "{}", v),
            Self::I32(v) => write!(f, "{}", v),
            Self::U32(v) => write!(f, "{}", v),
            Self::I64(v) => write!(f, "{}", v),
            Self::U64(v) => write!(f, "{}", v),
            Self::F32(v) => write!(f, "{}", v),
            Self::F64(v) => write!(f, "{}", v),
            Self::Pointer(p) => write!(f, "0x{:X}", p),
            Self::String(s) => write!(f, "{:?}", s),
        }
    }
}

/// Conversion out of a decoded [`Value`]
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from_value! {
    bool => Bool,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    String => String,
}

// Pointers are exposed as plain addresses.
impl FromValue for u64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::U64(v) | Value::Pointer(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

fn fixed<const N: usize>(value_type: ValueType, bytes: &[u8]) -> Result<[u8; N]> {
    bytes
        .get(..N)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| Error::ValueSize {
            value_type: value_type.to_string(),
            expected: N,
            actual: bytes.len(),
        })
}

/// Decode a little-endian scalar from the front of `bytes`
pub fn decode(value_type: ValueType, bytes: &[u8], pointer_width: PointerWidth) -> Result<Value> {
    let value = match value_type {
        ValueType::Bool => Value::Bool(fixed::<1>(value_type, bytes)?[0] != 0),
        ValueType::I8 => Value::I8(i8::from_le_bytes(fixed(value_type, bytes)?)),
        ValueType::U8 => Value::U8(u8::from_le_bytes(fixed(value_type, bytes)?)),
        ValueType::I16 => Value::I16(i16::from_le_bytes(fixed(value_type, bytes)?)),
        ValueType::U16 => Value::U16(u16::from_le_bytes(fixed(value_type, bytes)?)),
        ValueType::I32 => Value::I32(i32::from_le_bytes(fixed(value_type, bytes)?)),
        ValueType::U32 => Value::U32(u32::from_le_bytes(fixed(value_type, bytes)?)),
        ValueType::I64 => Value::I64(i64::from_le_bytes(fixed(value_type, bytes)?)),
        ValueType::U64 => Value::U64(u64::from_le_bytes(fixed(value_type, bytes)?)),
        ValueType::F32 => Value::F32(f32::from_le_bytes(fixed(value_type, bytes)?)),
        ValueType::F64 => Value::F64(f64::from_le_bytes(fixed(value_type, bytes)?)),
        ValueType::Pointer => match pointer_width {
            PointerWidth::Bits32 => {
                Value::Pointer(u32::from_le_bytes(fixed(value_type, bytes)?) as u64)
            }
            PointerWidth::Bits64 => Value::Pointer(u64::from_le_bytes(fixed(value_type, bytes)?)),
        },
    };
    Ok(value)
}

/// Encode a scalar into its little-endian representation
pub fn encode(value_type: ValueType, value: &Value, pointer_width: PointerWidth) -> Result<Vec<u8>> {
    let bytes = match (value_type, value) {
        (ValueType::Bool, Value::Bool(v)) => vec![*v as u8],
        (ValueType::I8, Value::I8(v)) => v.to_le_bytes().to_vec(),
        (ValueType::U8, Value::U8(v)) => v.to_le_bytes().to_vec(),
        (ValueType::I16, Value::I16(v)) => v.to_le_bytes().to_vec(),
        (ValueType::U16, Value::U16(v)) => v.to_le_bytes().to_vec(),
        (ValueType::I32, Value::I32(v)) => v.to_le_bytes().to_vec(),
        (ValueType::U32, Value::U32(v)) => v.to_le_bytes().to_vec(),
        (ValueType::I64, Value::I64(v)) => v.to_le_bytes().to_vec(),
        (ValueType::U64, Value::U64(v)) => v.to_le_bytes().to_vec(),
        (ValueType::F32, Value::F32(v)) => v.to_le_bytes().to_vec(),
        (ValueType::F64, Value::F64(v)) => v.to_le_bytes().to_vec(),
        (ValueType::Pointer, Value::Pointer(p)) => match pointer_width {
            PointerWidth::Bits32 => u32::try_from(*p)
                .map_err(|_| Error::ValueTypeMismatch {
                    expected: "32-bit pointer".to_string(),
                    actual: format!("0x{:X}", p),
                })?
                .to_le_bytes()
                .to_vec(),
            PointerWidth::Bits64 => p.to_le_bytes().to_vec(),
        },
        (expected, actual) => {
            return Err(Error::ValueTypeMismatch {
                expected: expected.to_string(),
                actual: actual.kind_name().to_string(),
            });
        }
    };
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TYPES: [ValueType; 12] = [
        ValueType::Bool,
        ValueType::I8,
        ValueType::U8,
        ValueType::I16,
        ValueType::U16,
        ValueType::I32,
        ValueType::U32,
        ValueType::I64,
        ValueType::U64,
        ValueType::F32,
        ValueType::F64,
        ValueType::Pointer,
    ];

    fn sample(value_type: ValueType) -> Value {
        match value_type {
            ValueType::Bool => Value::Bool(true),
            ValueType::I8 => Value::I8(-12),
            ValueType::U8 => Value::U8(0xFE),
            ValueType::I16 => Value::I16(-3000),
            ValueType::U16 => Value::U16(0xBEEF),
            ValueType::I32 => Value::I32(-123_456),
            ValueType::U32 => Value::U32(0xDEAD_BEEF),
            ValueType::I64 => Value::I64(i64::MIN + 7),
            ValueType::U64 => Value::U64(u64::MAX - 1),
            ValueType::F32 => Value::F32(1.5),
            ValueType::F64 => Value::F64(-2.25e10),
            ValueType::Pointer => Value::Pointer(0x7FF0_1234),
        }
    }

    #[test]
    fn test_encode_decode_all_types_both_widths() {
        for width in [PointerWidth::Bits32, PointerWidth::Bits64] {
            for value_type in ALL_TYPES {
                let value = sample(value_type);
                let bytes = encode(value_type, &value, width).unwrap();
                assert_eq!(bytes.len(), value_type.size(width));
                assert_eq!(decode(value_type, &bytes, width).unwrap(), value);
            }
        }
    }

    #[test]
    fn test_decode_little_endian_i32() {
        let bytes = [0x10, 0, 0, 0, 0x01, 0, 0, 0];
        let width = PointerWidth::Bits64;
        assert_eq!(decode(ValueType::I32, &bytes[0..4], width).unwrap(), Value::I32(16));
        assert_eq!(decode(ValueType::I32, &bytes[4..8], width).unwrap(), Value::I32(1));
    }

    #[test]
    fn test_decode_pointer_32bit_ignores_trailing_bytes() {
        let bytes = [0x78, 0x56, 0x34, 0x12, 0xFF, 0xFF, 0xFF, 0xFF];
        let value = decode(ValueType::Pointer, &bytes, PointerWidth::Bits32).unwrap();
        assert_eq!(value, Value::Pointer(0x1234_5678));
    }

    #[test]
    fn test_decode_short_slice() {
        let err = decode(ValueType::U64, &[1, 2, 3], PointerWidth::Bits64).unwrap_err();
        assert!(matches!(
            err,
            Error::ValueSize {
                expected: 8,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_encode_type_mismatch() {
        let err = encode(ValueType::I32, &Value::F32(1.0), PointerWidth::Bits64).unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(
            err.to_string(),
            "Value type mismatch: expected i32, got f32"
        );
    }

    #[test]
    fn test_encode_pointer_too_wide_for_32bit() {
        let value = Value::Pointer(0x1_0000_0000);
        assert!(encode(ValueType::Pointer, &value, PointerWidth::Bits32).is_err());
        assert!(encode(ValueType::Pointer, &value, PointerWidth::Bits64).is_ok());
    }

    #[test]
    fn test_from_value() {
        assert_eq!(i32::from_value(&Value::I32(7)), Some(7));
        assert_eq!(i32::from_value(&Value::U32(7)), None);
        assert_eq!(u64::from_value(&Value::Pointer(0x1000)), Some(0x1000));
        assert_eq!(
            String::from_value(&Value::String("abc".to_string())),
            Some("abc".to_string())
        );
    }

    #[test]
    fn test_value_helpers() {
        assert_eq!(Value::zero(ValueType::F32), Value::F32(0.0));
        assert_eq!(Value::I32(-3).as_i64(), Some(-3));
        assert_eq!(Value::U64(u64::MAX).as_i64(), None);
        assert_eq!(Value::Pointer(0x20).as_pointer(), 0x20);
        assert_eq!(Value::I32(5).as_pointer(), 0);
        assert_eq!(Value::Pointer(0xAB).to_string(), "0xAB");
    }
}
