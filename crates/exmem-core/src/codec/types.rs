use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::error::{Error, Result};

/// Width of a pointer in the remote address space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerWidth {
    Bits32,
    #[default]
    Bits64,
}

impl PointerWidth {
    pub fn from_is_64bit(is_64bit: bool) -> Self {
        if is_64bit { Self::Bits64 } else { Self::Bits32 }
    }

    /// Size of a pointer in bytes
    pub fn size(&self) -> usize {
        match self {
            Self::Bits32 => 4,
            Self::Bits64 => 8,
        }
    }
}

/// Scalar types understood by the codec
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    IntoStaticStr,
    Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ValueType {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Pointer,
}

impl ValueType {
    /// Parse a type tag, reporting unknown tags as a configuration error
    pub fn parse(tag: &str) -> Result<Self> {
        tag.trim()
            .to_ascii_lowercase()
            .parse()
            .map_err(|_| Error::UnknownValueType(tag.to_string()))
    }

    /// Encoded size in bytes
    pub fn size(&self, pointer_width: PointerWidth) -> usize {
        match self {
            Self::Bool | Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
            Self::Pointer => pointer_width.size(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}
