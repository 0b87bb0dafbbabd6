//! Element type registry: the closed set of storage types and their metadata.


use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{QuantError, Result};

/// Element type identifier.
///
/// The discriminant indexes the static metadata table and is the value
/// stored wherever a type tag is persisted as a byte.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[repr(u8)]
pub enum TypeId {
    /// IEEE-754 single precision, stored as `f32`
    #[default]
    F32 = 0,
    /// Single precision bit pattern, stored as `u32` (lossless)
    E8m23 = 1,
    /// Half precision, 1/5/10
    E5m10 = 2,
    /// Brain float, 1/8/7
    E8m7 = 3,
    /// Micro float, 1/4/3
    E4m3 = 4,
    /// Blockwise int8 with a shared power-of-two scale
    Q8 = 5,
}

impl TypeId {
    /// Number of element types.
    pub const COUNT: usize = 6;

    /// Every type in discriminant order.
    pub const ALL: [TypeId; Self::COUNT] = [
        TypeId::F32,
        TypeId::E8m23,
        TypeId::E5m10,
        TypeId::E8m7,
        TypeId::E4m3,
        TypeId::Q8,
    ];

    /// Static metadata for this type.
    #[inline]
    pub fn info(self) -> &'static TypeInfo {
        &TYPE_DATA[self as usize]
    }

    /// Canonical lowercase name.
    #[inline]
    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Bytes per stored element (value bytes only for Q8).
    #[inline]
    pub fn size(self) -> usize {
        self.info().size
    }

    #[inline]
    pub fn alignment(self) -> usize {
        self.info().alignment
    }

    /// Whether the type is encoded blockwise rather than element by element.
    pub fn is_blockwise(self) -> bool {
        matches!(self, Self::Q8)
    }
}

impl From<TypeId> for u8 {
    fn from(id: TypeId) -> u8 {
        id as u8
    }
}

impl TryFrom<u8> for TypeId {
    type Error = QuantError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(TypeId::F32),
            1 => Ok(TypeId::E8m23),
            2 => Ok(TypeId::E5m10),
            3 => Ok(TypeId::E8m7),
            4 => Ok(TypeId::E4m3),
            5 => Ok(TypeId::Q8),
            _ => Err(QuantError::UnsupportedType(value)),
        }
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a type name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTypeIdError(String);

impl fmt::Display for ParseTypeIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown element type '{}' (expected one of: f32, e8m23, e5m10, e8m7, e4m3, q8)",
            self.0
        )
    }
}

impl std::error::Error for ParseTypeIdError {}

impl FromStr for TypeId {
    type Err = ParseTypeIdError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "f32" | "float" => Ok(TypeId::F32),
            "e8m23" => Ok(TypeId::E8m23),
            "e5m10" | "f16" | "half" => Ok(TypeId::E5m10),
            "e8m7" | "bf16" => Ok(TypeId::E8m7),
            "e4m3" | "fp8" => Ok(TypeId::E4m3),
            "q8" | "mx8" => Ok(TypeId::Q8),
            _ => Err(ParseTypeIdError(s.to_string())),
        }
    }
}

impl Serialize for TypeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for TypeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

//=============================================================================
// Metadata table
//=============================================================================

/// Immutable per-type metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeInfo {
    pub name: &'static str,
    pub alignment: usize,
    pub size: usize,
    pub id: TypeId,
}

impl TypeInfo {
    /// Bytes needed to store `len` elements.
    ///
    /// For Q8 this includes one scale byte per `block_size` elements.
    pub fn storage_bytes(&self, len: usize, block_size: usize) -> usize {
        match self.id {
            TypeId::Q8 if block_size > 0 => len * self.size + len.div_ceil(block_size),
            _ => len * self.size,
        }
    }
}

static TYPE_DATA: [TypeInfo; TypeId::COUNT] = [
    TypeInfo {
        name: "f32",
        alignment: 4,
        size: 4,
        id: TypeId::F32,
    },
    TypeInfo {
        name: "e8m23",
        alignment: 4,
        size: 4,
        id: TypeId::E8m23,
    },
    TypeInfo {
        name: "e5m10",
        alignment: 2,
        size: 2,
        id: TypeId::E5m10,
    },
    TypeInfo {
        name: "e8m7",
        alignment: 2,
        size: 2,
        id: TypeId::E8m7,
    },
    TypeInfo {
        name: "e4m3",
        alignment: 1,
        size: 1,
        id: TypeId::E4m3,
    },
    TypeInfo {
        name: "q8",
        alignment: 1,
        size: 1,
        id: TypeId::Q8,
    },
];

/// Metadata for a raw type tag, or `None` when the tag is out of range.
pub fn type_metadata(raw: u8) -> Option<&'static TypeInfo> {
    TYPE_DATA.get(raw as usize)
}

/// The full metadata table in discriminant order.
pub fn all_types() -> &'static [TypeInfo] {
    &TYPE_DATA
}
