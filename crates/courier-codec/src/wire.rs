//! Primitive wire vocabulary of the data map

use crate::{AssetRef, DataMap};
use serde::{Deserialize, Serialize};

/// Kind of value a data map entry can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    Bool,
    Byte,
    ByteArray,
    Double,
    Float,
    FloatArray,
    Int,
    IntList,
    Long,
    LongArray,
    String,
    StringArray,
    StringList,
    Map,
    MapList,
    Asset,
}

impl WireType {
    pub const ALL: [WireType; 16] = [
        WireType::Bool,
        WireType::Byte,
        WireType::ByteArray,
        WireType::Double,
        WireType::Float,
        WireType::FloatArray,
        WireType::Int,
        WireType::IntList,
        WireType::Long,
        WireType::LongArray,
        WireType::String,
        WireType::StringArray,
        WireType::StringList,
        WireType::Map,
        WireType::MapList,
        WireType::Asset,
    ];

    /// Rust type names accepted for this wire type
    ///
    /// Names are compared after whitespace is removed, so `Vec< u8 >` and
    /// `Vec<u8>` are the same type.
    pub fn rust_types(&self) -> &'static [&'static str] {
        match self {
            WireType::Bool => &["bool"],
            WireType::Byte => &["i8"],
            WireType::ByteArray => &["Vec<u8>"],
            WireType::Double => &["f64"],
            WireType::Float => &["f32"],
            WireType::FloatArray => &["Vec<f32>"],
            WireType::Int => &["i32"],
            WireType::IntList => &["Vec<i32>"],
            WireType::Long => &["i64"],
            WireType::LongArray => &["Vec<i64>"],
            WireType::String => &["String"],
            WireType::StringArray => &["Box<[String]>"],
            WireType::StringList => &["Vec<String>"],
            WireType::Map => &["DataMap"],
            WireType::MapList => &["Vec<DataMap>"],
            WireType::Asset => &["AssetRef"],
        }
    }

    /// Look up the wire type for a declared Rust type name
    pub fn for_rust_type(ty: &str) -> Option<WireType> {
        let normalized = normalize_type_name(ty);
        Self::ALL
            .into_iter()
            .find(|wire| wire.rust_types().contains(&normalized.as_str()))
    }

    /// Name of the typed accessor, used when rendering codec listings
    pub fn accessor(&self) -> &'static str {
        match self {
            WireType::Bool => "bool",
            WireType::Byte => "byte",
            WireType::ByteArray => "byte_array",
            WireType::Double => "double",
            WireType::Float => "float",
            WireType::FloatArray => "float_array",
            WireType::Int => "int",
            WireType::IntList => "int_list",
            WireType::Long => "long",
            WireType::LongArray => "long_array",
            WireType::String => "string",
            WireType::StringArray => "string_array",
            WireType::StringList => "string_list",
            WireType::Map => "map",
            WireType::MapList => "map_list",
            WireType::Asset => "asset",
        }
    }
}

impl std::fmt::Display for WireType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.accessor())
    }
}

/// Strip whitespace and a leading `::` path from a type name
pub fn normalize_type_name(ty: &str) -> String {
    let compact: String = ty.chars().filter(|c| !c.is_whitespace()).collect();
    compact.trim_start_matches("::").to_string()
}

/// A single data map value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v", rename_all = "snake_case")]
pub enum WireValue {
    Bool(bool),
    Byte(i8),
    ByteArray(Vec<u8>),
    Double(#[serde(with = "float_bits::double")] f64),
    Float(#[serde(with = "float_bits::float")] f32),
    FloatArray(#[serde(with = "float_bits::float_array")] Vec<f32>),
    Int(i32),
    IntList(Vec<i32>),
    Long(i64),
    LongArray(Vec<i64>),
    String(String),
    StringArray(Box<[String]>),
    StringList(Vec<String>),
    Map(DataMap),
    MapList(Vec<DataMap>),
    Asset(AssetRef),
}

impl WireValue {
    pub fn wire_type(&self) -> WireType {
        match self {
            WireValue::Bool(_) => WireType::Bool,
            WireValue::Byte(_) => WireType::Byte,
            WireValue::ByteArray(_) => WireType::ByteArray,
            WireValue::Double(_) => WireType::Double,
            WireValue::Float(_) => WireType::Float,
            WireValue::FloatArray(_) => WireType::FloatArray,
            WireValue::Int(_) => WireType::Int,
            WireValue::IntList(_) => WireType::IntList,
            WireValue::Long(_) => WireType::Long,
            WireValue::LongArray(_) => WireType::LongArray,
            WireValue::String(_) => WireType::String,
            WireValue::StringArray(_) => WireType::StringArray,
            WireValue::StringList(_) => WireType::StringList,
            WireValue::Map(_) => WireType::Map,
            WireValue::MapList(_) => WireType::MapList,
            WireValue::Asset(_) => WireType::Asset,
        }
    }
}

/// Floats are carried as IEEE-754 bit patterns; JSON numbers cannot hold
/// NaN or the infinities.
mod float_bits {
    pub mod double {
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
            value.to_bits().serialize(serializer)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
            u64::deserialize(deserializer).map(f64::from_bits)
        }
    }

    pub mod float {
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        pub fn serialize<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
            value.to_bits().serialize(serializer)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
            u32::deserialize(deserializer).map(f32::from_bits)
        }
    }

    pub mod float_array {
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(values: &[f32], serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(values.iter().map(|v| v.to_bits()))
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<f32>, D::Error> {
            let bits = Vec::<u32>::deserialize(deserializer)?;
            Ok(bits.into_iter().map(f32::from_bits).collect())
        }
    }
}
