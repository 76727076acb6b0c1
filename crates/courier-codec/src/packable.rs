//! Structured encoding of types into data maps

use crate::{AssetRef, AssetStore, CodecError, DataMap, WireType, WireValue};

/// Collaborators available while packing or unpacking
#[derive(Clone, Copy, Default)]
pub struct CodecContext<'a> {
    assets: Option<&'a dyn AssetStore>,
}

impl<'a> CodecContext<'a> {
    /// A context without an asset store; assets are inlined
    pub fn new() -> Self {
        Self { assets: None }
    }

    pub fn with_assets(assets: &'a dyn AssetStore) -> Self {
        Self {
            assets: Some(assets),
        }
    }

    pub fn assets(&self) -> Option<&'a dyn AssetStore> {
        self.assets
    }
}

impl std::fmt::Debug for CodecContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecContext")
            .field("has_assets", &self.assets.is_some())
            .finish()
    }
}

/// A type with a structured data map encoding
///
/// Entries are keyed by field name. A derived type packs its parent's
/// fields first, into the same map, and unpacks them from it first as well.
/// Unpacking starts from [`Default`], so a key missing from the map (or
/// holding a value of another wire type) leaves that field at its default.
///
/// Usually implemented with `#[derive(Deliverable)]`.
pub trait Packable: Default + Send + Sync + 'static {
    /// Declared type name, used to look up payload decoders
    const TYPE_NAME: &'static str;

    /// Write this value's entries into `map`
    fn pack_into(&self, map: &mut DataMap, ctx: &CodecContext<'_>) -> Result<(), CodecError>;

    /// Overwrite fields from the entries present in `map`
    fn unpack_from(&mut self, map: &DataMap, ctx: &CodecContext<'_>) -> Result<(), CodecError>;

    fn pack(&self, ctx: &CodecContext<'_>) -> Result<DataMap, CodecError> {
        let mut map = DataMap::new();
        self.pack_into(&mut map, ctx)?;
        Ok(map)
    }

    fn unpack(map: &DataMap, ctx: &CodecContext<'_>) -> Result<Self, CodecError> {
        let mut value = Self::default();
        value.unpack_from(map, ctx)?;
        Ok(value)
    }
}

/// A Rust type stored directly as one wire value
pub trait WireField: Sized {
    const WIRE_TYPE: WireType;

    fn to_wire(&self) -> WireValue;

    fn from_wire(value: &WireValue) -> Option<Self>;
}

macro_rules! wire_field {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl WireField for $ty {
                const WIRE_TYPE: WireType = WireType::$variant;

                fn to_wire(&self) -> WireValue {
                    WireValue::$variant(self.to_owned())
                }

                fn from_wire(value: &WireValue) -> Option<Self> {
                    match value {
                        WireValue::$variant(inner) => Some(inner.to_owned()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

wire_field! {
    bool => Bool,
    i8 => Byte,
    Vec<u8> => ByteArray,
    f64 => Double,
    f32 => Float,
    Vec<f32> => FloatArray,
    i32 => Int,
    Vec<i32> => IntList,
    i64 => Long,
    Vec<i64> => LongArray,
    String => String,
    Box<[String]> => StringArray,
    Vec<String> => StringList,
    DataMap => Map,
    Vec<DataMap> => MapList,
    AssetRef => Asset,
}

/// Pack each element into its own map
pub fn pack_list<P: Packable>(
    values: &[P],
    ctx: &CodecContext<'_>,
) -> Result<Vec<DataMap>, CodecError> {
    values.iter().map(|value| value.pack(ctx)).collect()
}

/// Unpack each map into a fresh element
pub fn unpack_list<P: Packable>(
    maps: &[DataMap],
    ctx: &CodecContext<'_>,
) -> Result<Vec<P>, CodecError> {
    maps.iter().map(|map| P::unpack(map, ctx)).collect()
}

/// Per-field helpers called from `Packable` implementations
pub mod field {
    use super::*;
    use crate::Blob;
    use tracing::warn;

    pub fn put<F: WireField>(map: &mut DataMap, key: &str, value: &F) {
        map.put(key, value.to_wire());
    }

    /// Overwrite `slot` when `map` holds a value of the matching wire type
    pub fn take<F: WireField>(map: &DataMap, key: &str, slot: &mut F) {
        if let Some(value) = map.get_as(key) {
            *slot = value;
        }
    }

    pub fn put_nested<P: Packable>(
        map: &mut DataMap,
        key: &str,
        value: &P,
        ctx: &CodecContext<'_>,
    ) -> Result<(), CodecError> {
        map.put(key, WireValue::Map(value.pack(ctx)?));
        Ok(())
    }

    pub fn take_nested<P: Packable>(
        map: &DataMap,
        key: &str,
        slot: &mut P,
        ctx: &CodecContext<'_>,
    ) -> Result<(), CodecError> {
        if let Some(WireValue::Map(inner)) = map.get(key) {
            *slot = P::unpack(inner, ctx)?;
        }
        Ok(())
    }

    pub fn put_nested_list<P: Packable>(
        map: &mut DataMap,
        key: &str,
        values: &[P],
        ctx: &CodecContext<'_>,
    ) -> Result<(), CodecError> {
        map.put(key, WireValue::MapList(pack_list(values, ctx)?));
        Ok(())
    }

    pub fn take_nested_list<P: Packable>(
        map: &DataMap,
        key: &str,
        slot: &mut Vec<P>,
        ctx: &CodecContext<'_>,
    ) -> Result<(), CodecError> {
        if let Some(WireValue::MapList(inner)) = map.get(key) {
            *slot = unpack_list(inner, ctx)?;
        }
        Ok(())
    }

    /// Compress and store a blob; empty blobs are left out of the map
    pub fn put_asset(
        map: &mut DataMap,
        key: &str,
        blob: &Blob,
        ctx: &CodecContext<'_>,
    ) -> Result<(), CodecError> {
        if blob.is_empty() {
            return Ok(());
        }
        map.put(key, WireValue::Asset(blob.to_asset(ctx.assets())?));
        Ok(())
    }

    pub fn take_asset(
        map: &DataMap,
        key: &str,
        slot: &mut Blob,
        ctx: &CodecContext<'_>,
    ) -> Result<(), CodecError> {
        let Some(WireValue::Asset(asset)) = map.get(key) else {
            return Ok(());
        };
        match Blob::from_asset(asset, ctx.assets())? {
            Some(blob) => *slot = blob,
            None => warn!(key, "stored asset cannot be resolved without an asset store"),
        }
        Ok(())
    }
}
