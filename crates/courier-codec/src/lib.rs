//! courier-codec - Structured map codec and serialization fallback
//!
//! This crate provides:
//! - [`WireType`] and [`WireValue`], the primitive wire vocabulary
//! - [`DataMap`], an ordered key → value map with a framed byte form
//! - [`Packable`] for types with a structured map encoding
//! - [`Codec`] trait and [`JsonCodec`] for opaque whole-object encoding
//! - [`AssetStore`] and [`Blob`] for binary assets carried by reference
//! - [`CodecRegistry`] and [`Packager`] for choosing between the two paths

mod asset;
mod codec;
mod data_map;
mod packable;
mod registry;
mod wire;

pub use asset::{AssetRef, AssetStore, Blob, MemoryAssetStore};
pub use codec::{Codec, CodecError, JsonCodec};
pub use data_map::DataMap;
pub use packable::{CodecContext, Packable, WireField, field, pack_list, unpack_list};
pub use registry::{CodecRegistry, Packager, Payload};
pub use wire::{WireType, WireValue, normalize_type_name};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AssetRef, AssetStore, Blob, Codec, CodecContext, CodecError, CodecRegistry, DataMap,
        JsonCodec, MemoryAssetStore, Packable, Packager, Payload, WireType, WireValue,
    };
}
