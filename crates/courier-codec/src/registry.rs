//! Codec lookup by runtime type and by declared type name

use crate::{
    AssetStore, Codec, CodecContext, CodecError, DataMap, JsonCodec, Packable, normalize_type_name,
};
use serde::{Serialize, de::DeserializeOwned};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// A decoded payload shared between every recipient of one event
pub type Payload = Arc<dyn Any + Send + Sync>;

type PayloadDecoder =
    Arc<dyn Fn(&[u8], &CodecContext<'_>) -> Result<Payload, CodecError> + Send + Sync>;

#[derive(Clone, Copy)]
struct StructuredCodec {
    name: &'static str,
    encode: fn(&dyn Any, &CodecContext<'_>) -> Result<DataMap, CodecError>,
    decode: fn(&DataMap, &CodecContext<'_>) -> Result<Box<dyn Any + Send>, CodecError>,
}

fn encode_erased<P: Packable>(
    value: &dyn Any,
    ctx: &CodecContext<'_>,
) -> Result<DataMap, CodecError> {
    value
        .downcast_ref::<P>()
        .ok_or_else(|| CodecError::Serialization(format!("value is not a {}", P::TYPE_NAME)))?
        .pack(ctx)
}

fn decode_erased<P: Packable>(
    map: &DataMap,
    ctx: &CodecContext<'_>,
) -> Result<Box<dyn Any + Send>, CodecError> {
    Ok(Box::new(P::unpack(map, ctx)?))
}

fn decode_packable<P: Packable>(data: &[u8], ctx: &CodecContext<'_>) -> Result<Payload, CodecError> {
    let map = DataMap::from_bytes(data)?;
    Ok(Arc::new(P::unpack(&map, ctx)?))
}

fn decode_opaque<T>(data: &[u8], _ctx: &CodecContext<'_>) -> Result<Payload, CodecError>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    let value: T = JsonCodec::new().decode(data)?;
    Ok(Arc::new(value))
}

/// Immutable table of the codecs known to a courier instance
///
/// Structured codecs are keyed by [`TypeId`]; payload decoders by the type
/// name written in binding declarations. The primitive wire types are
/// registered as opaque payloads under their Rust names.
#[derive(Clone)]
pub struct CodecRegistry {
    structured: HashMap<TypeId, StructuredCodec>,
    decoders: HashMap<String, PayloadDecoder>,
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecRegistry {
    /// Create a registry with the primitive payload decoders installed
    pub fn new() -> Self {
        Self::empty()
            .with_opaque::<bool>("bool")
            .with_opaque::<i8>("i8")
            .with_opaque::<i32>("i32")
            .with_opaque::<i64>("i64")
            .with_opaque::<f32>("f32")
            .with_opaque::<f64>("f64")
            .with_opaque::<String>("String")
            .with_opaque::<Vec<u8>>("Vec<u8>")
            .with_opaque::<Vec<f32>>("Vec<f32>")
            .with_opaque::<Vec<i32>>("Vec<i32>")
            .with_opaque::<Vec<i64>>("Vec<i64>")
            .with_opaque::<Vec<String>>("Vec<String>")
            .with_opaque::<Box<[String]>>("Box<[String]>")
    }

    /// Create a registry without any decoders
    pub fn empty() -> Self {
        Self {
            structured: HashMap::new(),
            decoders: HashMap::new(),
        }
    }

    /// Register the structured codec of a packable type
    pub fn with_packable<P: Packable>(mut self) -> Self {
        self.structured.insert(
            TypeId::of::<P>(),
            StructuredCodec {
                name: P::TYPE_NAME,
                encode: encode_erased::<P>,
                decode: decode_erased::<P>,
            },
        );
        self.with_decoder(P::TYPE_NAME, decode_packable::<P>)
    }

    /// Register a payload type decoded through the opaque JSON path
    pub fn with_opaque<T>(self, name: impl Into<String>) -> Self
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        self.with_decoder(name, decode_opaque::<T>)
    }

    /// Register a custom payload decoder
    pub fn with_decoder<F>(mut self, name: impl Into<String>, decoder: F) -> Self
    where
        F: Fn(&[u8], &CodecContext<'_>) -> Result<Payload, CodecError> + Send + Sync + 'static,
    {
        self.decoders
            .insert(normalize_type_name(&name.into()), Arc::new(decoder));
        self
    }

    /// Whether a structured codec is registered for `T`
    pub fn has_structured<T: Any>(&self) -> bool {
        self.structured.contains_key(&TypeId::of::<T>())
    }

    /// Whether a payload decoder is registered under a declared type name
    pub fn has_decoder(&self, type_name: &str) -> bool {
        self.decoders
            .contains_key(&normalize_type_name(type_name))
    }

    /// Decode a payload for a declared type name
    pub fn decode_payload(
        &self,
        type_name: &str,
        data: &[u8],
        ctx: &CodecContext<'_>,
    ) -> Result<Payload, CodecError> {
        let name = normalize_type_name(type_name);
        let decoder = self
            .decoders
            .get(&name)
            .ok_or_else(|| CodecError::NotRegistered(name.clone()))?;
        decoder(data, ctx)
    }

    /// Declared names with a payload decoder, sorted
    pub fn decoder_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.decoders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn structured_for<T: Any>(&self) -> Option<StructuredCodec> {
        self.structured.get(&TypeId::of::<T>()).copied()
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let structured: Vec<&str> = self.structured.values().map(|c| c.name).collect();
        f.debug_struct("CodecRegistry")
            .field("structured", &structured)
            .field("decoders", &self.decoder_names())
            .finish()
    }
}

/// Encodes values for sending and decodes received bytes
///
/// The structured codec registered for a value's runtime type is preferred;
/// anything else goes through opaque JSON serialization.
#[derive(Clone)]
pub struct Packager {
    registry: Arc<CodecRegistry>,
    assets: Option<Arc<dyn AssetStore>>,
    fallback: JsonCodec,
}

impl Packager {
    pub fn new(registry: Arc<CodecRegistry>) -> Self {
        Self {
            registry,
            assets: None,
            fallback: JsonCodec::new(),
        }
    }

    pub fn with_assets(mut self, assets: Arc<dyn AssetStore>) -> Self {
        self.assets = Some(assets);
        self
    }

    pub fn registry(&self) -> &Arc<CodecRegistry> {
        &self.registry
    }

    pub fn context(&self) -> CodecContext<'_> {
        match &self.assets {
            Some(assets) => CodecContext::with_assets(assets.as_ref()),
            None => CodecContext::new(),
        }
    }

    /// Encode a value, structured when a codec is registered for its type
    pub fn pack<T: Serialize + Any>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        match self.registry.structured_for::<T>() {
            Some(codec) => (codec.encode)(value, &self.context())?.to_bytes(),
            None => {
                trace!(
                    type_name = std::any::type_name::<T>(),
                    "no structured codec, using opaque encoding"
                );
                self.fallback.encode(value)
            }
        }
    }

    /// Encode a packable value without consulting the registry
    pub fn pack_packable<P: Packable>(&self, value: &P) -> Result<Vec<u8>, CodecError> {
        value.pack(&self.context())?.to_bytes()
    }

    /// Decode bytes, trying the structured codec before opaque decoding
    pub fn unpack<T: DeserializeOwned + Any>(&self, data: &[u8]) -> Result<T, CodecError> {
        if let Some(codec) = self.registry.structured_for::<T>()
            && DataMap::is_framed(data)
        {
            let map = DataMap::from_bytes(data)?;
            let value = (codec.decode)(&map, &self.context())?;
            return value
                .downcast::<T>()
                .map(|boxed| *boxed)
                .map_err(|_| CodecError::Deserialization(format!("codec {} mismatch", codec.name)));
        }
        self.fallback.decode(data)
    }

    /// Decode framed bytes into a packable value
    pub fn unpack_packable<P: Packable>(&self, data: &[u8]) -> Result<P, CodecError> {
        let map = DataMap::from_bytes(data)?;
        P::unpack(&map, &self.context())
    }

    /// Decode a payload for a declared type name
    pub fn decode_payload(&self, type_name: &str, data: &[u8]) -> Result<Payload, CodecError> {
        self.registry.decode_payload(type_name, data, &self.context())
    }
}

impl std::fmt::Debug for Packager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packager")
            .field("registry", &self.registry)
            .field("has_assets", &self.assets.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "registry/registry_tests.rs"]
mod registry_tests;
