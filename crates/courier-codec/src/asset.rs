//! Binary assets carried by reference

use crate::CodecError;
use dashmap::DashMap;
use flate2::{Compression, read::DeflateDecoder, write::DeflateEncoder};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::{Cursor, Read, Write};
use std::sync::Arc;

/// Reference to binary content placed in a data map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetRef {
    /// Content embedded directly in the map
    Inline(Vec<u8>),
    /// Content held by an [`AssetStore`] under this key
    Stored(String),
}

/// External storage for binary assets
pub trait AssetStore: Send + Sync {
    /// Store bytes and return a reference that resolves back to them
    fn store(&self, bytes: &[u8]) -> Result<AssetRef, CodecError>;

    /// Open the content behind a reference
    fn resolve(&self, asset: &AssetRef) -> Result<Box<dyn Read + Send>, CodecError>;
}

/// In-process asset store keyed by the SHA-256 of the content
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    assets: DashMap<String, Arc<[u8]>>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    fn key_for(bytes: &[u8]) -> String {
        hex::encode(Sha256::digest(bytes))
    }
}

impl AssetStore for MemoryAssetStore {
    fn store(&self, bytes: &[u8]) -> Result<AssetRef, CodecError> {
        let key = Self::key_for(bytes);
        self.assets
            .entry(key.clone())
            .or_insert_with(|| Arc::from(bytes));
        Ok(AssetRef::Stored(key))
    }

    fn resolve(&self, asset: &AssetRef) -> Result<Box<dyn Read + Send>, CodecError> {
        match asset {
            AssetRef::Inline(bytes) => Ok(Box::new(Cursor::new(bytes.clone()))),
            AssetRef::Stored(key) => {
                let bytes = self
                    .assets
                    .get(key)
                    .map(|entry| Arc::clone(entry.value()))
                    .ok_or_else(|| CodecError::Asset(format!("unknown asset key {key}")))?;
                Ok(Box::new(Cursor::new(bytes)))
            }
        }
    }
}

/// Opaque binary content packed as a compressed asset
///
/// Packing deflates the bytes and hands them to the asset store; unpacking
/// resolves the reference and inflates it again. An empty blob is not packed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blob(Vec<u8>);

impl Blob {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compress and store, inlining the content when no store is available
    pub(crate) fn to_asset(&self, store: Option<&dyn AssetStore>) -> Result<AssetRef, CodecError> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&self.0)?;
        let compressed = encoder.finish()?;
        match store {
            Some(store) => store.store(&compressed),
            None => Ok(AssetRef::Inline(compressed)),
        }
    }

    /// Resolve and inflate
    ///
    /// Returns `Ok(None)` for a stored reference when no store is available.
    pub(crate) fn from_asset(
        asset: &AssetRef,
        store: Option<&dyn AssetStore>,
    ) -> Result<Option<Blob>, CodecError> {
        let compressed: Box<dyn Read + Send> = match (asset, store) {
            (_, Some(store)) => store.resolve(asset)?,
            (AssetRef::Inline(bytes), None) => Box::new(Cursor::new(bytes.clone())),
            (AssetRef::Stored(_), None) => return Ok(None),
        };
        let mut bytes = Vec::new();
        DeflateDecoder::new(compressed).read_to_end(&mut bytes)?;
        Ok(Some(Blob(bytes)))
    }
}

impl From<Vec<u8>> for Blob {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}
