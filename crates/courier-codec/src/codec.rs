//! Codec trait and the opaque JSON fallback

use courier_core::CourierError;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Failure while packing, unpacking or resolving a payload
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("could not encode: {0}")]
    Serialization(String),

    #[error("could not decode: {0}")]
    Deserialization(String),

    #[error("malformed payload: {0}")]
    InvalidFormat(String),

    #[error("asset error: {0}")]
    Asset(String),

    #[error("no codec registered for {0}")]
    NotRegistered(String),
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            CodecError::Deserialization(err.to_string())
        } else {
            CodecError::Serialization(err.to_string())
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::Asset(err.to_string())
    }
}

impl From<CodecError> for CourierError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Serialization(msg) => CourierError::Serialization(msg),
            CodecError::Deserialization(msg) | CodecError::InvalidFormat(msg) => {
                CourierError::Decode(msg)
            }
            CodecError::Asset(msg) => CourierError::Asset(msg),
            CodecError::NotRegistered(name) => CourierError::NoCodecFound(name),
        }
    }
}

/// Whole-object encoding, used when no structured codec is registered
pub trait Codec: Send + Sync {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError>;

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError>;

    /// MIME type of the encoded bytes
    fn content_type(&self) -> &'static str;
}

/// Opaque fallback: the value's serde form as compact JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    pub const fn new() -> Self {
        JsonCodec
    }
}

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(value)?)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}
