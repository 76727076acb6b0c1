//! Error taxonomy shared by the courier crates

use thiserror::Error;

/// Result type alias for courier operations
pub type CourierResult<T> = Result<T, CourierError>;

/// Error type for binding compilation, codecs and dispatch
///
/// Only [`CourierError::MissingDispatcher`] is fatal to a caller of the
/// runtime. Everything else is either reported per offending declaration at
/// build time or contained to the single event that triggered it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CourierError {
    /// A binding declaration is malformed; the binding is skipped
    #[error("invalid binding {owner}.{member}: {message}")]
    InvalidBinding {
        owner: String,
        member: String,
        message: String,
    },

    /// A packageable field has a type the codec cannot map; the field is skipped
    #[error("field type not supported ({ty}) for {owner}.{field}")]
    UnsupportedFieldType {
        owner: String,
        field: String,
        ty: String,
    },

    /// No structured codec is registered for a type
    #[error("no codec registered for {0}")]
    NoCodecFound(String),

    /// The event source could not be reached
    #[error("event source unavailable: {0}")]
    SourceUnavailable(String),

    /// A payload could not be decoded into the requested type
    #[error("decode error: {0}")]
    Decode(String),

    /// Neither the type nor any ancestor declares bindings
    #[error("no dispatcher found for {0}, missing bindings?")]
    MissingDispatcher(String),

    /// Recipient handlers do not match the compiled binding model
    #[error("registry error: {0}")]
    Registry(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Binary asset could not be stored or resolved
    #[error("asset error: {0}")]
    Asset(String),

    /// Async runtime error
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl CourierError {
    /// Returns a stable numeric code for the error kind
    pub fn error_code(&self) -> u32 {
        match self {
            CourierError::InvalidBinding { .. } => 1,
            CourierError::UnsupportedFieldType { .. } => 2,
            CourierError::NoCodecFound(_) => 3,
            CourierError::SourceUnavailable(_) => 4,
            CourierError::Decode(_) => 5,
            CourierError::MissingDispatcher(_) => 6,
            CourierError::Registry(_) => 7,
            CourierError::Config(_) => 8,
            CourierError::Serialization(_) => 9,
            CourierError::Asset(_) => 10,
            CourierError::Runtime(_) => 11,
        }
    }

    /// Whether the error must be surfaced to the caller rather than logged
    pub fn is_fatal(&self) -> bool {
        matches!(self, CourierError::MissingDispatcher(_))
    }
}

impl From<serde_json::Error> for CourierError {
    fn from(err: serde_json::Error) -> Self {
        CourierError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for CourierError {
    fn from(err: toml::de::Error) -> Self {
        CourierError::Config(err.to_string())
    }
}
