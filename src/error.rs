use thiserror::Error;

use crate::bodies::BodyId;

/// Errors raised by the body store and its id allocator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No free ids remain. Callers check `is_ready()` before spawning.
    #[error("Id pool exhausted. Check is_ready() before submitting a spawn request")]
    PoolExhausted,

    /// The id is not currently live
    #[error("Body id {0} is not live")]
    InvalidId(BodyId),

    /// A body with this id is already in the store
    #[error("Body id {0} is already present in the store")]
    DuplicateId(BodyId),
}

/// Errors raised while decoding wire messages
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Frame length minus the header is not a whole number of body records
    #[error("Malformed frame of {len} bytes. Expected 2 + 27*n bytes")]
    MalformedFrame { len: usize },

    /// Spawn command is not exactly one body record
    #[error("Malformed spawn command of {len} bytes. Expected 27 bytes")]
    MalformedCommand { len: usize },
}

/// Configuration errors. These are reported once at startup and are fatal.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Setting '{name}' is not finite")]
    NonFinite { name: &'static str },

    #[error("Setting '{name}' is out of range: {value}")]
    OutOfRange { name: &'static str, value: f32 },

    #[error("Mass exponent {exponent} produces non-finite body mass")]
    DegenerateMass { exponent: f32 },

    #[error("Environment variable {name}={value} is not a number")]
    Env { name: &'static str, value: String },

    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Sticky transport or decode error. Stored by the connection manager and
/// surfaced through `try_get_connection_error`, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Connection error {code}: {message}")]
pub struct ConnectionError {
    pub code: u16,
    pub message: String,
}

impl ConnectionError {
    pub const CODE: u16 = 500;

    pub fn transport(detail: impl Into<String>) -> Self {
        Self {
            code: Self::CODE,
            message: format!("Transport error: {}", detail.into()),
        }
    }

    pub fn decode(err: &CodecError) -> Self {
        Self {
            code: Self::CODE,
            message: format!("Failed to parse frame message: {}", err),
        }
    }
}

/// Startup failures of the TCP server
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("Socket error: {0}")]
    Io(#[from] std::io::Error),
}
