//! Error types for the codec.

/// Errors that can occur while encoding or decoding a cached value.
///
/// `#[derive(thiserror::Error)]` generates the `std::error::Error` impl; the
/// `#[error("...")]` attributes are the messages that end up in logs.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Serialization failed (turning a Rust value into text).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed text, missing required fields,
    /// or fields of the wrong type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The value decoded but is not acceptable, e.g. a cached entry written
    /// by an incompatible schema version.
    #[error("incompatible value: {0}")]
    Incompatible(String),
}
