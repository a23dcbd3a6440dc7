//! Codec trait and implementations for cached values.
//!
//! The local cache stores strings. A "codec" (coder/decoder) converts
//! between Rust values and those strings. The cache adapter doesn't care
//! HOW values are serialized — it only needs something implementing
//! [`Codec`].
//!
//! We ship [`JsonCodec`], which keeps the cached blob readable when you
//! open the cache file by hand.

use serde::{Serialize, de::DeserializeOwned};

use crate::CodecError;

/// Encodes values to text and decodes them back.
///
/// ## Trait bounds
///
/// - `Send + Sync` → the codec is shared by the reconciler's tasks.
/// - `'static` → it owns everything it needs, so it can live inside
///   long-lived handles.
///
/// `DeserializeOwned` (vs plain `Deserialize`) means the decoded value
/// doesn't borrow from the input string.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into text.
    ///
    /// # Errors
    /// Returns `CodecError::Encode` if the value can't be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, CodecError>;

    /// Deserializes text back into a value.
    ///
    /// # Errors
    /// Returns `CodecError::Decode` if the text is malformed or doesn't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &str) -> Result<T, CodecError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use rapport_model::{AgencyFlag, Codec, JsonCodec, Profile};
///
/// let codec = JsonCodec;
/// let profile = Profile {
///     full_name: "Ada".into(),
///     email: "ada@x.com".into(),
///     phone_number: "555-0100".into(),
///     company_name: None,
///     is_agency: AgencyFlag::No,
/// };
///
/// let text = codec.encode(&profile).unwrap();
/// let decoded: Profile = codec.decode(&text).unwrap();
/// assert_eq!(profile, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, CodecError> {
        serde_json::to_string(value).map_err(CodecError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &str) -> Result<T, CodecError> {
        serde_json::from_str(data).map_err(CodecError::Decode)
    }
}
