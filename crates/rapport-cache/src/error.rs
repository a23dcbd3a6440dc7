use rapport_model::{CodecError, Interrupted};

/// Errors that can occur in the cache layer.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Reading or writing the backing storage failed.
    #[error("cache i/o failed: {0}")]
    Io(#[source] std::io::Error),

    /// A cached value couldn't be encoded or decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The call hit its deadline or was cancelled.
    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}
