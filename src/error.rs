/// Result alias carrying [`OrbitError`].
pub type Result<T> = std::result::Result<T, OrbitError>;

/// Errors produced by the encode and decode pipelines.
///
/// Every variant is terminal for the call that produced it: nothing is
/// retried and no partial output is returned.
#[derive(Debug, thiserror::Error)]
pub enum OrbitError {
    /// The input bytes could not be decoded into audio samples.
    #[error("unsupported audio format: {0}")]
    UnsupportedAudioFormat(String),

    /// The framed payload does not fit in the target pixel buffer.
    #[error("payload of {required} bytes exceeds image capacity of {capacity} bytes")]
    CapacityExceeded { required: usize, capacity: usize },

    /// The embedded header does not carry the expected identifier.
    #[error("not an Audio Orbit image (magic {found:?})")]
    InvalidMagic { found: String },

    /// Length fields overrun the available data or the header is malformed.
    #[error("corrupted header: {0}")]
    CorruptedHeader(String),

    /// The pixel surface could not be allocated.
    #[error("canvas unavailable: {0}")]
    CanvasUnavailable(String),

    /// The image bytes could not be decoded into pixels.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// The rendered pixel buffer could not be written as PNG.
    #[error("failed to encode PNG: {0}")]
    PngEncode(String),
}

impl OrbitError {
    pub(crate) fn corrupted<T: Into<String>>(msg: T) -> Self {
        Self::CorruptedHeader(msg.into())
    }
}

impl From<symphonia::core::errors::Error> for OrbitError {
    fn from(value: symphonia::core::errors::Error) -> Self {
        Self::UnsupportedAudioFormat(value.to_string())
    }
}
