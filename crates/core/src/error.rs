/// Result alias that carries the custom [`NotepilotError`] type.
pub type Result<T> = std::result::Result<T, NotepilotError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum NotepilotError {
    /// The binary map could not be decoded.
    #[error("map format error: {0}")]
    Format(#[from] FormatError),
    /// Input that is structurally fine but cannot be played or processed.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// An easing name that is not part of the catalog.
    #[error("unknown easing `{0}`")]
    UnknownEasing(String),
    /// Free-form message, mostly used by the note-source adapters.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Config or map JSON that failed to (de)serialize.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// Problems reading a zipped map archive.
    #[error("{0}")]
    Archive(#[from] zip::result::ZipError),
}

impl NotepilotError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for NotepilotError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for NotepilotError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

/// Structural violations found while decoding a binary map.
///
/// Every variant rejects the whole input; the decoder never hands back a
/// partial note list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("bad magic")]
    BadMagic,
    #[error("unsupported version {0}")]
    UnsupportedVersion(u16),
    #[error("reserved nonzero ({0:#06x})")]
    ReservedNonzero(u16),
    #[error("bad cover discriminator {0}")]
    BadCoverDiscriminator(u8),
    #[error("truncated note record")]
    TruncatedNoteRecord,
    /// The header ended before `section` was fully read.
    #[error("truncated header while reading {section}")]
    TruncatedHeader { section: &'static str },
}
