use enough::StopReason;

/// Header format violations found while decoding or validating a BMP.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum FormatError {
    #[error("magic header mismatch (expected \"BM\")")]
    BadMagic,

    #[error("unsupported color depth ({0})")]
    UnsupportedColorDepth(u16),

    #[error("unsupported compression type ({0})")]
    UnsupportedCompression(u32),

    #[error("bitmap size field ({declared}) does not match 3 * width * height ({expected})")]
    SizeMismatch { declared: u32, expected: u64 },

    #[error("pixel data offset {0} points inside the 54-byte header")]
    PixelOffsetInsideHeader(u32),
}

/// Errors from BMP grayscale conversion.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BitmapError {
    #[error("invalid file format: {0}")]
    Format(#[from] FormatError),

    #[error("truncated pixel data: expected {expected} samples, got {actual}")]
    TruncatedData { expected: u64, actual: u64 },

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("operation cancelled")]
    Cancelled(StopReason),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BitmapError {
    /// The header format error, if this is one.
    pub fn format_error(&self) -> Option<&FormatError> {
        match self {
            BitmapError::Format(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StopReason> for BitmapError {
    fn from(r: StopReason) -> Self {
        BitmapError::Cancelled(r)
    }
}
