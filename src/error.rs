use std::path::PathBuf;

/// Top-level error taxonomy for the engine. Per-item failures inside a run are
/// recorded as `failed`/`skipped` entries in the result instead of propagating
/// here — this enum is for conditions that abort a whole request.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("request canceled")]
    Canceled,

    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Errors from the JPEG/EXIF codec layer. Kept separate from `EngineError` so
/// per-item code can match on the specific failure (e.g. "exif too large")
/// before collapsing it into a plan-item reason string.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("not a JPEG file (missing SOI marker)")]
    NotJpeg,

    #[error("truncated JPEG stream")]
    Truncated,

    #[error("no EXIF APP1 segment present")]
    NoExif,

    #[error("exif too large")]
    ExifTooLarge,

    #[error("unsupported TIFF byte order")]
    BadTiffHeader,

    #[error("image decode failed: {0}")]
    Decode(String),

    #[error("image encode failed: {0}")]
    Encode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
