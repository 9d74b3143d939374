use std::path::PathBuf;

pub type SkinToneResult<T> = Result<T, SkinToneError>;

#[derive(thiserror::Error, Debug)]
pub enum SkinToneError {
    #[error("invalid directory {}: {reason}", path.display())]
    InvalidDirectory { path: PathBuf, reason: String },
    #[error("invalid image format: {0}")]
    InvalidImageFormat(String),
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("output name of {} collides with {}", path.display(), other.display())]
    OutputCollision { path: PathBuf, other: PathBuf },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SkinToneError {
    pub fn invalid_directory(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        SkinToneError::InvalidDirectory { path: path.into(), reason: reason.to_string() }
    }
}
