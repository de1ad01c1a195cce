use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LooperError {
    #[error("Could not prepare any images")]
    NoImages,

    #[error("Remote image download is not available")]
    RemoteUnavailable,

    #[error("Image not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    #[error("Not a recognized image file: {}", .0.display())]
    NotAnImage(PathBuf),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Request failed with status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type LooperResult<T> = std::result::Result<T, LooperError>;
