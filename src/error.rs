use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid canvas dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("unable to open image {}: {source}", path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("error saving image {}: {source}", path.display())]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("export of {width}x{height} pixels is too large")]
    ExportTooLarge { width: u64, height: u64 },

    #[error("no printer available")]
    PrinterUnavailable,

    #[error("printer error: {0}")]
    Printer(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings: {0}")]
    Config(#[from] serde_json::Error),
}
