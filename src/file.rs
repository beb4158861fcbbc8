use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::canvas::Canvas;
use crate::error::{Error, Result};
use crate::export::flatten_onto_white;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Png,
    Jpeg,
    Bmp,
    Gif,
    Unknown,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "png" => FileFormat::Png,
            "jpg" | "jpeg" => FileFormat::Jpeg,
            "bmp" => FileFormat::Bmp,
            "gif" => FileFormat::Gif,
            _ => FileFormat::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(FileFormat::from_extension)
            .unwrap_or(FileFormat::Unknown)
    }

    fn image_format(self) -> Option<ImageFormat> {
        match self {
            FileFormat::Png => Some(ImageFormat::Png),
            FileFormat::Jpeg => Some(ImageFormat::Jpeg),
            FileFormat::Bmp => Some(ImageFormat::Bmp),
            FileFormat::Gif => Some(ImageFormat::Gif),
            FileFormat::Unknown => None,
        }
    }

    /// Whether the encoded file can carry an alpha channel.
    pub fn keeps_alpha(self) -> bool {
        !matches!(self, FileFormat::Jpeg)
    }
}

/// File dialog filters for the formats we read and write.
pub const IMAGE_FILTERS: &[(&str, &[&str])] = &[
    ("PNG Image", &["png"]),
    ("JPEG Image", &["jpg", "jpeg"]),
    ("BMP Image", &["bmp"]),
    ("GIF Image", &["gif"]),
];

/// Decodes an image file into a fresh canvas.
pub fn load_canvas(path: impl AsRef<Path>) -> Result<Canvas> {
    let path = path.as_ref();
    if FileFormat::from_path(path) == FileFormat::Unknown {
        return Err(Error::UnsupportedFormat(path.display().to_string()));
    }

    let image = image::open(path).map_err(|source| Error::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!(
        "loaded {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Canvas::from_image(image.to_rgba8())
}

/// Appends `.png` when the path has no extension.
pub fn with_default_extension(path: impl Into<PathBuf>) -> PathBuf {
    let mut path = path.into();
    if path.extension().is_none() {
        path.set_extension("png");
    }
    path
}

/// Encodes a raster to disk, picking the format from the file extension.
/// Formats without alpha get the image composited onto white first.
pub fn save_raster(path: impl AsRef<Path>, image: &RgbaImage) -> Result<PathBuf> {
    let path = with_default_extension(path.as_ref());
    let format = FileFormat::from_path(&path);
    let image_format = format
        .image_format()
        .ok_or_else(|| Error::UnsupportedFormat(path.display().to_string()))?;

    let encoded = if format.keeps_alpha() {
        DynamicImage::ImageRgba8(image.clone())
    } else {
        DynamicImage::ImageRgb8(flatten_onto_white(image))
    };
    encoded
        .save_with_format(&path, image_format)
        .map_err(|source| Error::ImageSave {
            path: path.clone(),
            source,
        })?;

    log::info!(
        "saved {} ({}x{}, {:?})",
        path.display(),
        image.width(),
        image.height(),
        format
    );
    Ok(path)
}
