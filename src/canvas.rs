use image::{Rgba, RgbaImage};

use crate::error::{Error, Result};

pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Fixed-size RGBA pixel buffer. Coordinates outside the buffer are ignored by every
/// accessor, so callers never need to pre-check pointer positions near the edges.
#[derive(Clone, Debug, PartialEq)]
pub struct Canvas {
    pixels: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        Ok(Self {
            pixels: RgbaImage::from_pixel(width, height, TRANSPARENT),
        })
    }

    /// Wraps an already decoded image. Fails for empty images.
    pub fn from_image(pixels: RgbaImage) -> Result<Self> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        Ok(Self { pixels })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.height()
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Rgba<u8>> {
        if self.contains(x, y) {
            Some(*self.pixels.get_pixel(x as u32, y as u32))
        } else {
            None
        }
    }

    /// Returns false when the coordinate is out of bounds and nothing was written.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, color: Rgba<u8>) -> bool {
        if self.contains(x, y) {
            self.pixels.put_pixel(x as u32, y as u32, color);
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = TRANSPARENT;
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }
}
