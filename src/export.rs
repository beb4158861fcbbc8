//! Output transforms: pixel-art upscaling, flattening for opaque formats and the
//! grayscale raster handed to a receipt printer.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, Rgb, RgbImage, RgbaImage};
use rayon::prelude::*;

use crate::error::{Error, Result};

pub const DEFAULT_EXPORT_SCALE: u32 = 20;
pub const PRINTER_WIDTH: u32 = 576;
pub const PRINTER_CONTRAST: f32 = 2.0;

/// Largest raster, in pixels, that an export may produce.
pub const MAX_EXPORT_PIXELS: u64 = 1 << 28;

const SHARPEN_KERNEL: [i32; 9] = [-2, -2, -2, -2, 32, -2, -2, -2, -2];
const SHARPEN_SCALE: i32 = 16;

fn export_size(width: u64, height: u64) -> Result<(u32, u32)> {
    let fits = width.checked_mul(height).is_some_and(|pixels| pixels <= MAX_EXPORT_PIXELS);
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) if fits => Ok((w, h)),
        _ => Err(Error::ExportTooLarge { width, height }),
    }
}

/// Nearest-neighbour upscale: every source pixel becomes a `scale` x `scale` block.
/// A scale of 0 is treated as 1. Outputs above [`MAX_EXPORT_PIXELS`] are refused.
pub fn upscale_nearest(image: &RgbaImage, scale: u32) -> Result<RgbaImage> {
    let scale = scale.max(1);
    let (width, height) = image.dimensions();
    let (out_width, out_height) =
        export_size(width as u64 * scale as u64, height as u64 * scale as u64)?;
    if scale == 1 {
        return Ok(image.clone());
    }
    let mut out = RgbaImage::new(out_width, out_height);

    let src = image.as_raw();
    let row_len = out_width as usize * 4;
    let (src_width, scale) = (width as usize, scale as usize);

    out.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(out_y, row)| {
            let src_row = (out_y / scale) * src_width;
            for (out_x, pixel) in row.chunks_exact_mut(4).enumerate() {
                let idx = (src_row + out_x / scale) * 4;
                pixel.copy_from_slice(&src[idx..idx + 4]);
            }
        });
    Ok(out)
}

/// Composites the image over opaque white, dropping the alpha channel.
pub fn flatten_onto_white(image: &RgbaImage) -> RgbImage {
    let (width, height) = image.dimensions();
    let mut out = RgbImage::new(width, height);
    for (src, dst) in image.pixels().zip(out.pixels_mut()) {
        let alpha = src[3] as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        *dst = Rgb([blend(src[0]), blend(src[1]), blend(src[2])]);
    }
    out
}

/// Prepares the canvas for a thermal printer: flattened onto white, scaled to
/// `target_width` keeping the aspect ratio, converted to grayscale, sharpened and
/// contrast-enhanced by `contrast` around the mean luminance.
pub fn printer_raster(image: &RgbaImage, target_width: u32, contrast: f32) -> Result<GrayImage> {
    let (width, height) = image.dimensions();
    let target_width = target_width.max(1);
    let scaled_height = (height as f64 * target_width as f64 / width.max(1) as f64).round();
    let (target_width, target_height) =
        export_size(target_width as u64, (scaled_height as u64).max(1))?;

    let flattened = flatten_onto_white(image);
    let resized = imageops::resize(&flattened, target_width, target_height, FilterType::Nearest);
    let gray = imageops::grayscale(&resized);
    let sharpened = sharpen(&gray);
    Ok(enhance_contrast(&sharpened, contrast))
}

/// 3x3 sharpening convolution; border pixels are copied unchanged.
fn sharpen(image: &GrayImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut out = image.clone();
    if width < 3 || height < 3 {
        return out;
    }
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut acc = 0;
            for (k, weight) in SHARPEN_KERNEL.iter().enumerate() {
                let sx = x + k as u32 % 3 - 1;
                let sy = y + k as u32 / 3 - 1;
                acc += weight * image.get_pixel(sx, sy)[0] as i32;
            }
            let value = (acc + SHARPEN_SCALE / 2).div_euclid(SHARPEN_SCALE);
            out.put_pixel(x, y, Luma([value.clamp(0, 255) as u8]));
        }
    }
    out
}

fn enhance_contrast(image: &GrayImage, factor: f32) -> GrayImage {
    let count = image.as_raw().len().max(1) as f64;
    let sum: f64 = image.as_raw().iter().map(|&v| v as f64).sum();
    let mean = (sum / count).round() as f32;

    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let value = mean + factor * (pixel[0] as f32 - mean);
        pixel[0] = value.round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn two_by_two() -> RgbaImage {
        let mut image = RgbaImage::new(2, 2);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([0, 255, 0, 255]));
        image.put_pixel(0, 1, Rgba([0, 0, 255, 128]));
        image
    }

    #[test]
    fn upscale_replicates_blocks() {
        let source = two_by_two();
        let scaled = upscale_nearest(&source, 4).unwrap();
        assert_eq!(scaled.dimensions(), (8, 8));
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(scaled.get_pixel(x, y), source.get_pixel(x / 4, y / 4));
            }
        }
    }

    #[test]
    fn upscale_by_one_is_identity() {
        let source = two_by_two();
        assert_eq!(upscale_nearest(&source, 1).unwrap(), source);
        assert_eq!(upscale_nearest(&source, 0).unwrap(), source);
    }

    #[test]
    fn upscale_refuses_oversized_output() {
        let wide = RgbaImage::new(70_000, 1);
        assert!(matches!(
            upscale_nearest(&wide, u32::MAX),
            Err(Error::ExportTooLarge { height, .. }) if height == u32::MAX as u64
        ));

        let square = RgbaImage::new(2000, 2000);
        assert!(matches!(
            upscale_nearest(&square, DEFAULT_EXPORT_SCALE),
            Err(Error::ExportTooLarge { width: 40_000, height: 40_000 })
        ));
    }

    #[test]
    fn printer_raster_refuses_oversized_output() {
        let strip = RgbaImage::new(1, 1_000_000);
        assert!(matches!(
            printer_raster(&strip, PRINTER_WIDTH, PRINTER_CONTRAST),
            Err(Error::ExportTooLarge { width: 576, height: 576_000_000 })
        ));
    }

    #[test]
    fn flatten_turns_transparent_white() {
        let flat = flatten_onto_white(&two_by_two());
        assert_eq!(*flat.get_pixel(0, 0), Rgb([255, 0, 0]));
        assert_eq!(*flat.get_pixel(1, 1), Rgb([255, 255, 255]));
        // half-transparent blue over white
        assert_eq!(*flat.get_pixel(0, 1), Rgb([127, 127, 255]));
    }

    #[test]
    fn printer_raster_keeps_aspect_ratio() {
        let image = RgbaImage::new(64, 32);
        let raster = printer_raster(&image, PRINTER_WIDTH, PRINTER_CONTRAST).unwrap();
        assert_eq!(raster.dimensions(), (576, 288));

        let tall = RgbaImage::new(3, 10);
        assert_eq!(printer_raster(&tall, 576, 2.0).unwrap().height(), 1920);
    }

    #[test]
    fn printer_raster_blank_canvas_is_white() {
        let raster = printer_raster(&RgbaImage::new(8, 8), 64, 2.0).unwrap();
        assert!(raster.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn contrast_pushes_values_away_from_mean() {
        let mut image = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        for x in 0..2 {
            for y in 0..4 {
                image.put_pixel(x, y, Rgba([100, 100, 100, 255]));
            }
        }
        let raster = printer_raster(&image, 4, 2.0).unwrap();
        // mean lies between the two halves, so dark gets darker and white stays clipped
        assert!(raster.get_pixel(0, 0)[0] < 100);
        assert_eq!(raster.get_pixel(3, 0)[0], 255);
    }
}
