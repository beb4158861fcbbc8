//! Hand-off of the canvas to a receipt printer.
//!
//! The device transport (USB discovery, command stream) lives behind
//! [`PrinterTransport`]; this module only prepares the raster and reports failures.

use image::GrayImage;

use crate::config::Settings;
use crate::engine::PaintEngine;
use crate::error::{Error, Result};

pub trait PrinterTransport {
    fn name(&self) -> &str;

    /// Sends a grayscale raster at the printer's native width.
    fn print(&mut self, raster: &GrayImage) -> Result<()>;
}

/// Prepares the printer raster for the current canvas and sends it.
pub fn print_canvas<T: PrinterTransport + ?Sized>(
    engine: &PaintEngine,
    transport: Option<&mut T>,
    settings: &Settings,
) -> Result<()> {
    let transport = transport.ok_or(Error::PrinterUnavailable)?;
    let raster = engine.export_for_printer(settings.printer_width, settings.printer_contrast)?;
    log::info!(
        "printing {}x{} raster on {}",
        raster.width(),
        raster.height(),
        transport.name()
    );
    transport.print(&raster)
}
