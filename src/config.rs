use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::export::{DEFAULT_EXPORT_SCALE, PRINTER_CONTRAST, PRINTER_WIDTH};
use crate::history::DEFAULT_UNDO_STEPS;

pub const SETTINGS_FILE: &str = "pixelique.json";

/// User-tunable settings, stored as JSON next to the executable's working directory.
/// Missing fields fall back to their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub default_width: u32,
    pub default_height: u32,
    pub undo_steps: usize,
    pub export_scale: u32,
    pub initial_zoom: f32,
    pub checkerboard_size: u32,
    pub printer_width: u32,
    pub printer_contrast: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_width: 64,
            default_height: 64,
            undo_steps: DEFAULT_UNDO_STEPS,
            export_scale: DEFAULT_EXPORT_SCALE,
            initial_zoom: 20.0,
            checkerboard_size: 10,
            printer_width: PRINTER_WIDTH,
            printer_contrast: PRINTER_CONTRAST,
        }
    }
}

impl Settings {
    /// Reads settings from `path`. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&content)?;
        log::info!("loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
