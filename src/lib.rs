//! Pixel-art canvas engine: a fixed-size RGBA buffer with brush, eraser and flood-fill
//! tools, snapshot undo, and export to image files or a receipt printer.

pub mod canvas;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod file;
pub mod history;
pub mod printer;
pub mod raster;
pub mod view;

pub use canvas::Canvas;
pub use config::Settings;
pub use engine::{PaintEngine, Tool};
pub use error::{Error, Result};
pub use view::Viewport;
