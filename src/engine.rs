use std::collections::HashSet;

use image::{GrayImage, Rgba, RgbaImage};

use crate::canvas::{Canvas, TRANSPARENT};
use crate::error::Result;
use crate::export;
use crate::history::History;
use crate::raster;

/// Drawing tools. Exactly one is active at a time.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum Tool {
    #[default]
    Brush,
    Eraser,
    Fill,
    Pan,
}

impl Tool {
    pub const ALL: [Tool; 4] = [Tool::Brush, Tool::Eraser, Tool::Fill, Tool::Pan];

    pub fn label(self) -> &'static str {
        match self {
            Tool::Brush => "Brush",
            Tool::Eraser => "Eraser",
            Tool::Fill => "Fill",
            Tool::Pan => "Pan",
        }
    }
}

/// Floors a continuous canvas-local coordinate to a pixel index. Values beyond the
/// `i32` range saturate and NaN maps to `i32::MIN`, both safely off the canvas.
#[inline]
pub fn to_pixel(x: f32, y: f32) -> (i32, i32) {
    let floor = |v: f32| if v.is_nan() { i32::MIN } else { v.floor() as i32 };
    (floor(x), floor(y))
}

/// The raster canvas engine: one canvas plus the drawing state applied to it.
pub struct PaintEngine {
    canvas: Canvas,
    drawn: HashSet<(u32, u32)>,
    history: History,
    tool: Tool,
    color: Rgba<u8>,
    brush_radius: u32,
    last_point: Option<(i32, i32)>,
    // set by pointer_down until the gesture first changes the canvas
    stroke_pending: bool,
}

impl PaintEngine {
    pub fn new(width: u32, height: u32, undo_steps: usize) -> Result<Self> {
        Ok(Self::from_canvas(Canvas::new(width, height)?, undo_steps))
    }

    pub fn from_canvas(canvas: Canvas, undo_steps: usize) -> Self {
        log::debug!("new canvas {}x{}", canvas.width(), canvas.height());
        Self {
            canvas,
            drawn: HashSet::new(),
            history: History::new(undo_steps),
            tool: Tool::default(),
            color: Rgba([0, 0, 0, 255]),
            brush_radius: 1,
            last_point: None,
            stroke_pending: false,
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba<u8>> {
        self.canvas.get(x, y)
    }

    pub fn is_drawn(&self, x: u32, y: u32) -> bool {
        self.drawn.contains(&(x, y))
    }

    pub fn drawn_count(&self) -> usize {
        self.drawn.len()
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        if self.tool != tool {
            log::debug!("tool {:?} -> {:?}", self.tool, tool);
            self.tool = tool;
            self.last_point = None;
        }
    }

    pub fn color(&self) -> Rgba<u8> {
        self.color
    }

    pub fn set_color(&mut self, color: Rgba<u8>) {
        self.color = color;
    }

    pub fn brush_radius(&self) -> u32 {
        self.brush_radius
    }

    pub fn set_brush_radius(&mut self, radius: u32) {
        self.brush_radius = radius.clamp(1, raster::MAX_BRUSH_RADIUS);
    }

    pub fn undo_len(&self) -> usize {
        self.history.len()
    }

    /// Applies the active tool at one pixel. Returns true when any pixel was written.
    pub fn paint(&mut self, x: i32, y: i32) -> bool {
        match self.tool {
            Tool::Brush => self.stamp(x, y, self.color, true),
            Tool::Eraser => self.stamp(x, y, TRANSPARENT, false),
            Tool::Fill => self.flood_fill(x, y, self.color) > 0,
            Tool::Pan => false,
        }
    }

    fn stamp(&mut self, x: i32, y: i32, color: Rgba<u8>, mark: bool) -> bool {
        let mut touched = false;
        for (dx, dy) in raster::brush_offsets(self.brush_radius) {
            let (Some(px), Some(py)) = (x.checked_add(dx), y.checked_add(dy)) else {
                continue;
            };
            if !self.canvas.set(px, py, color) {
                continue;
            }
            touched = true;
            if mark {
                self.drawn.insert((px as u32, py as u32));
            } else {
                self.drawn.remove(&(px as u32, py as u32));
            }
        }
        touched
    }

    /// Single-pixel line in the active colour, ignoring the brush radius. Only the part
    /// of the line over the canvas is walked.
    pub fn draw_line(&mut self, start: (i32, i32), end: (i32, i32)) -> bool {
        let Some((start, end)) = raster::clip_line(start, end, self.width(), self.height(), 1)
        else {
            return false;
        };
        let mut touched = false;
        for (x, y) in raster::line_points(start, end) {
            touched |= self.canvas.set(x, y, self.color);
        }
        touched
    }

    /// Eraser footprint at every point of the line.
    fn erase_line(&mut self, start: (i32, i32), end: (i32, i32)) -> bool {
        let (width, height) = (self.width(), self.height());
        let Some((start, end)) = raster::clip_line(start, end, width, height, self.brush_radius)
        else {
            return false;
        };
        let mut touched = false;
        for (x, y) in raster::line_points(start, end) {
            touched |= self.paint(x, y);
        }
        touched
    }

    /// Returns the number of recoloured pixels.
    pub fn flood_fill(&mut self, x: i32, y: i32, fill_color: Rgba<u8>) -> usize {
        let filled = raster::flood_fill(&mut self.canvas, x, y, fill_color);
        log::trace!("flood fill at ({x}, {y}) recoloured {filled} pixels");
        filled
    }

    /// Snapshots the canvas once at the start of a gesture.
    pub fn begin_stroke(&mut self) {
        self.history.push(self.canvas.clone());
        self.last_point = None;
        self.stroke_pending = false;
    }

    /// Runs one step of a pointer gesture. The gesture's snapshot is taken here, right
    /// before its first step that changes the canvas, so presses that miss the canvas
    /// leave the history alone.
    fn gesture_step(&mut self, step: impl FnOnce(&mut Self) -> bool) -> bool {
        if !self.stroke_pending {
            return step(self);
        }
        let before = self.canvas.clone();
        if step(self) && self.canvas != before {
            self.history.push(before);
            self.stroke_pending = false;
            return true;
        }
        false
    }

    /// Restores the latest snapshot. Returns false when there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(snapshot) => {
                self.canvas = snapshot;
                self.last_point = None;
                log::debug!("undo, {} steps left", self.history.len());
                true
            }
            None => false,
        }
    }

    /// Wipes the canvas. Clearing is not recorded in the undo history.
    pub fn clear(&mut self) {
        self.canvas.clear();
        self.drawn.clear();
        self.last_point = None;
    }

    /// Starts a gesture with the active tool. Returns true when the canvas changed.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        if self.tool == Tool::Pan {
            return false;
        }
        self.last_point = None;
        self.stroke_pending = true;
        let point = to_pixel(x, y);
        let changed = self.gesture_step(|engine| engine.paint(point.0, point.1));
        if matches!(self.tool, Tool::Brush | Tool::Eraser) {
            self.last_point = Some(point);
        }
        changed
    }

    /// Continues a brush or eraser stroke, bridging gaps left by fast pointer motion.
    /// Returns true when the canvas changed.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        if !matches!(self.tool, Tool::Brush | Tool::Eraser) {
            return false;
        }
        let point = to_pixel(x, y);
        let Some(last) = self.last_point else {
            return false;
        };
        if last == point {
            return false;
        }

        let step_x = (point.0 as i64 - last.0 as i64).abs();
        let step_y = (point.1 as i64 - last.1 as i64).abs();
        let changed = self.gesture_step(|engine| {
            if step_x <= 1 && step_y <= 1 {
                engine.paint(point.0, point.1)
            } else if engine.tool == Tool::Brush {
                let line = engine.draw_line(last, point);
                engine.paint(point.0, point.1) || line
            } else {
                engine.erase_line(last, point)
            }
        });
        self.last_point = Some(point);
        changed
    }

    pub fn pointer_up(&mut self) {
        self.last_point = None;
        self.stroke_pending = false;
    }

    /// Nearest-neighbour upscale of the canvas, alpha preserved. Fails with
    /// [`Error::ExportTooLarge`](crate::error::Error::ExportTooLarge) past the export size limit.
    pub fn export_raster(&self, scale: u32) -> Result<RgbaImage> {
        export::upscale_nearest(self.canvas.image(), scale)
    }

    pub fn export_for_printer(&self, target_width: u32, contrast: f32) -> Result<GrayImage> {
        export::printer_raster(self.canvas.image(), target_width, contrast)
    }
}
