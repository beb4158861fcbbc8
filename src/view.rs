use egui::{Pos2, Rect, Vec2};

pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 80.0;

/// Pan and zoom of the canvas inside the drawing area.
///
/// `zoom` is screen points per canvas pixel, `pan` offsets the canvas centre from the
/// centre of the drawing area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub zoom: f32,
    pub pan: Vec2,
}

impl Viewport {
    pub fn new(zoom: f32) -> Self {
        Self {
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            pan: Vec2::ZERO,
        }
    }

    /// Screen rectangle covered by a canvas of `canvas_size` pixels.
    pub fn canvas_rect(&self, area_center: Pos2, canvas_size: Vec2) -> Rect {
        Rect::from_center_size(area_center + self.pan, canvas_size * self.zoom)
    }

    /// Continuous canvas coordinates of a screen position. The result may lie outside
    /// the canvas; callers floor it and the engine drops anything out of bounds.
    pub fn to_canvas(&self, screen: Pos2, canvas_rect: Rect) -> (f32, f32) {
        let local = (screen - canvas_rect.min) / self.zoom;
        (local.x, local.y)
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Multiplies the zoom, keeping the canvas point under `anchor` fixed on screen.
    pub fn zoom_by(&mut self, factor: f32, anchor: Pos2, area_center: Pos2) {
        let old_zoom = self.zoom;
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let offset = anchor - area_center - self.pan;
        self.pan += offset * (1.0 - self.zoom / old_zoom);
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(20.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: Pos2 = Pos2 { x: 400.0, y: 300.0 };

    #[test]
    fn maps_screen_to_canvas() {
        let view = Viewport::new(10.0);
        let rect = view.canvas_rect(CENTER, Vec2::new(8.0, 4.0));
        assert_eq!(rect.min, Pos2::new(360.0, 280.0));
        assert_eq!(view.to_canvas(rect.min, rect), (0.0, 0.0));
        assert_eq!(view.to_canvas(Pos2::new(375.0, 299.0), rect), (1.5, 1.9));
        let (x, y) = view.to_canvas(Pos2::new(350.0, 270.0), rect);
        assert!(x < 0.0 && y < 0.0);
    }

    #[test]
    fn pan_moves_canvas() {
        let mut view = Viewport::new(1.0);
        view.pan_by(Vec2::new(5.0, -3.0));
        let rect = view.canvas_rect(CENTER, Vec2::new(10.0, 10.0));
        assert_eq!(rect.center(), Pos2::new(405.0, 297.0));
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut view = Viewport::new(4.0);
        let size = Vec2::new(16.0, 16.0);
        let anchor = Pos2::new(420.0, 310.0);
        let before = view.to_canvas(anchor, view.canvas_rect(CENTER, size));
        view.zoom_by(2.0, anchor, CENTER);
        assert_eq!(view.zoom, 8.0);
        let after = view.to_canvas(anchor, view.canvas_rect(CENTER, size));
        assert!((before.0 - after.0).abs() < 1e-4);
        assert!((before.1 - after.1).abs() < 1e-4);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut view = Viewport::new(1000.0);
        assert_eq!(view.zoom, MAX_ZOOM);
        view.zoom_by(0.0001, CENTER, CENTER);
        assert_eq!(view.zoom, MIN_ZOOM);
    }
}
