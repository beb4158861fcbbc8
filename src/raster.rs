//! Raster routines shared by the drawing tools.

use image::Rgba;

use crate::canvas::Canvas;

/// Bresenham line from `start` to `end`, both endpoints included.
/// Consecutive points are 8-connected.
///
/// The walk visits every point between the endpoints; run far-away endpoints through
/// [`clip_line`] first.
pub fn line_points(start: (i32, i32), end: (i32, i32)) -> Vec<(i32, i32)> {
    let (x0, y0) = (start.0 as i64, start.1 as i64);
    let (x1, y1) = (end.0 as i64, end.1 as i64);
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    let mut x = x0;
    let mut y = y0;
    let mut points = Vec::with_capacity((dx.max(dy) as usize + 1).min(MAX_LINE_RESERVE));

    loop {
        // x and y never leave the span between the two i32 endpoints
        points.push((x as i32, y as i32));
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
    points
}

const MAX_LINE_RESERVE: usize = 4096;

/// Clips a segment to a `width` x `height` canvas grown by `margin` pixels on each
/// side. Callers stamping a footprint at every point pass its reach as the margin.
///
/// Segments with both endpoints on the canvas come back unchanged. Otherwise the
/// clipped endpoints are rounded to the nearest pixel, so the walk stays bounded by
/// the canvas size. Returns `None` when the segment misses the grown canvas entirely.
pub fn clip_line(
    start: (i32, i32),
    end: (i32, i32),
    width: u32,
    height: u32,
    margin: u32,
) -> Option<((i32, i32), (i32, i32))> {
    let inside =
        |(x, y): (i32, i32)| x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height;
    if inside(start) && inside(end) {
        return Some((start, end));
    }

    let (x0, y0) = (start.0 as f64, start.1 as f64);
    let (dx, dy) = (end.0 as f64 - x0, end.1 as f64 - y0);
    let margin = margin as f64;
    let (min_x, max_x) = (-margin, width as f64 - 1.0 + margin);
    let (min_y, max_y) = (-margin, height as f64 - 1.0 + margin);

    // Liang-Barsky
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [(-dx, x0 - min_x), (dx, max_x - x0), (-dy, y0 - min_y), (dy, max_y - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }

    let at = |t: f64| ((x0 + t * dx).round() as i32, (y0 + t * dy).round() as i32);
    Some((at(t0), at(t1)))
}

/// Largest brush radius the engine accepts.
pub const MAX_BRUSH_RADIUS: u32 = 256;

/// Offsets covered by a round brush of the given radius. Radius 1 is a single pixel,
/// radius 2 adds the four axis neighbours, and so on. Radii above
/// [`MAX_BRUSH_RADIUS`] are capped.
pub fn brush_offsets(radius: u32) -> Vec<(i32, i32)> {
    let reach = radius.clamp(1, MAX_BRUSH_RADIUS) as i32 - 1;
    let reach_squared = reach * reach;
    let mut offsets = Vec::new();
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            if dx * dx + dy * dy <= reach_squared {
                offsets.push((dx, dy));
            }
        }
    }
    offsets
}

/// 4-connected flood fill from `(x, y)`. Returns the number of recoloured pixels.
///
/// Nothing happens when the seed is outside the canvas or already has `fill_color`.
pub fn flood_fill(canvas: &mut Canvas, x: i32, y: i32, fill_color: Rgba<u8>) -> usize {
    let Some(target_color) = canvas.get(x, y) else {
        return 0;
    };
    if target_color == fill_color {
        return 0;
    }

    let mut filled = 0;
    let mut stack = vec![(x, y)];
    while let Some((cx, cy)) = stack.pop() {
        if canvas.get(cx, cy) != Some(target_color) {
            continue;
        }
        canvas.set(cx, cy, fill_color);
        filled += 1;

        for (nx, ny) in [(cx - 1, cy), (cx + 1, cy), (cx, cy - 1), (cx, cy + 1)] {
            if canvas.contains(nx, ny) {
                stack.push((nx, ny));
            }
        }
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);

    fn is_8_connected(points: &[(i32, i32)]) -> bool {
        points
            .windows(2)
            .all(|w| (w[0].0 - w[1].0).abs() <= 1 && (w[0].1 - w[1].1).abs() <= 1)
    }

    #[test]
    fn horizontal_line_is_exact() {
        let points = line_points((0, 0), (5, 0));
        assert_eq!(points, (0..=5).map(|x| (x, 0)).collect::<Vec<_>>());
    }

    #[test]
    fn diagonal_line_steps_both_axes() {
        assert_eq!(line_points((0, 0), (3, 3)), vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn reversed_and_steep_lines_are_connected() {
        for (start, end) in [((7, 2), (-3, 5)), ((0, 0), (2, 11)), ((4, 9), (4, -2))] {
            let points = line_points(start, end);
            assert_eq!(points.first(), Some(&start));
            assert_eq!(points.last(), Some(&end));
            assert!(is_8_connected(&points));
        }
    }

    #[test]
    fn single_point_line() {
        assert_eq!(line_points((2, 3), (2, 3)), vec![(2, 3)]);
    }

    #[test]
    fn extreme_endpoints_do_not_overflow() {
        let points = line_points((i32::MAX - 2, 0), (i32::MAX, 0));
        assert_eq!(points, vec![(i32::MAX - 2, 0), (i32::MAX - 1, 0), (i32::MAX, 0)]);
        let points = line_points((i32::MIN, 5), (i32::MIN + 1, 4));
        assert_eq!(points, vec![(i32::MIN, 5), (i32::MIN + 1, 4)]);
    }

    #[test]
    fn clip_keeps_segments_on_the_canvas() {
        assert_eq!(clip_line((0, 0), (7, 3), 8, 8, 1), Some(((0, 0), (7, 3))));
    }

    #[test]
    fn clip_bounds_far_endpoints() {
        let (start, end) = clip_line((0, 0), (i32::MIN, 0), 8, 8, 1).unwrap();
        assert_eq!((start, end), ((0, 0), (-1, 0)));
        assert_eq!(line_points(start, end).len(), 2);

        let (start, end) = clip_line((i32::MIN, 3), (i32::MAX, 3), 8, 8, 1).unwrap();
        assert_eq!((start, end), ((-1, 3), (8, 3)));

        let (start, end) =
            clip_line((i32::MIN, i32::MIN), (i32::MAX, i32::MAX), 8, 8, 1).unwrap();
        let points = line_points(start, end);
        assert!(points.len() <= 12);
        assert!(points.contains(&(4, 4)));
        assert!(is_8_connected(&points));
    }

    #[test]
    fn clip_margin_grows_the_canvas() {
        assert_eq!(clip_line((-4, 2), (-4, 5), 8, 8, 1), None);
        let (start, end) = clip_line((-4, 2), (-4, 100), 8, 8, 4).unwrap();
        assert_eq!((start, end), ((-4, 2), (-4, 11)));
    }

    #[test]
    fn clip_rejects_segments_missing_the_canvas() {
        assert_eq!(clip_line((-5, -5), (-5, 20), 8, 8, 1), None);
        assert_eq!(clip_line((20, 0), (i32::MAX, i32::MAX), 8, 8, 1), None);
        assert_eq!(clip_line((-3, 0), (-3, 0), 8, 8, 1), None);
    }

    #[test]
    fn brush_radius_footprints() {
        assert_eq!(brush_offsets(0), vec![(0, 0)]);
        assert_eq!(brush_offsets(1), vec![(0, 0)]);
        let plus = brush_offsets(2);
        assert_eq!(plus.len(), 5);
        assert!(plus.contains(&(0, -1)) && plus.contains(&(1, 0)));
        assert!(!plus.contains(&(1, 1)));
        assert_eq!(brush_offsets(3).len(), 13);
        assert_eq!(brush_offsets(u32::MAX), brush_offsets(MAX_BRUSH_RADIUS));
    }

    #[test]
    fn fill_uniform_canvas() {
        let mut canvas = Canvas::new(6, 5).unwrap();
        assert_eq!(flood_fill(&mut canvas, 4, 2, RED), 30);
        assert!(canvas.image().pixels().all(|p| *p == RED));
    }

    #[test]
    fn fill_with_target_color_is_noop() {
        let mut canvas = Canvas::new(4, 4).unwrap();
        canvas.set(1, 1, RED);
        let before = canvas.clone();
        assert_eq!(flood_fill(&mut canvas, 1, 1, RED), 0);
        assert_eq!(canvas, before);
    }

    #[test]
    fn fill_stops_at_walls_and_ignores_diagonals() {
        let mut canvas = Canvas::new(5, 5).unwrap();
        // vertical wall at x = 2
        for y in 0..5 {
            canvas.set(2, y, RED);
        }
        flood_fill(&mut canvas, 0, 0, GREEN);
        for y in 0..5 {
            assert_eq!(canvas.get(1, y), Some(GREEN));
            assert_eq!(canvas.get(3, y).map(|p| p[3]), Some(0));
        }

        // a pixel touching the region only by a corner stays untouched
        let mut canvas = Canvas::new(2, 2).unwrap();
        canvas.set(1, 0, RED);
        canvas.set(0, 1, RED);
        flood_fill(&mut canvas, 0, 0, GREEN);
        assert_eq!(canvas.get(0, 0), Some(GREEN));
        assert_eq!(canvas.get(1, 1).map(|p| p[3]), Some(0));
    }

    #[test]
    fn fill_out_of_bounds_is_noop() {
        let mut canvas = Canvas::new(3, 3).unwrap();
        let before = canvas.clone();
        assert_eq!(flood_fill(&mut canvas, -1, 0, RED), 0);
        assert_eq!(flood_fill(&mut canvas, 0, 3, RED), 0);
        assert_eq!(canvas, before);
    }
}
