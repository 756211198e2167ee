/// ASCII line rasterizer for terminal rendering
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix4, Point3};
use objview_core::{project_to_screen, LineSink, ScreenPoint};
use std::io::Write;

/// Below this ratio of minor to major axis a segment counts as straight
const STRAIGHT_RATIO: f32 = 0.4;

/// Renderer that draws projected line loops into a character back buffer
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    char_buffer: Vec<char>,
    mvp: Matrix4<f32>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            char_buffer: vec![' '; width * height],
            mvp: Matrix4::identity(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.char_buffer = vec![' '; width * height];
    }

    pub fn clear(&mut self) {
        self.char_buffer.fill(' ');
    }

    /// Model-view-projection used for every following line loop
    pub fn set_transform(&mut self, mvp: Matrix4<f32>) {
        self.mvp = mvp;
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        if x < self.width && y < self.height {
            Some(self.char_buffer[y * self.width + x])
        } else {
            None
        }
    }

    /// Number of cells something was drawn into
    pub fn lit_cells(&self) -> usize {
        self.char_buffer.iter().filter(|&&c| c != ' ').count()
    }

    fn project(&self, point: &Point3<f32>) -> Option<ScreenPoint> {
        project_to_screen(&self.mvp, point, viewport_dim(self.width), viewport_dim(self.height))
    }

    fn draw_segment(&mut self, a: ScreenPoint, b: ScreenPoint) {
        if self.width == 0 || self.height == 0 {
            return;
        }

        let glyph = edge_glyph(b.x - a.x, b.y - a.y);
        let Some((t0, t1)) = clip_segment(
            (a.x, a.y),
            (b.x, b.y),
            self.width as f32,
            self.height as f32,
        ) else {
            return;
        };

        let lerp = |t: f32| (a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);
        let (x0, y0) = self.to_cell(lerp(t0));
        let (x1, y1) = self.to_cell(lerp(t1));

        // Bresenham
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            self.plot(x, y, glyph);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn to_cell(&self, (x, y): (f32, f32)) -> (i32, i32) {
        let cx = (x.floor() as i32).clamp(0, self.width as i32 - 1);
        let cy = (y.floor() as i32).clamp(0, self.height as i32 - 1);
        (cx, cy)
    }

    fn plot(&mut self, x: i32, y: i32, glyph: char) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x < self.width && y < self.height {
            self.char_buffer[y * self.width + x] = glyph;
        }
    }

    /// Present the back buffer
    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current = None;
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            for x in 0..self.width {
                let c = self.char_buffer[y * self.width + x];
                let color = glyph_color(c);
                if current != Some(color) {
                    writer.queue(SetForegroundColor(color))?;
                    current = Some(color);
                }
                writer.queue(Print(c))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl LineSink for AsciiRenderer {
    fn line_loop(&mut self, points: &[Point3<f32>]) {
        let projected: Vec<Option<ScreenPoint>> = points.iter().map(|p| self.project(p)).collect();
        let n = projected.len();

        for i in 0..n {
            // Edges touching an unprojectable corner are dropped
            if let (Some(a), Some(b)) = (projected[i], projected[(i + 1) % n]) {
                self.draw_segment(a, b);
            }
        }
    }
}

/// Pick a character that follows the direction of a screen-space segment
fn edge_glyph(dx: f32, dy: f32) -> char {
    let (ax, ay) = (dx.abs(), dy.abs());
    if ay <= ax * STRAIGHT_RATIO {
        '-'
    } else if ax <= ay * STRAIGHT_RATIO {
        '|'
    } else if (dx > 0.0) == (dy > 0.0) {
        // Screen y grows downwards
        '\\'
    } else {
        '/'
    }
}

/// Viewport size in pixels for a buffer dimension, saturating instead of truncating
pub fn viewport_dim(cells: usize) -> u32 {
    u32::try_from(cells).unwrap_or(u32::MAX)
}

fn glyph_color(c: char) -> Color {
    match c {
        ' ' => Color::DarkGrey,
        '-' | '|' => Color::White,
        '/' | '\\' => Color::Cyan,
        _ => Color::Grey,
    }
}

/// Liang-Barsky clip of segment `a`-`b` against `[0, max_x] x [0, max_y]`.
///
/// Returns the parameter range of the visible part.
fn clip_segment(a: (f32, f32), b: (f32, f32), max_x: f32, max_y: f32) -> Option<(f32, f32)> {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let mut t0 = 0.0_f32;
    let mut t1 = 1.0_f32;

    for (p, q) in [(-dx, a.0), (dx, max_x - a.0), (-dy, a.1), (dy, max_y - a.1)] {
        if p.abs() < f32::EPSILON {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    Some((t0, t1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(half: f32) -> Vec<Point3<f32>> {
        vec![
            Point3::new(-half, -half, 0.0),
            Point3::new(half, -half, 0.0),
            Point3::new(half, half, 0.0),
            Point3::new(-half, half, 0.0),
        ]
    }

    #[test]
    fn test_line_loop_outlines_square() {
        let mut renderer = AsciiRenderer::new(20, 10);
        renderer.line_loop(&square(0.5));

        // Top edge at row 2, left edge at column 5
        assert_eq!(renderer.cell(10, 2), Some('-'));
        assert_eq!(renderer.cell(10, 7), Some('-'));
        assert_eq!(renderer.cell(5, 5), Some('|'));
        assert_eq!(renderer.cell(15, 5), Some('|'));
        // Outline only, nothing filled
        assert_eq!(renderer.cell(10, 5), Some(' '));
    }

    #[test]
    fn test_clear_resets_buffer() {
        let mut renderer = AsciiRenderer::new(20, 10);
        renderer.line_loop(&square(0.5));
        assert!(renderer.lit_cells() > 0);

        renderer.clear();
        assert_eq!(renderer.lit_cells(), 0);
    }

    #[test]
    fn test_offscreen_segment_is_clipped() {
        let mut renderer = AsciiRenderer::new(20, 10);
        renderer.line_loop(&[Point3::new(-3.0, 0.0, 0.0), Point3::new(3.0, 0.0, 0.0)]);

        for x in 0..20 {
            assert_eq!(renderer.cell(x, 5), Some('-'), "column {}", x);
        }
        assert_eq!(renderer.lit_cells(), 20);
    }

    #[test]
    fn test_segment_entirely_outside_draws_nothing() {
        let mut renderer = AsciiRenderer::new(20, 10);
        renderer.line_loop(&[Point3::new(-3.0, 2.0, 0.0), Point3::new(3.0, 2.0, 0.0)]);
        assert_eq!(renderer.lit_cells(), 0);
    }

    #[test]
    fn test_edge_glyphs() {
        assert_eq!(edge_glyph(10.0, 1.0), '-');
        assert_eq!(edge_glyph(0.5, -8.0), '|');
        assert_eq!(edge_glyph(4.0, 4.0), '\\');
        assert_eq!(edge_glyph(4.0, -4.0), '/');
    }

    #[test]
    fn test_clip_segment_inside_untouched() {
        assert_eq!(clip_segment((1.0, 1.0), (5.0, 5.0), 10.0, 10.0), Some((0.0, 1.0)));
    }

    #[test]
    fn test_resize() {
        let mut renderer = AsciiRenderer::new(20, 10);
        renderer.resize(40, 12);
        assert_eq!((renderer.width(), renderer.height()), (40, 12));
        assert_eq!(renderer.cell(39, 11), Some(' '));
        assert_eq!(renderer.cell(40, 0), None);
    }

    #[test]
    fn test_draw_writes_every_cell() {
        let mut renderer = AsciiRenderer::new(4, 2);
        renderer.line_loop(&[Point3::new(-1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)]);
        let mut out = Vec::new();
        renderer.draw(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches('-').count(), 4);
    }

    #[test]
    fn test_empty_buffer_draws_nothing() {
        let mut renderer = AsciiRenderer::new(0, 10);
        renderer.line_loop(&square(0.5));
        assert_eq!(renderer.lit_cells(), 0);

        renderer.resize(20, 0);
        renderer.line_loop(&square(0.5));
        assert_eq!(renderer.lit_cells(), 0);
    }

    #[test]
    fn test_viewport_dim_saturates() {
        assert_eq!(viewport_dim(0), 0);
        assert_eq!(viewport_dim(80), 80);
        if usize::BITS > 32 {
            assert_eq!(viewport_dim(usize::MAX), u32::MAX);
        }
    }
}
