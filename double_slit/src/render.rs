//! Rasterising fields and profiles to images
//!
//! The heatmap uses one pixel per grid sample with the origin at the bottom,
//! so row 0 of the field (smallest y) is the lowest image row. Figures stack a
//! profile panel above the heatmap with a shared x extent and put a colorbar
//! to its right.

use image::{ImageOutputFormat, Rgb, RgbImage};
use num_complex::Complex64;
use std::io::Cursor;
use std::path::Path;

use crate::config::DisplayConfig;
use crate::error::Result;
use crate::field::DensityField;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const FRAME: Rgb<u8> = Rgb([0, 0, 0]);
const AXIS: Rgb<u8> = Rgb([180, 180, 180]);
pub const BLUE: Rgb<u8> = Rgb([31, 119, 180]);
pub const ORANGE: Rgb<u8> = Rgb([255, 127, 14]);
pub const GREEN: Rgb<u8> = Rgb([44, 160, 44]);
pub const RED: Rgb<u8> = Rgb([214, 39, 40]);

/// Cycle used when several series share one panel
pub const SERIES_COLORS: [Rgb<u8>; 4] = [BLUE, ORANGE, GREEN, RED];

const MARGIN: u32 = 20;
const GAP: u32 = 12;
const COLORBAR_WIDTH: u32 = 20;
const PROFILE_HEIGHT: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Colormap {
    #[default]
    Gray,
    /// Black through red and yellow to white
    Heat,
}

impl Colormap {
    /// Color for `t` in `[0, 1]`; values outside are clamped
    pub fn map(self, t: f64) -> Rgb<u8> {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Colormap::Gray => {
                let v = to_byte(t);
                Rgb([v, v, v])
            }
            Colormap::Heat => Rgb([
                to_byte(t * 3.0),
                to_byte(t * 3.0 - 1.0),
                to_byte(t * 3.0 - 2.0),
            ]),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "gray" | "grey" => Some(Colormap::Gray),
            "heat" | "hot" => Some(Colormap::Heat),
            _ => None,
        }
    }
}

fn to_byte(t: f64) -> u8 {
    (t.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Pixel rectangle inside an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    fn right(&self) -> u32 {
        self.x + self.w.saturating_sub(1)
    }

    fn bottom(&self) -> u32 {
        self.y + self.h.saturating_sub(1)
    }
}

/// One curve of a line panel
#[derive(Debug, Clone)]
pub struct Series {
    pub values: Vec<f64>,
    pub color: Rgb<u8>,
}

impl Series {
    pub fn new(values: Vec<f64>, color: Rgb<u8>) -> Self {
        Self { values, color }
    }
}

/// Heatmap of the field, `nx` by `ny` pixels, clipped to `[0, clim]`
pub fn render_heatmap(field: &DensityField, clim: f64, colormap: Colormap) -> RgbImage {
    let (ny, nx) = field.shape();
    let mut img = RgbImage::new(nx as u32, ny as u32);
    blit_heatmap(&mut img, Rect::new(0, 0, nx as u32, ny as u32), field, clim, colormap);
    img
}

fn blit_heatmap(img: &mut RgbImage, rect: Rect, field: &DensityField, clim: f64, colormap: Colormap) {
    let values = field.values();
    let ny = values.nrows() as u32;
    let scale = if clim > 0.0 { 1.0 / clim } else { 0.0 };
    for ((row, col), &v) in values.indexed_iter() {
        let px = rect.x + col as u32;
        // Origin at the bottom
        let py = rect.y + (ny - 1 - row as u32);
        img.put_pixel(px, py, colormap.map(v * scale));
    }
}

fn draw_colorbar(img: &mut RgbImage, rect: Rect, colormap: Colormap) {
    for dy in 0..rect.h {
        let t = 1.0 - dy as f64 / rect.h.saturating_sub(1).max(1) as f64;
        let color = colormap.map(t);
        for dx in 0..rect.w {
            img.put_pixel(rect.x + dx, rect.y + dy, color);
        }
    }
    draw_frame(img, rect);
}

fn draw_frame(img: &mut RgbImage, rect: Rect) {
    let (r, b) = (rect.right(), rect.bottom());
    for x in rect.x..=r {
        img.put_pixel(x, rect.y, FRAME);
        img.put_pixel(x, b, FRAME);
    }
    for y in rect.y..=b {
        img.put_pixel(rect.x, y, FRAME);
        img.put_pixel(r, y, FRAME);
    }
}

fn put_clipped(img: &mut RgbImage, rect: Rect, x: i64, y: i64, color: Rgb<u8>) {
    if x >= rect.x as i64 && x <= rect.right() as i64 && y >= rect.y as i64 && y <= rect.bottom() as i64 {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Bresenham segment clipped to `rect`
fn draw_line(img: &mut RgbImage, rect: Rect, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
    let (mut x0, mut y0) = from;
    let (x1, y1) = to;
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_clipped(img, rect, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn value_to_row(rect: Rect, v: f64, y_min: f64, y_max: f64) -> i64 {
    let span = y_max - y_min;
    let t = if span > 0.0 { (v - y_min) / span } else { 0.0 };
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    rect.bottom() as i64 - (t * rect.h.saturating_sub(1) as f64).round() as i64
}

/// Draw `series` into `rect`, samples spread evenly across its width
pub fn draw_series(img: &mut RgbImage, rect: Rect, series: &Series, y_min: f64, y_max: f64) {
    let n = series.values.len();
    if n == 0 || rect.w == 0 || rect.h == 0 {
        return;
    }
    let col_of = |i: usize| -> i64 {
        if n == 1 {
            rect.x as i64
        } else {
            rect.x as i64 + (i as f64 * rect.w.saturating_sub(1) as f64 / (n - 1) as f64).round() as i64
        }
    };

    let mut prev = (col_of(0), value_to_row(rect, series.values[0], y_min, y_max));
    put_clipped(img, rect, prev.0, prev.1, series.color);
    for (i, &v) in series.values.iter().enumerate().skip(1) {
        let next = (col_of(i), value_to_row(rect, v, y_min, y_max));
        draw_line(img, rect, prev, next, series.color);
        prev = next;
    }
}

/// Framed line panel; a gray zero axis is drawn when 0 lies inside the range
pub fn render_line_panel(series: &[Series], width: u32, height: u32, y_min: f64, y_max: f64) -> RgbImage {
    let mut img = RgbImage::from_pixel(width + 2 * MARGIN, height + 2 * MARGIN, BACKGROUND);
    let rect = Rect::new(MARGIN, MARGIN, width, height);
    if y_min < 0.0 && y_max > 0.0 {
        let zero = value_to_row(rect, 0.0, y_min, y_max);
        draw_line(&mut img, rect, (rect.x as i64, zero), (rect.right() as i64, zero), AXIS);
    }
    for s in series {
        draw_series(&mut img, rect, s, y_min, y_max);
    }
    draw_frame(&mut img, rect);
    img
}

/// Real and imaginary parts of an amplitude profile on a symmetric range
pub fn render_amplitude_profile(values: &[Complex64], width: u32, height: u32, limit: f64) -> RgbImage {
    let re = Series::new(values.iter().map(|c| c.re).collect(), BLUE);
    let im = Series::new(values.iter().map(|c| c.im).collect(), ORANGE);
    render_line_panel(&[re, im], width, height, -limit, limit)
}

/// Profile panel over heatmap with a colorbar, as one image
pub fn render_figure(field: &DensityField, display: &DisplayConfig, colormap: Colormap) -> RgbImage {
    let (ny, nx) = field.shape();
    let (nx, ny) = (nx as u32, ny as u32);

    let width = MARGIN + nx + GAP + COLORBAR_WIDTH + MARGIN;
    let height = MARGIN + PROFILE_HEIGHT + GAP + ny + MARGIN;
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);

    let profile_rect = Rect::new(MARGIN, MARGIN, nx, PROFILE_HEIGHT);
    let heat_rect = Rect::new(MARGIN, MARGIN + PROFILE_HEIGHT + GAP, nx, ny);
    let bar_rect = Rect::new(heat_rect.x + nx + GAP, heat_rect.y, COLORBAR_WIDTH, ny);

    let profile = Series::new(field.detector(display.detector), BLUE);
    draw_series(&mut img, profile_rect, &profile, 0.0, display.profile_max);
    draw_frame(&mut img, profile_rect);

    blit_heatmap(&mut img, heat_rect, field, display.clim, colormap);
    draw_colorbar(&mut img, bar_rect, colormap);

    img
}

pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)?;
    Ok(buf)
}

pub fn save_png(img: &RgbImage, path: impl AsRef<Path>) -> Result<()> {
    img.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{superpose, EvaluationRequest};
    use crate::grid::SampleGrid;
    use crate::slits::Emitter;
    use crate::wavepacket::PhysicalConstants;

    fn field() -> DensityField {
        let grid = SampleGrid::new(-2.0, 2.0, 0.0, 2.0, 41, 21).unwrap();
        let request = EvaluationRequest::new(
            PhysicalConstants::default(),
            grid,
            vec![Emitter::at(0.0, 0.0)],
            0.0,
        );
        superpose(&request).unwrap()
    }

    #[test]
    fn test_colormap_endpoints() {
        assert_eq!(Colormap::Gray.map(0.0), Rgb([0, 0, 0]));
        assert_eq!(Colormap::Gray.map(1.0), Rgb([255, 255, 255]));
        assert_eq!(Colormap::Gray.map(7.0), Rgb([255, 255, 255]));
        assert_eq!(Colormap::Heat.map(0.0), Rgb([0, 0, 0]));
        assert_eq!(Colormap::Heat.map(1.0), Rgb([255, 255, 255]));
        assert_eq!(Colormap::from_name("GREY"), Some(Colormap::Gray));
    }

    #[test]
    fn test_heatmap_origin_is_bottom() {
        let img = render_heatmap(&field(), 0.3, Colormap::Gray);
        assert_eq!(img.dimensions(), (41, 21));
        // Emitter at the bottom center saturates the clipped map
        assert_eq!(*img.get_pixel(20, 20), Rgb([255, 255, 255]));
        assert_eq!(*img.get_pixel(20, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_figure_layout_and_png() {
        let img = render_figure(&field(), &DisplayConfig::default(), Colormap::Gray);
        assert_eq!(
            img.dimensions(),
            (MARGIN + 41 + GAP + COLORBAR_WIDTH + MARGIN, MARGIN + PROFILE_HEIGHT + GAP + 21 + MARGIN)
        );
        let png = encode_png(&img).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_line_panel_draws_series() {
        let series = Series::new(vec![0.0, 1.0], RED);
        let img = render_line_panel(&[series], 10, 10, 0.0, 1.0);
        assert_eq!(*img.get_pixel(MARGIN + 1, MARGIN + 8), RED);
    }
}
