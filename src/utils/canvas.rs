//! Immediate-mode drawing surface used by the chart renderer.
//!
//! Callers work in device-independent units; `BitmapSurface` multiplies every
//! coordinate and stroke width by the device pixel ratio on the way to the
//! plotters backend.

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use thiserror::Error;

/// A point in device-independent units
pub type Point = (f64, f64);

const FONT_FAMILY: &str = "sans-serif";

/// plotters' ttf layout draws the baseline this fraction of the font size
/// above the bottom of the text box
const BASELINE_DROP: f64 = 0.24 / 1.24;

/// Drawing errors
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Drawing backend error: {0}")]
    Backend(String),
}

/// Linear gradient running top to bottom
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalGradient {
    pub top: f64,
    pub bottom: f64,
    pub start: RGBAColor,
    pub end: RGBAColor,
}

impl VerticalGradient {
    /// Color at logical height `y`, clamped to the gradient's extent
    pub fn color_at(&self, y: f64) -> RGBAColor {
        let span = self.bottom - self.top;
        let t = if span.abs() < f64::EPSILON {
            0.0
        } else {
            ((y - self.top) / span).clamp(0.0, 1.0)
        };
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        RGBAColor(
            lerp(self.start.0, self.end.0),
            lerp(self.start.1, self.end.1),
            lerp(self.start.2, self.end.2),
            self.start.3 + (self.end.3 - self.start.3) * t,
        )
    }
}

/// 2D primitives the chart renderer needs
pub trait DrawingSurface {
    fn clear(&mut self, color: RGBAColor) -> Result<(), RenderError>;

    fn stroke_line(
        &mut self,
        from: Point,
        to: Point,
        color: RGBAColor,
        width: f64,
    ) -> Result<(), RenderError>;

    /// Stroke a connected path with round joins and caps
    fn stroke_polyline(
        &mut self,
        points: &[Point],
        color: RGBAColor,
        width: f64,
    ) -> Result<(), RenderError>;

    /// Fill a closed polygon with a vertical gradient
    fn fill_gradient_polygon(
        &mut self,
        points: &[Point],
        gradient: &VerticalGradient,
    ) -> Result<(), RenderError>;

    fn fill_circle(
        &mut self,
        center: Point,
        radius: f64,
        color: RGBAColor,
    ) -> Result<(), RenderError>;

    /// Fill the half-open box from `top_left` up to, not including, `bottom_right`
    fn fill_rect(
        &mut self,
        top_left: Point,
        bottom_right: Point,
        color: RGBAColor,
    ) -> Result<(), RenderError>;

    fn stroke_rect(
        &mut self,
        top_left: Point,
        bottom_right: Point,
        color: RGBAColor,
        width: f64,
    ) -> Result<(), RenderError>;

    /// Draw text starting at `baseline_left`, which sits on the glyph baseline
    /// (descenders hang below it)
    fn fill_text(
        &mut self,
        text: &str,
        baseline_left: Point,
        font_size: f64,
        color: RGBAColor,
    ) -> Result<(), RenderError>;

    /// Advance width of `text` in logical units
    fn measure_text(&self, text: &str, font_size: f64) -> f64;
}

/// Rough advance width when no font metrics are available
pub fn estimate_text_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * 0.6
}

/// Raster surface over any plotters backend
pub struct BitmapSurface<DB: DrawingBackend> {
    area: DrawingArea<DB, Shift>,
    ratio: f64,
}

impl<DB: DrawingBackend> BitmapSurface<DB> {
    pub fn new(area: DrawingArea<DB, Shift>, device_pixel_ratio: f64) -> Self {
        BitmapSurface {
            area,
            ratio: if device_pixel_ratio > 0.0 { device_pixel_ratio } else { 1.0 },
        }
    }

    /// Flush pending pixels to the backend target
    pub fn present(&self) -> Result<(), RenderError> {
        self.area.present().map_err(backend_error)
    }

    fn px(&self, point: Point) -> (i32, i32) {
        (
            (point.0 * self.ratio).round() as i32,
            (point.1 * self.ratio).round() as i32,
        )
    }

    fn px_width(&self, width: f64) -> u32 {
        (width * self.ratio).round().max(1.0) as u32
    }

    fn text_style(&self, font_size: f64, color: RGBAColor) -> TextStyle<'static> {
        (FONT_FAMILY, font_size * self.ratio)
            .into_font()
            .color(&color)
            .pos(Pos::new(HPos::Left, VPos::Bottom))
    }
}

/// Bottom-left anchor of the text box whose baseline passes through `baseline_left`
fn text_box_anchor(baseline_left: Point, font_size: f64) -> Point {
    (baseline_left.0, baseline_left.1 + font_size * BASELINE_DROP)
}

fn backend_error<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Backend(e.to_string())
}

fn solid(color: RGBAColor, filled: bool, stroke_width: u32) -> ShapeStyle {
    ShapeStyle {
        color,
        filled,
        stroke_width,
    }
}

/// Horizontal spans covered by `points` (even-odd rule) at height `y`
fn scanline_spans(points: &[(f64, f64)], y: f64) -> Vec<(f64, f64)> {
    let mut crossings: Vec<f64> = Vec::new();
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        if (a.1 <= y && y < b.1) || (b.1 <= y && y < a.1) {
            crossings.push(a.0 + (y - a.1) * (b.0 - a.0) / (b.1 - a.1));
        }
    }
    crossings.sort_by(|l, r| l.total_cmp(r));
    crossings.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect()
}

impl<DB: DrawingBackend> DrawingSurface for BitmapSurface<DB> {
    fn clear(&mut self, color: RGBAColor) -> Result<(), RenderError> {
        self.area.fill(&color).map_err(backend_error)
    }

    fn stroke_line(
        &mut self,
        from: Point,
        to: Point,
        color: RGBAColor,
        width: f64,
    ) -> Result<(), RenderError> {
        let style = solid(color, false, self.px_width(width));
        self.area
            .draw(&PathElement::new(vec![self.px(from), self.px(to)], style))
            .map_err(backend_error)
    }

    fn stroke_polyline(
        &mut self,
        points: &[Point],
        color: RGBAColor,
        width: f64,
    ) -> Result<(), RenderError> {
        if points.is_empty() {
            return Ok(());
        }
        let pixels: Vec<(i32, i32)> = points.iter().map(|p| self.px(*p)).collect();
        let stroke_width = self.px_width(width);
        self.area
            .draw(&PathElement::new(pixels.clone(), solid(color, false, stroke_width)))
            .map_err(backend_error)?;

        // Round joins and caps: a disc at every vertex
        let radius = (width * self.ratio / 2.0).max(0.5);
        for pixel in pixels {
            self.area
                .draw(&Circle::new(pixel, radius, solid(color, true, 0)))
                .map_err(backend_error)?;
        }
        Ok(())
    }

    fn fill_gradient_polygon(
        &mut self,
        points: &[Point],
        gradient: &VerticalGradient,
    ) -> Result<(), RenderError> {
        if points.len() < 3 {
            return Ok(());
        }
        let scaled: Vec<(f64, f64)> = points
            .iter()
            .map(|(x, y)| (x * self.ratio, y * self.ratio))
            .collect();
        let (_, height) = self.area.dim_in_pixel();
        let min_y = scaled
            .iter()
            .map(|p| p.1)
            .fold(f64::INFINITY, f64::min)
            .floor()
            .max(0.0) as i32;
        let max_y = scaled
            .iter()
            .map(|p| p.1)
            .fold(f64::NEG_INFINITY, f64::max)
            .ceil()
            .min(height as f64) as i32;

        for row in min_y..max_y {
            let center = row as f64 + 0.5;
            let color = gradient.color_at(center / self.ratio);
            for (x0, x1) in scanline_spans(&scaled, center) {
                // Backend rects are half-open: one pixel row is [row, row + 1)
                let (start, end) = (x0.round() as i32, x1.round() as i32);
                if end <= start {
                    continue;
                }
                self.area
                    .draw(&Rectangle::new([(start, row), (end, row + 1)], solid(color, true, 0)))
                    .map_err(backend_error)?;
            }
        }
        Ok(())
    }

    fn fill_circle(
        &mut self,
        center: Point,
        radius: f64,
        color: RGBAColor,
    ) -> Result<(), RenderError> {
        let radius = (radius * self.ratio).max(0.5);
        self.area
            .draw(&Circle::new(self.px(center), radius, solid(color, true, 0)))
            .map_err(backend_error)
    }

    fn fill_rect(
        &mut self,
        top_left: Point,
        bottom_right: Point,
        color: RGBAColor,
    ) -> Result<(), RenderError> {
        let corners = [self.px(top_left), self.px(bottom_right)];
        self.area
            .draw(&Rectangle::new(corners, solid(color, true, 0)))
            .map_err(backend_error)
    }

    fn stroke_rect(
        &mut self,
        top_left: Point,
        bottom_right: Point,
        color: RGBAColor,
        width: f64,
    ) -> Result<(), RenderError> {
        let style = solid(color, false, self.px_width(width));
        let corners = [self.px(top_left), self.px(bottom_right)];
        self.area
            .draw(&Rectangle::new(corners, style))
            .map_err(backend_error)
    }

    fn fill_text(
        &mut self,
        text: &str,
        baseline_left: Point,
        font_size: f64,
        color: RGBAColor,
    ) -> Result<(), RenderError> {
        let style = self.text_style(font_size, color);
        let anchor = self.px(text_box_anchor(baseline_left, font_size));
        self.area
            .draw(&Text::new(text.to_string(), anchor, style))
            .map_err(backend_error)
    }

    fn measure_text(&self, text: &str, font_size: f64) -> f64 {
        let style = self.text_style(font_size, RGBAColor(0, 0, 0, 1.0));
        match self.area.estimate_text_size(text, &style) {
            Ok((width, _)) => width as f64 / self.ratio,
            Err(e) => {
                tracing::debug!("Falling back to estimated text width for {:?}: {}", text, e);
                estimate_text_width(text, font_size)
            }
        }
    }
}
