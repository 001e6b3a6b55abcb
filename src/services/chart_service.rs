use plotters::style::RGBAColor;
use tracing::debug;

use crate::models::{DegenerateInput, RenderOutcome, RenderSurface, TimeSeries, Trend};
use crate::utils::canvas::{DrawingSurface, Point, RenderError, VerticalGradient};
use crate::utils::format::{format_axis_price, format_chart_date};

const BACKGROUND: RGBAColor = RGBAColor(0xfa, 0xfa, 0xfa, 1.0);
const GRID_COLOR: RGBAColor = RGBAColor(0xe2, 0xe8, 0xf0, 1.0);
const LABEL_COLOR: RGBAColor = RGBAColor(0x64, 0x74, 0x8b, 1.0);
const FADE_COLOR: RGBAColor = RGBAColor(255, 255, 255, 0.1);
const BADGE_FILL: RGBAColor = RGBAColor(255, 255, 255, 0.9);

const PRICE_INTERVALS: usize = 4;
const TIME_INTERVALS: usize = 6;
const LINE_WIDTH: f64 = 3.0;
const GRID_WIDTH: f64 = 1.0;
const LABEL_FONT_SIZE: f64 = 12.0;
const LEGEND_FONT_SIZE: f64 = 14.0;
const SINGLE_POINT_RADIUS: f64 = 3.0;
const BADGE_TEXT: &str = "Last 30 Days";

/// A text label positioned by its left baseline point
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub position: Point,
}

/// Every coordinate the chart needs, computed in logical units
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub surface: RenderSurface,
    pub trend: Trend,
    pub min_price: f64,
    /// Never zero; flat series substitute 1.0
    pub price_range: f64,
    pub points: Vec<Point>,
    pub horizontal_grid: Vec<(Point, Point)>,
    pub vertical_grid: Vec<(Point, Point)>,
    /// Closed outline from the bottom-left corner through every point to the bottom-right
    pub area: Vec<Point>,
    pub y_labels: Vec<Label>,
    /// Indices of the samples that carry a date label
    pub x_label_indices: Vec<usize>,
}

impl ChartLayout {
    /// Lay out a series of at least two samples; `None` for degenerate input
    pub fn compute(series: &TimeSeries, surface: RenderSurface) -> Option<ChartLayout> {
        if series.len() < 2 {
            return None;
        }
        let (first, last) = (series.first()?.price, series.last()?.price);
        let min_price = series.min_price()?;
        let max_price = series.max_price()?;
        let price_range = effective_range(min_price, max_price);
        let trend = Trend::classify(first, last);

        let n = series.len();
        let points: Vec<Point> = series
            .prices()
            .enumerate()
            .map(|(i, price)| {
                (
                    x_for_index(&surface, i, n),
                    y_for_price(&surface, price, min_price, price_range),
                )
            })
            .collect();

        let bottom = surface.plot_bottom();
        let mut area = Vec::with_capacity(points.len() + 2);
        area.push((surface.padding, bottom));
        area.extend(points.iter().copied());
        area.push((surface.width - surface.padding, bottom));

        let y_labels = (0..=PRICE_INTERVALS)
            .map(|i| {
                let price = min_price + (i as f64 * price_range) / PRICE_INTERVALS as f64;
                let y = bottom - (i as f64 * surface.plot_height()) / PRICE_INTERVALS as f64;
                Label {
                    text: format_axis_price(price),
                    position: (5.0, y + 4.0),
                }
            })
            .collect();

        Some(ChartLayout {
            surface,
            trend,
            min_price,
            price_range,
            points,
            horizontal_grid: horizontal_grid(&surface),
            vertical_grid: vertical_grid(&surface),
            area,
            y_labels,
            x_label_indices: vec![0, n / 2, n - 1],
        })
    }

    fn gradient(&self) -> VerticalGradient {
        VerticalGradient {
            top: self.surface.padding,
            bottom: self.surface.plot_bottom(),
            start: self.trend.theme().fill,
            end: FADE_COLOR,
        }
    }
}

fn effective_range(min_price: f64, max_price: f64) -> f64 {
    let range = max_price - min_price;
    if range > 0.0 && range.is_finite() {
        range
    } else {
        1.0
    }
}

/// Horizontal position of sample `index` out of `count`
pub fn x_for_index(surface: &RenderSurface, index: usize, count: usize) -> f64 {
    if count < 2 {
        return surface.padding + surface.plot_width() / 2.0;
    }
    surface.padding + (index as f64 * surface.plot_width()) / (count - 1) as f64
}

/// Vertical position of `price`, growing upward from the plot bottom
pub fn y_for_price(surface: &RenderSurface, price: f64, min_price: f64, range: f64) -> f64 {
    surface.plot_bottom() - ((price - min_price) / range) * surface.plot_height()
}

fn horizontal_grid(surface: &RenderSurface) -> Vec<(Point, Point)> {
    (0..=PRICE_INTERVALS)
        .map(|i| {
            let y = surface.padding + (i as f64 * surface.plot_height()) / PRICE_INTERVALS as f64;
            ((surface.padding, y), (surface.width - surface.padding, y))
        })
        .collect()
}

fn vertical_grid(surface: &RenderSurface) -> Vec<(Point, Point)> {
    (0..=TIME_INTERVALS)
        .map(|i| {
            let x = surface.padding + (i as f64 * surface.plot_width()) / TIME_INTERVALS as f64;
            ((x, surface.padding), (x, surface.plot_bottom()))
        })
        .collect()
}

fn draw_grid<S: DrawingSurface>(
    canvas: &mut S,
    surface: &RenderSurface,
) -> Result<(), RenderError> {
    for (from, to) in horizontal_grid(surface).into_iter().chain(vertical_grid(surface)) {
        canvas.stroke_line(from, to, GRID_COLOR, GRID_WIDTH)?;
    }
    Ok(())
}

fn draw_badge<S: DrawingSurface>(canvas: &mut S) -> Result<(), RenderError> {
    let text_width = canvas.measure_text(BADGE_TEXT, LABEL_FONT_SIZE);
    let top_left = (10.0, 10.0);
    let bottom_right = (10.0 + text_width + 24.0, 10.0 + LABEL_FONT_SIZE + 16.0);
    canvas.fill_rect(top_left, bottom_right, BADGE_FILL)?;
    canvas.stroke_rect(top_left, bottom_right, GRID_COLOR, 1.0)?;
    canvas.fill_text(BADGE_TEXT, (22.0, 10.0 + 8.0 + LABEL_FONT_SIZE), LABEL_FONT_SIZE, LABEL_COLOR)
}

/// Draw `series` as a line/area chart onto `canvas`.
///
/// Empty input draws nothing; a single sample draws the grid and one dot.
/// Neither is an error.
pub fn render<S: DrawingSurface>(
    series: &TimeSeries,
    surface: &RenderSurface,
    canvas: &mut S,
) -> Result<RenderOutcome, RenderError> {
    if series.is_empty() {
        debug!("Skipping chart render: empty series");
        return Ok(RenderOutcome::Skipped(DegenerateInput::Empty));
    }

    let layout = match ChartLayout::compute(series, *surface) {
        Some(layout) => layout,
        None => {
            debug!("Rendering single-sample series as a point");
            canvas.clear(BACKGROUND)?;
            draw_grid(canvas, surface)?;
            let center = (x_for_index(surface, 0, 1), surface.plot_bottom());
            canvas.fill_circle(center, SINGLE_POINT_RADIUS, Trend::Bullish.theme().stroke)?;
            return Ok(RenderOutcome::Skipped(DegenerateInput::SinglePoint));
        }
    };

    let theme = layout.trend.theme();
    canvas.clear(BACKGROUND)?;

    for (from, to) in layout.horizontal_grid.iter().chain(layout.vertical_grid.iter()) {
        canvas.stroke_line(*from, *to, GRID_COLOR, GRID_WIDTH)?;
    }

    canvas.fill_gradient_polygon(&layout.area, &layout.gradient())?;
    canvas.stroke_polyline(&layout.points, theme.stroke, LINE_WIDTH)?;

    for label in &layout.y_labels {
        canvas.fill_text(&label.text, label.position, LABEL_FONT_SIZE, LABEL_COLOR)?;
    }

    let samples = series.samples();
    for &index in &layout.x_label_indices {
        let text = format_chart_date(samples[index].timestamp);
        let text_width = canvas.measure_text(&text, LABEL_FONT_SIZE);
        let x = layout.points[index].0 - text_width / 2.0;
        canvas.fill_text(&text, (x, surface.height - 10.0), LABEL_FONT_SIZE, LABEL_COLOR)?;
    }

    canvas.fill_text(
        layout.trend.legend(),
        (surface.width - 140.0, 25.0),
        LEGEND_FONT_SIZE,
        theme.stroke,
    )?;

    draw_badge(canvas)?;

    debug!(
        "Rendered {} samples ({:?}, range {:.2})",
        series.len(),
        layout.trend,
        layout.price_range
    );
    Ok(RenderOutcome::Drawn(layout.trend))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::canvas::{estimate_text_width, BitmapSurface};
    use plotters::prelude::{BitMapBackend, IntoDrawingArea};

    /// Surface that records every call as a command
    #[derive(Debug, Default)]
    struct RecordingSurface {
        commands: Vec<Command>,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Command {
        Clear,
        Line(Point, Point),
        Polyline(Vec<Point>, RGBAColor),
        Gradient(Vec<Point>, VerticalGradient),
        Circle(Point),
        Rect(Point, Point),
        RectOutline(Point, Point),
        Text(String, Point),
    }

    impl DrawingSurface for RecordingSurface {
        fn clear(&mut self, _color: RGBAColor) -> Result<(), RenderError> {
            self.commands.push(Command::Clear);
            Ok(())
        }

        fn stroke_line(
            &mut self,
            from: Point,
            to: Point,
            _color: RGBAColor,
            _width: f64,
        ) -> Result<(), RenderError> {
            self.commands.push(Command::Line(from, to));
            Ok(())
        }

        fn stroke_polyline(
            &mut self,
            points: &[Point],
            color: RGBAColor,
            _width: f64,
        ) -> Result<(), RenderError> {
            self.commands.push(Command::Polyline(points.to_vec(), color));
            Ok(())
        }

        fn fill_gradient_polygon(
            &mut self,
            points: &[Point],
            gradient: &VerticalGradient,
        ) -> Result<(), RenderError> {
            self.commands.push(Command::Gradient(points.to_vec(), *gradient));
            Ok(())
        }

        fn fill_circle(
            &mut self,
            center: Point,
            _radius: f64,
            _color: RGBAColor,
        ) -> Result<(), RenderError> {
            self.commands.push(Command::Circle(center));
            Ok(())
        }

        fn fill_rect(
            &mut self,
            top_left: Point,
            bottom_right: Point,
            _color: RGBAColor,
        ) -> Result<(), RenderError> {
            self.commands.push(Command::Rect(top_left, bottom_right));
            Ok(())
        }

        fn stroke_rect(
            &mut self,
            top_left: Point,
            bottom_right: Point,
            _color: RGBAColor,
            _width: f64,
        ) -> Result<(), RenderError> {
            self.commands.push(Command::RectOutline(top_left, bottom_right));
            Ok(())
        }

        fn fill_text(
            &mut self,
            text: &str,
            baseline_left: Point,
            _font_size: f64,
            _color: RGBAColor,
        ) -> Result<(), RenderError> {
            self.commands.push(Command::Text(text.to_string(), baseline_left));
            Ok(())
        }

        fn measure_text(&self, text: &str, font_size: f64) -> f64 {
            estimate_text_width(text, font_size)
        }
    }

    impl RecordingSurface {
        fn texts(&self) -> Vec<String> {
            self.commands
                .iter()
                .filter_map(|c| match c {
                    Command::Text(text, _) => Some(text.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    const DAY_MS: i64 = 24 * 60 * 60 * 1000;

    fn series(prices: &[f64]) -> TimeSeries {
        TimeSeries::from(
            prices
                .iter()
                .enumerate()
                .map(|(i, p)| (i as i64 * DAY_MS, *p))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_known_coordinates() {
        let surface = RenderSurface::new(400.0, 400.0, 40.0);
        let layout = ChartLayout::compute(&series(&[100.0, 200.0, 150.0]), surface).unwrap();
        assert_eq!(layout.points[1], (200.0, 40.0));
        assert_eq!(layout.points[0], (40.0, 360.0));
        assert_eq!(layout.points[2], (360.0, 200.0));
    }

    #[test]
    fn test_extremes_touch_plot_edges() {
        let surface = RenderSurface::new(640.0, 300.0, 40.0);
        let prices = [45_120.0, 46_900.5, 43_010.25, 44_000.0, 47_500.0, 42_999.9];
        let layout = ChartLayout::compute(&series(&prices), surface).unwrap();
        let ys: Vec<f64> = layout.points.iter().map(|p| p.1).collect();
        let top = ys.iter().copied().fold(f64::INFINITY, f64::min);
        let bottom = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!((top - 40.0).abs() < 1e-9);
        assert!((bottom - 260.0).abs() < 1e-9);
        assert!((ys[4] - 40.0).abs() < 1e-9);
        assert!((ys[5] - 260.0).abs() < 1e-9);
    }

    #[test]
    fn test_flat_series_maps_to_single_height() {
        let surface = RenderSurface::default();
        let layout = ChartLayout::compute(&series(&[500.0; 5]), surface).unwrap();
        assert_eq!(layout.price_range, 1.0);
        assert!(layout.points.iter().all(|p| p.1 == layout.points[0].1 && p.1.is_finite()));

        let mut canvas = RecordingSurface::default();
        let outcome = render(&series(&[500.0; 5]), &surface, &mut canvas).unwrap();
        assert_eq!(outcome, RenderOutcome::Drawn(Trend::Bullish));
    }

    #[test]
    fn test_empty_series_draws_nothing() {
        let mut canvas = RecordingSurface::default();
        let outcome =
            render(&TimeSeries::default(), &RenderSurface::default(), &mut canvas).unwrap();
        assert_eq!(outcome, RenderOutcome::Skipped(DegenerateInput::Empty));
        assert!(canvas.commands.is_empty());
    }

    #[test]
    fn test_single_sample_draws_one_point() {
        let surface = RenderSurface::new(400.0, 400.0, 40.0);
        let mut canvas = RecordingSurface::default();
        let outcome = render(&series(&[42_000.0]), &surface, &mut canvas).unwrap();
        assert_eq!(outcome, RenderOutcome::Skipped(DegenerateInput::SinglePoint));
        let circles: Vec<&Command> = canvas
            .commands
            .iter()
            .filter(|c| matches!(c, Command::Circle(_)))
            .collect();
        assert_eq!(circles, vec![&Command::Circle((200.0, 360.0))]);
        assert!(canvas.texts().is_empty());
    }

    #[test]
    fn test_layer_order() {
        let mut canvas = RecordingSurface::default();
        render(&series(&[1.0, 3.0, 2.0, 4.0]), &RenderSurface::default(), &mut canvas).unwrap();

        let position = |pred: &dyn Fn(&Command) -> bool| {
            canvas.commands.iter().position(|c| pred(c)).unwrap()
        };
        let first_line = position(&|c: &Command| matches!(c, Command::Line(..)));
        let gradient = position(&|c: &Command| matches!(c, Command::Gradient(..)));
        let polyline = position(&|c: &Command| matches!(c, Command::Polyline(..)));
        let first_text = position(&|c: &Command| matches!(c, Command::Text(..)));

        assert_eq!(canvas.commands[0], Command::Clear);
        assert!(first_line < gradient && gradient < polyline && polyline < first_text);
        // 5 horizontal + 7 vertical grid lines
        assert_eq!(canvas.commands.iter().filter(|c| matches!(c, Command::Line(..))).count(), 12);
    }

    #[test]
    fn test_area_closes_along_bottom_edge() {
        let surface = RenderSurface::new(400.0, 400.0, 40.0);
        let layout = ChartLayout::compute(&series(&[100.0, 200.0, 150.0]), surface).unwrap();
        assert_eq!(layout.area.first(), Some(&(40.0, 360.0)));
        assert_eq!(layout.area.last(), Some(&(360.0, 360.0)));
        assert_eq!(layout.area.len(), 5);
        let gradient = layout.gradient();
        assert_eq!((gradient.top, gradient.bottom), (40.0, 360.0));
        assert_eq!(gradient.end, FADE_COLOR);
    }

    #[test]
    fn test_labels_and_legend() {
        let prices = [45_000.0, 46_000.0, 47_000.0, 48_000.0, 44_000.0];
        let mut canvas = RecordingSurface::default();
        render(&series(&prices), &RenderSurface::default(), &mut canvas).unwrap();
        let texts = canvas.texts();

        for expected in ["$44k", "$45k", "$46k", "$47k", "$48k"] {
            assert!(texts.contains(&expected.to_string()), "missing {}", expected);
        }
        // Date labels for indices 0, 2 and 4 (epoch day 0, 2, 4)
        assert!(texts.contains(&"Jan 1".to_string()));
        assert!(texts.contains(&"Jan 3".to_string()));
        assert!(texts.contains(&"Jan 5".to_string()));
        assert!(texts.contains(&"↘ Bearish Trend".to_string()));
        assert!(texts.contains(&"Last 30 Days".to_string()));
    }

    #[test]
    fn test_date_labels_are_centered() {
        let surface = RenderSurface::new(400.0, 400.0, 40.0);
        let mut canvas = RecordingSurface::default();
        render(&series(&[100.0, 200.0, 150.0]), &surface, &mut canvas).unwrap();

        let width = estimate_text_width("Jan 2", LABEL_FONT_SIZE);
        assert!(canvas
            .commands
            .contains(&Command::Text("Jan 2".to_string(), (200.0 - width / 2.0, 390.0))));
    }

    #[test]
    fn test_theme_follows_trend() {
        let mut canvas = RecordingSurface::default();
        render(&series(&[100.0, 120.0, 100.0]), &RenderSurface::default(), &mut canvas).unwrap();
        let stroke = canvas.commands.iter().find_map(|c| match c {
            Command::Polyline(_, color) => Some(*color),
            _ => None,
        });
        assert_eq!(stroke, Some(Trend::Bullish.theme().stroke));
    }

    #[test]
    fn test_render_is_idempotent() {
        let data = series(&[3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0]);
        let surface = RenderSurface::default().with_device_pixel_ratio(2.0);
        let mut first = RecordingSurface::default();
        let mut second = RecordingSurface::default();
        render(&data, &surface, &mut first).unwrap();
        render(&data, &surface, &mut second).unwrap();
        assert_eq!(first.commands, second.commands);
    }

    /// Real raster output with text left out, so no system fonts are needed
    struct TextlessBitmap<'a>(BitmapSurface<BitMapBackend<'a>>);

    impl DrawingSurface for TextlessBitmap<'_> {
        fn clear(&mut self, color: RGBAColor) -> Result<(), RenderError> {
            self.0.clear(color)
        }

        fn stroke_line(
            &mut self,
            from: Point,
            to: Point,
            color: RGBAColor,
            width: f64,
        ) -> Result<(), RenderError> {
            self.0.stroke_line(from, to, color, width)
        }

        fn stroke_polyline(
            &mut self,
            points: &[Point],
            color: RGBAColor,
            width: f64,
        ) -> Result<(), RenderError> {
            self.0.stroke_polyline(points, color, width)
        }

        fn fill_gradient_polygon(
            &mut self,
            points: &[Point],
            gradient: &VerticalGradient,
        ) -> Result<(), RenderError> {
            self.0.fill_gradient_polygon(points, gradient)
        }

        fn fill_circle(
            &mut self,
            center: Point,
            radius: f64,
            color: RGBAColor,
        ) -> Result<(), RenderError> {
            self.0.fill_circle(center, radius, color)
        }

        fn fill_rect(
            &mut self,
            top_left: Point,
            bottom_right: Point,
            color: RGBAColor,
        ) -> Result<(), RenderError> {
            self.0.fill_rect(top_left, bottom_right, color)
        }

        fn stroke_rect(
            &mut self,
            top_left: Point,
            bottom_right: Point,
            color: RGBAColor,
            width: f64,
        ) -> Result<(), RenderError> {
            self.0.stroke_rect(top_left, bottom_right, color, width)
        }

        fn fill_text(
            &mut self,
            _text: &str,
            _baseline_left: Point,
            _font_size: f64,
            _color: RGBAColor,
        ) -> Result<(), RenderError> {
            Ok(())
        }

        fn measure_text(&self, text: &str, font_size: f64) -> f64 {
            estimate_text_width(text, font_size)
        }
    }

    fn rgb_at(buffer: &[u8], width: u32, x: u32, y: u32) -> (u8, u8, u8) {
        let i = ((y * width + x) * 3) as usize;
        (buffer[i], buffer[i + 1], buffer[i + 2])
    }

    #[test]
    fn test_bitmap_render_fills_under_the_line() {
        let surface = RenderSurface::new(400.0, 400.0, 40.0);
        let (width, height) = surface.backing_size();
        let mut buffer = vec![0u8; (width * height * 3) as usize];
        {
            let area = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            let mut canvas = TextlessBitmap(BitmapSurface::new(area, 1.0));
            let outcome = render(&series(&[100.0, 200.0]), &surface, &mut canvas).unwrap();
            assert_eq!(outcome, RenderOutcome::Drawn(Trend::Bullish));
            canvas.0.present().unwrap();
        }

        // Just below the rising line near the top: bullish fill, barely faded
        let (r, g, b) = rgb_at(&buffer, width, 350, 60);
        assert!((200..=225).contains(&r), "red channel {}", r);
        assert!(g > r && b > r, "not the bullish fill: {:?}", (r, g, b));
        assert_ne!((r, g, b), (0xfa, 0xfa, 0xfa));

        // Above the line inside the plot, and outside the plot: background only
        assert_eq!(rgb_at(&buffer, width, 60, 60), (0xfa, 0xfa, 0xfa));
        assert_eq!(rgb_at(&buffer, width, 10, 200), (0xfa, 0xfa, 0xfa));
    }
}
