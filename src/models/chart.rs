//! Chart rendering models

use plotters::style::RGBAColor;

/// Logical drawing area, in device-independent units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSurface {
    pub width: f64,
    pub height: f64,
    /// Inset reserved for axis labels
    pub padding: f64,
    /// Backing buffer scale only; layout math never sees it
    pub device_pixel_ratio: f64,
}

impl RenderSurface {
    pub fn new(width: f64, height: f64, padding: f64) -> Self {
        RenderSurface {
            width,
            height,
            padding,
            device_pixel_ratio: 1.0,
        }
    }

    pub fn with_device_pixel_ratio(mut self, ratio: f64) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    /// Size of the physical pixel buffer
    pub fn backing_size(&self) -> (u32, u32) {
        (
            (self.width * self.device_pixel_ratio).ceil().max(1.0) as u32,
            (self.height * self.device_pixel_ratio).ceil().max(1.0) as u32,
        )
    }

    pub fn plot_width(&self) -> f64 {
        self.width - 2.0 * self.padding
    }

    pub fn plot_height(&self) -> f64 {
        self.height - 2.0 * self.padding
    }

    /// Y of the bottom edge of the plotted region
    pub fn plot_bottom(&self) -> f64 {
        self.height - self.padding
    }
}

impl Default for RenderSurface {
    fn default() -> Self {
        RenderSurface::new(800.0, 400.0, 40.0)
    }
}

/// Qualitative direction of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Bullish,
    Bearish,
}

impl Trend {
    /// Ties count as bullish
    pub fn classify(first_price: f64, last_price: f64) -> Self {
        if last_price >= first_price {
            Trend::Bullish
        } else {
            Trend::Bearish
        }
    }

    pub fn legend(&self) -> &'static str {
        match self {
            Trend::Bullish => "↗ Bullish Trend",
            Trend::Bearish => "↘ Bearish Trend",
        }
    }

    pub fn theme(&self) -> Theme {
        match self {
            Trend::Bullish => Theme {
                stroke: RGBAColor(0x05, 0x96, 0x69, 1.0),
                fill: RGBAColor(0xd1, 0xfa, 0xe5, 1.0),
            },
            Trend::Bearish => Theme {
                stroke: RGBAColor(0xdc, 0x26, 0x26, 1.0),
                fill: RGBAColor(0xfe, 0xe2, 0xe2, 1.0),
            },
        }
    }
}

/// Stroke/fill pair applied to the whole series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub stroke: RGBAColor,
    pub fill: RGBAColor,
}

/// Why a render drew less than a full chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateInput {
    Empty,
    SinglePoint,
}

/// Result of a render call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Drawn(Trend),
    Skipped(DegenerateInput),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_tie_is_bullish() {
        assert_eq!(Trend::classify(100.0, 100.0), Trend::Bullish);
        assert_eq!(Trend::classify(100.0, 99.99), Trend::Bearish);
        assert_eq!(Trend::classify(100.0, 100.01), Trend::Bullish);
    }

    #[test]
    fn test_backing_size_scales_with_ratio() {
        let surface = RenderSurface::new(400.0, 300.0, 40.0).with_device_pixel_ratio(1.5);
        assert_eq!(surface.backing_size(), (600, 450));
        assert_eq!(RenderSurface::new(400.0, 300.0, 40.0).backing_size(), (400, 300));
    }
}
