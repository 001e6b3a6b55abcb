use std::path::{Path, PathBuf};

use plotters::prelude::*;
use tracing::{debug, error, info};

use crate::models::{MarketSnapshot, RenderOutcome, RenderSurface, TimeSeries};
use crate::services::chart_service;
use crate::services::provider_service::{FetchError, MarketDataProvider};
use crate::utils::canvas::{BitmapSurface, RenderError};

pub const FETCH_ERROR_MESSAGE: &str = "Failed to fetch cryptocurrency data. Please try again.";

/// Anything that can display a freshly fetched series
pub trait ChartTarget {
    fn draw(&mut self, series: &TimeSeries) -> Result<RenderOutcome, RenderError>;
}

/// Renders charts into a PNG file
#[derive(Debug, Clone)]
pub struct PngChartTarget {
    path: PathBuf,
    surface: RenderSurface,
}

impl PngChartTarget {
    pub fn new(path: impl Into<PathBuf>, surface: RenderSurface) -> Self {
        PngChartTarget {
            path: path.into(),
            surface,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render `series` into `path` using this target's surface geometry
    pub fn render_to(
        &self,
        series: &TimeSeries,
        path: &Path,
    ) -> Result<RenderOutcome, RenderError> {
        let area = BitMapBackend::new(path, self.surface.backing_size()).into_drawing_area();
        let mut canvas = BitmapSurface::new(area, self.surface.device_pixel_ratio);
        let outcome = chart_service::render(series, &self.surface, &mut canvas)?;
        canvas.present()?;
        Ok(outcome)
    }
}

impl ChartTarget for PngChartTarget {
    fn draw(&mut self, series: &TimeSeries) -> Result<RenderOutcome, RenderError> {
        let outcome = self.render_to(series, &self.path)?;
        info!("🎨 Chart written to {}", self.path.display());
        Ok(outcome)
    }
}

/// Everything the dashboard displays. Replaced wholesale per fetch.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub selected: String,
    pub snapshot: Option<MarketSnapshot>,
    pub series: Option<TimeSeries>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Generation tag for an in-flight fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// What happened to a fetch once it completed
#[derive(Debug)]
pub enum FetchOutcome {
    Updated(RenderOutcome),
    Failed(FetchError),
    /// Data was stored but drawing it failed
    RenderFailed(RenderError),
    /// A newer request was issued before this one finished
    Stale,
    /// Nothing to fetch (blank search, refresh without data)
    Ignored,
}

/// State container wiring a provider to a chart target
pub struct Dashboard<P, T> {
    provider: P,
    target: T,
    state: DashboardState,
    generation: u64,
}

impl<P: MarketDataProvider, T: ChartTarget> Dashboard<P, T> {
    pub fn new(provider: P, target: T, initial_selection: &str) -> Self {
        Dashboard {
            provider,
            target,
            state: DashboardState {
                selected: initial_selection.to_string(),
                ..DashboardState::default()
            },
            generation: 0,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    /// Fetch the current selection (the initial load)
    pub async fn load(&mut self) -> FetchOutcome {
        let selected = self.state.selected.clone();
        self.fetch(&selected).await
    }

    /// Pick an asset from the list and fetch it
    pub async fn select(&mut self, id: &str) -> FetchOutcome {
        self.state.selected = id.trim().to_string();
        let selected = self.state.selected.clone();
        self.fetch(&selected).await
    }

    /// Fetch a free-form symbol; blank input is ignored
    pub async fn search(&mut self, symbol: &str) -> FetchOutcome {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return FetchOutcome::Ignored;
        }
        self.fetch(&symbol.to_lowercase()).await
    }

    /// Re-fetch whatever is currently displayed
    pub async fn refresh(&mut self) -> FetchOutcome {
        match self.state.snapshot.as_ref().map(|s| s.id.clone()) {
            Some(id) => self.fetch(&id).await,
            None => FetchOutcome::Ignored,
        }
    }

    pub async fn fetch(&mut self, id: &str) -> FetchOutcome {
        let token = self.begin_request();
        let result = self.provider.fetch(id).await;
        self.complete(token, result)
    }

    /// Mark a new fetch as in flight; supersedes any earlier token
    pub fn begin_request(&mut self) -> RequestToken {
        self.generation += 1;
        self.state.loading = true;
        self.state.error = None;
        RequestToken(self.generation)
    }

    /// Apply a provider result, dropping it if a newer request exists
    pub fn complete(
        &mut self,
        token: RequestToken,
        result: Result<(MarketSnapshot, TimeSeries), FetchError>,
    ) -> FetchOutcome {
        if token.0 != self.generation {
            debug!("Discarding stale response #{} (latest is #{})", token.0, self.generation);
            return FetchOutcome::Stale;
        }
        self.state.loading = false;

        let (snapshot, series) = match result {
            Ok(data) => data,
            Err(e) => {
                error!("Error fetching crypto data: {}", e);
                self.state.error = Some(FETCH_ERROR_MESSAGE.to_string());
                return FetchOutcome::Failed(e);
            }
        };

        info!("Loaded {} ({}) with {} samples", snapshot.name, snapshot.symbol, series.len());
        self.state.snapshot = Some(snapshot);
        let series = self.state.series.insert(series);

        match self.target.draw(series) {
            Ok(outcome) => FetchOutcome::Updated(outcome),
            Err(e) => {
                error!("Failed to render chart: {}", e);
                self.state.error = Some(format!("Failed to render chart: {}", e));
                FetchOutcome::RenderFailed(e)
            }
        }
    }
}
