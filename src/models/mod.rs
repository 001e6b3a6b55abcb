//! Data models shared by the provider, renderer and dashboard

pub mod asset;
pub mod chart;
pub mod market;

pub use asset::POPULAR_ASSETS;
pub use chart::{DegenerateInput, RenderOutcome, RenderSurface, Trend};
pub use market::{MarketSnapshot, Sample, TimeSeries};
