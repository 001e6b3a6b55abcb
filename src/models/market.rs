//! Market data models

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single (timestamp, price) observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    /// Epoch milliseconds
    pub timestamp: i64,
    pub price: f64,
}

impl Sample {
    pub fn new(timestamp: i64, price: f64) -> Self {
        Sample { timestamp, price }
    }
}

/// Samples ordered by non-decreasing timestamp
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeSeries(Vec<Sample>);

impl TimeSeries {
    /// Build a series, sorting by timestamp if the input is out of order
    pub fn new(mut samples: Vec<Sample>) -> Self {
        if samples.windows(2).any(|w| w[0].timestamp > w[1].timestamp) {
            samples.sort_by_key(|s| s.timestamp);
        }
        TimeSeries(samples)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.0.last()
    }

    pub fn prices(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().map(|s| s.price)
    }

    pub fn min_price(&self) -> Option<f64> {
        self.prices().reduce(f64::min)
    }

    pub fn max_price(&self) -> Option<f64> {
        self.prices().reduce(f64::max)
    }
}

impl From<Vec<(i64, f64)>> for TimeSeries {
    fn from(points: Vec<(i64, f64)>) -> Self {
        TimeSeries::new(points.into_iter().map(|(t, p)| Sample::new(t, p)).collect())
    }
}

/// Point-in-time market attributes for one asset.
///
/// Replaced wholesale by the next successful fetch, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSnapshot {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
    pub price_change_24h: f64,
    pub price_change_percentage_24h: f64,
    pub market_cap: f64,
    pub total_volume: f64,
    pub high_24h: f64,
    pub low_24h: f64,
    pub circulating_supply: f64,
    pub last_updated: DateTime<Utc>,
}
