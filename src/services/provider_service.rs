use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::asset::find_asset;
use crate::models::{MarketSnapshot, Sample, TimeSeries};

/// Days covered by a fetched series
pub const LOOKBACK_DAYS: i64 = 30;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;
const CIRCULATING_SUPPLY: f64 = 19_000_000.0;
const VOLUME_MULTIPLIER: f64 = 500_000.0;
/// Half-width of the daily price noise, relative to the base price
const DAILY_SPREAD: f64 = 0.0555;

/// Provider failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),
    #[error("Unknown symbol: '{0}'")]
    UnknownSymbol(String),
    #[error("Market data unavailable: {0}")]
    Unavailable(String),
}

/// Source of market snapshots and price history
#[async_trait]
pub trait MarketDataProvider {
    /// Fetch the current snapshot and the lookback series for a ticker or id
    async fn fetch(&self, identifier: &str) -> Result<(MarketSnapshot, TimeSeries), FetchError>;
}

/// Settings for the simulated provider
#[derive(Debug, Clone, PartialEq)]
pub struct MockSettings {
    pub delay: Duration,
    pub seed: Option<u64>,
    /// Reject identifiers missing from the asset registry
    pub strict_lookup: bool,
}

impl Default for MockSettings {
    fn default() -> Self {
        MockSettings {
            delay: Duration::from_millis(1000),
            seed: None,
            strict_lookup: false,
        }
    }
}

/// Provider that synthesizes data after a simulated network delay
pub struct MockProvider {
    settings: MockSettings,
    rng: Mutex<StdRng>,
    fetches: AtomicUsize,
}

impl MockProvider {
    pub fn new(settings: MockSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        MockProvider {
            settings,
            rng: Mutex::new(rng),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Number of fetches issued so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Resolve an identifier to (id, symbol, name)
    fn resolve(&self, identifier: &str) -> Result<(String, String, String), FetchError> {
        let identifier = identifier.trim();
        if identifier.is_empty()
            || !identifier.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(FetchError::InvalidIdentifier(identifier.to_string()));
        }

        if let Some(asset) = find_asset(identifier) {
            return Ok((asset.id.to_string(), asset.symbol.to_string(), asset.name.to_string()));
        }

        if self.settings.strict_lookup {
            return Err(FetchError::UnknownSymbol(identifier.to_string()));
        }

        let symbol = identifier.to_uppercase();
        Ok((identifier.to_lowercase(), symbol.clone(), symbol))
    }

    fn generate(&self, id: String, symbol: String, name: String) -> (MarketSnapshot, TimeSeries) {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let base_price = match symbol.as_str() {
            "BTC" => 45_000.0,
            "ETH" => 2_500.0,
            _ => rng.gen::<f64>() * 100.0 + 1.0,
        };
        let change: f64 = rng.gen_range(-0.05..0.05);

        let now = Utc::now();
        let now_ms = now.timestamp_millis();
        let samples: Vec<Sample> = (0..LOOKBACK_DAYS)
            .rev()
            .map(|days_ago| {
                let noise: f64 = rng.gen_range(-DAILY_SPREAD..DAILY_SPREAD);
                Sample::new(now_ms - days_ago * DAY_MS, (base_price * (1.0 + noise)).max(0.0))
            })
            .collect();
        let series = TimeSeries::new(samples);

        let current_price = series.last().map(|s| s.price).unwrap_or(base_price);
        let snapshot = MarketSnapshot {
            id,
            symbol,
            name,
            current_price,
            price_change_24h: current_price * change,
            price_change_percentage_24h: change * 100.0,
            market_cap: current_price * CIRCULATING_SUPPLY,
            total_volume: current_price * VOLUME_MULTIPLIER,
            high_24h: current_price * 1.05,
            low_24h: current_price * 0.95,
            circulating_supply: CIRCULATING_SUPPLY,
            last_updated: now,
        };

        (snapshot, series)
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    async fn fetch(&self, identifier: &str) -> Result<(MarketSnapshot, TimeSeries), FetchError> {
        let request = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        info!("📡 Fetching market data for '{}' (request #{})", identifier, request);

        if !self.settings.delay.is_zero() {
            tokio::time::sleep(self.settings.delay).await;
        }

        let (id, symbol, name) = self.resolve(identifier).map_err(|e| {
            warn!("Fetch for '{}' failed: {}", identifier, e);
            e
        })?;

        let (snapshot, series) = self.generate(id, symbol, name);
        debug!(
            "Generated {} samples for {} ending at {:.2}",
            series.len(),
            snapshot.symbol,
            snapshot.current_price
        );
        Ok((snapshot, series))
    }
}
