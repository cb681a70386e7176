//! Postal-code market rent lookup with a cache in front of the external source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Market rent as reported by an external source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRentQuote {
    pub region_code: String,
    pub market_rent: f64,
}

/// Cached market rent keyed by postal code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRentEstimate {
    pub zip_code: String,
    pub region_code: String,
    pub market_rent: f64,
    pub cached_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum MarketRentError {
    #[error("zip code must not be empty")]
    EmptyZipCode,
    #[error("no market rent known for zip code {0}")]
    NotFound(String),
    #[error("market rent lookup is not configured")]
    NotConfigured,
    #[error("market rent table could not be read: {0}")]
    Csv(#[from] csv::Error),
    #[error("market rent table could not be opened: {0}")]
    Io(#[from] std::io::Error),
    #[error("market rent cache unavailable: {0}")]
    Unavailable(String),
}

/// External market-rate provider.
pub trait MarketRentSource: Send + Sync {
    fn lookup(&self, zip_code: &str) -> Result<Option<MarketRentQuote>, MarketRentError>;
}

/// Key-value store of previously retrieved estimates.
pub trait MarketRentCache: Send + Sync {
    fn get(&self, zip_code: &str) -> Result<Option<MarketRentEstimate>, MarketRentError>;
    fn put(&self, estimate: MarketRentEstimate) -> Result<(), MarketRentError>;
}

/// Market rents loaded from a `zip_code,region_code,market_rent` CSV export.
#[derive(Debug, Clone, Default)]
pub struct CsvMarketRentTable {
    rows: HashMap<String, MarketRentQuote>,
}

#[derive(Debug, Deserialize)]
struct MarketRentRow {
    zip_code: String,
    region_code: String,
    market_rent: f64,
}

impl CsvMarketRentTable {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MarketRentError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, MarketRentError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut rows = HashMap::new();

        for record in csv_reader.deserialize::<MarketRentRow>() {
            let row = record?;
            rows.insert(
                row.zip_code,
                MarketRentQuote {
                    region_code: row.region_code,
                    market_rent: row.market_rent,
                },
            );
        }

        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl MarketRentSource for CsvMarketRentTable {
    fn lookup(&self, zip_code: &str) -> Result<Option<MarketRentQuote>, MarketRentError> {
        Ok(self.rows.get(zip_code).cloned())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryMarketRentCache {
    entries: Mutex<HashMap<String, MarketRentEstimate>>,
}

impl MarketRentCache for InMemoryMarketRentCache {
    fn get(&self, zip_code: &str) -> Result<Option<MarketRentEstimate>, MarketRentError> {
        let guard = self
            .entries
            .lock()
            .map_err(|_| MarketRentError::Unavailable("cache mutex poisoned".to_string()))?;
        Ok(guard.get(zip_code).cloned())
    }

    fn put(&self, estimate: MarketRentEstimate) -> Result<(), MarketRentError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| MarketRentError::Unavailable("cache mutex poisoned".to_string()))?;
        guard.insert(estimate.zip_code.clone(), estimate);
        Ok(())
    }
}

/// Cache-first lookup: the source is only consulted on a miss.
pub struct MarketRentLookup<S, C> {
    source: Arc<S>,
    cache: Arc<C>,
}

impl<S, C> MarketRentLookup<S, C>
where
    S: MarketRentSource,
    C: MarketRentCache,
{
    pub fn new(source: Arc<S>, cache: Arc<C>) -> Self {
        Self { source, cache }
    }

    pub fn market_rent_for(&self, zip_code: &str) -> Result<MarketRentEstimate, MarketRentError> {
        let zip_code = zip_code.trim();
        if zip_code.is_empty() {
            return Err(MarketRentError::EmptyZipCode);
        }

        if let Some(estimate) = self.cache.get(zip_code)? {
            debug!(zip_code, "market rent cache hit");
            return Ok(estimate);
        }

        let quote = self
            .source
            .lookup(zip_code)?
            .ok_or_else(|| MarketRentError::NotFound(zip_code.to_string()))?;

        let estimate = MarketRentEstimate {
            zip_code: zip_code.to_string(),
            region_code: quote.region_code,
            market_rent: quote.market_rent,
            cached_at: Utc::now(),
        };
        self.cache.put(estimate.clone())?;
        debug!(zip_code, region_code = %estimate.region_code, "market rent cached");

        Ok(estimate)
    }
}
