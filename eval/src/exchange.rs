//! Currency exchange rates for fend's currency units.
//!
//! Rates are fetched once a day (USD based) and cached as JSON under the
//! user's cache directory. Every failure is logged and leaves currency
//! conversion unavailable; none of it is fatal.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tally_utils::{AtomicWriteOptions, atomic_write};
use thiserror::Error;

pub const RATES_URL: &str = "https://api.vatcomply.com/rates?base=USD";
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("cache {}: {source}", path.display())]
    Cache { path: PathBuf, source: io::Error },
    #[error("bad rates document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no exchange rate for {0}")]
    UnknownCurrency(String),
}

/// Units of each currency per one unit of `base`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRates {
    pub date: String,
    pub base: String,
    pub rates: HashMap<String, f64>,
}

impl ExchangeRates {
    pub fn rate(&self, currency: &str) -> Result<f64, ExchangeError> {
        self.rates
            .get(currency)
            .copied()
            .ok_or_else(|| ExchangeError::UnknownCurrency(currency.to_string()))
    }
}

/// On-disk cache entry. `fetched` is the local day of the download, which
/// differs from `rates.date` on weekends and holidays.
#[derive(Debug, Serialize, Deserialize)]
struct CachedRates {
    fetched: String,
    rates: ExchangeRates,
}

/// The platform cache directory, e.g. `~/.cache` on Linux.
#[must_use]
pub fn default_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir()
}

/// `<cache dir>/tally/exchanges.json`
#[must_use]
pub fn cache_file(cache_dir: &Path) -> PathBuf {
    cache_dir.join("tally").join("exchanges.json")
}

#[must_use]
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Cached rates downloaded on `today`, if any.
#[must_use]
pub fn read_cached(path: &Path, today: &str) -> Option<ExchangeRates> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
        Err(err) => {
            tracing::warn!(path = %path.display(), "Failed to read exchange rate cache: {err}");
            return None;
        }
    };
    match serde_json::from_str::<CachedRates>(&content) {
        Ok(cached) if cached.fetched == today => Some(cached.rates),
        Ok(_) => {
            tracing::debug!(path = %path.display(), "Exchange rate cache is out of date");
            None
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), "Ignoring corrupt exchange rate cache: {err}");
            None
        }
    }
}

pub fn write_cache(path: &Path, rates: &ExchangeRates, today: &str) -> Result<(), ExchangeError> {
    let cached = CachedRates {
        fetched: today.to_string(),
        rates: rates.clone(),
    };
    let content = serde_json::to_vec(&cached)?;
    atomic_write(path, &content, AtomicWriteOptions::default()).map_err(|source| {
        ExchangeError::Cache {
            path: path.to_path_buf(),
            source,
        }
    })
}

pub async fn fetch_rates() -> Result<ExchangeRates, ExchangeError> {
    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .https_only(true)
        .build()?;
    let rates = client
        .get(RATES_URL)
        .send()
        .await?
        .error_for_status()?
        .json::<ExchangeRates>()
        .await?;
    Ok(rates)
}

/// Today's rates from the cache, else from the network (refreshing the
/// cache). `None` when neither works.
pub async fn load_rates(cache_dir: Option<PathBuf>) -> Option<ExchangeRates> {
    let today = today();
    let cache = cache_dir.as_deref().map(cache_file);

    if let Some(path) = &cache
        && let Some(rates) = read_cached(path, &today)
    {
        tracing::debug!(path = %path.display(), "Using cached exchange rates");
        return Some(rates);
    }

    let rates = match fetch_rates().await {
        Ok(rates) => rates,
        Err(err) => {
            tracing::warn!("Failed to fetch exchange rates: {err}");
            return None;
        }
    };
    tracing::info!(date = %rates.date, currencies = rates.rates.len(), "Fetched exchange rates");

    if let Some(path) = &cache
        && let Err(err) = write_cache(path, &rates, &today)
    {
        tracing::warn!("Failed to cache exchange rates: {err}");
    }
    Some(rates)
}
