//! Data refinery — loads, validates, cleans, and caches historical candles.
//!
//! One CSV file per (symbol, timeframe) pair, named `{symbol}_{timeframe}.csv`
//! with path-unsafe symbol characters normalized (`BTC/USDT` → `BTC-USDT`).
//! Required columns: `timestamp,open,high,low,close,volume`.
//!
//! Every failure path logs and returns `None`; a malformed data file must
//! never abort a multi-symbol batch run. The cache holds the canonical
//! cleaned series and hands out independent clones only.

use crate::domain::{Candle, Series};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

const TIME_COLUMN: &str = "timestamp";
const REQUIRED_COLUMNS: [&str; 5] = ["open", "high", "low", "close", "volume"];

/// Internal classification of load failures. Never escapes `load` — callers
/// only see `None` plus a log line carrying this as the reason.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("data file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("missing required columns: {0:?}")]
    MissingColumns(Vec<String>),

    #[error("no usable rows after cleaning")]
    EmptyAfterCleaning,

    #[error("csv read error: {0}")]
    Csv(#[from] csv::Error),
}

/// Loads, validates, cleans, and caches historical series.
pub struct DataRefinery {
    data_dir: PathBuf,
    cache: HashMap<(String, String), Series>,
}

impl DataRefinery {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            cache: HashMap::new(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Deterministic storage path for a (symbol, timeframe) pair.
    pub fn storage_path(&self, symbol: &str, timeframe: &str) -> PathBuf {
        let safe_symbol = symbol.replace('/', "-");
        self.data_dir.join(format!("{safe_symbol}_{timeframe}.csv"))
    }

    /// Load a cleaned series, from cache when possible.
    ///
    /// Returns an independent copy: mutating the result never corrupts the
    /// cached canonical series or other callers' views.
    pub fn load(&mut self, symbol: &str, timeframe: &str) -> Option<Series> {
        let key = (symbol.to_string(), timeframe.to_string());
        if let Some(series) = self.cache.get(&key) {
            debug!(symbol, timeframe, "refinery cache hit");
            return Some(series.clone());
        }

        let path = self.storage_path(symbol, timeframe);
        match self.read_and_clean(&path, symbol, timeframe) {
            Ok(series) => {
                info!(
                    symbol,
                    timeframe,
                    candles = series.len(),
                    "loaded and cached historical data"
                );
                self.cache.insert(key, series.clone());
                Some(series)
            }
            Err(err) => {
                error!(
                    symbol,
                    timeframe,
                    path = %path.display(),
                    reason = %err,
                    "failed to load historical data"
                );
                None
            }
        }
    }

    fn read_and_clean(
        &self,
        path: &Path,
        symbol: &str,
        timeframe: &str,
    ) -> Result<Series, DataError> {
        if !path.exists() {
            return Err(DataError::FileNotFound(path.to_path_buf()));
        }

        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let mut missing: Vec<String> = Vec::new();
        let time_index = column(TIME_COLUMN);
        if time_index.is_none() {
            missing.push(TIME_COLUMN.to_string());
        }
        let mut value_indices = [0usize; 5];
        for (slot, name) in value_indices.iter_mut().zip(REQUIRED_COLUMNS) {
            match column(name) {
                Some(index) => *slot = index,
                None => missing.push(name.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(DataError::MissingColumns(missing));
        }
        let time_index = time_index.unwrap_or_default();

        let mut rows: Vec<Candle> = Vec::new();
        let mut dropped = 0usize;
        for record in reader.records() {
            let record = record?;
            match parse_row(&record, time_index, &value_indices) {
                Some(candle) => rows.push(candle),
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            warn!(
                symbol,
                timeframe, dropped, "dropped rows with invalid time or numeric data"
            );
        }

        let (candles, duplicates) = clean_candles(rows);
        if duplicates > 0 {
            warn!(symbol, timeframe, duplicates, "removed duplicate timestamps");
        }
        if candles.is_empty() {
            return Err(DataError::EmptyAfterCleaning);
        }

        Ok(Series::new(symbol, timeframe, candles))
    }
}

/// Sort ascending by timestamp and drop duplicates keeping the first
/// occurrence. Returns the cleaned candles and the duplicate count.
pub fn clean_candles(mut rows: Vec<Candle>) -> (Vec<Candle>, usize) {
    // Stable sort, so the first occurrence of a timestamp stays first.
    rows.sort_by_key(|c| c.timestamp);
    let before = rows.len();
    rows.dedup_by_key(|c| c.timestamp);
    let duplicates = before - rows.len();
    (rows, duplicates)
}

fn parse_row(record: &csv::StringRecord, time_index: usize, value_indices: &[usize; 5]) -> Option<Candle> {
    let timestamp = parse_timestamp(record.get(time_index)?)?;
    let mut values = [0.0f64; 5];
    for (slot, &index) in values.iter_mut().zip(value_indices) {
        *slot = parse_numeric(record.get(index)?)?;
    }
    let [open, high, low, close, volume] = values;
    Some(Candle {
        timestamp,
        open,
        high,
        low,
        close,
        volume,
    })
}

/// Parse a time value: RFC 3339, `%Y-%m-%d %H:%M:%S`, bare date, or unix
/// epoch seconds/milliseconds.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(ndt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    if let Ok(epoch) = raw.parse::<i64>() {
        // Heuristic: 13-digit values are milliseconds.
        let (secs, millis) = if epoch.abs() >= 1_000_000_000_000 {
            (epoch.div_euclid(1000), epoch.rem_euclid(1000))
        } else {
            (epoch, 0)
        };
        return DateTime::from_timestamp(secs, (millis as u32) * 1_000_000);
    }
    None
}

/// Coerce a field to a finite number; anything else marks the row invalid.
fn parse_numeric(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
