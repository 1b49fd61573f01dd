//! CSV-backed market data adapter for recorded sessions.
//!
//! Per symbol, two files under the base directory:
//! - `{symbol}_daily.csv`: `date,open,high,low,close,volume` with `%Y-%m-%d`
//! - `{symbol}_minute.csv`: `datetime,close` with `%Y-%m-%d %H:%M`
//!
//! A symbol with no daily file is simply absent from query results, matching
//! the port contract that missing data is an absent key, never an error.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::domain::error::EngineError;
use crate::domain::ohlcv::DailyBar;
use crate::ports::market_data_port::MarketDataPort;

pub struct CsvMarketData {
    daily: HashMap<String, Vec<DailyBar>>,
    minute: HashMap<String, BTreeMap<NaiveDateTime, f64>>,
}

impl CsvMarketData {
    pub fn load(base_path: &Path, symbols: &[String]) -> Result<Self, EngineError> {
        let mut daily = HashMap::new();
        let mut minute = HashMap::new();

        for symbol in symbols {
            let daily_path = base_path.join(format!("{symbol}_daily.csv"));
            if !daily_path.exists() {
                warn!(%symbol, path = %daily_path.display(), "no daily bar file, symbol will be absent");
                continue;
            }
            daily.insert(symbol.clone(), read_daily(&daily_path, symbol)?);

            let minute_path = base_path.join(format!("{symbol}_minute.csv"));
            if minute_path.exists() {
                minute.insert(symbol.clone(), read_minute(&minute_path)?);
            } else {
                warn!(%symbol, path = %minute_path.display(), "no minute file, prices will be absent");
            }
        }

        Ok(CsvMarketData { daily, minute })
    }
}

fn data_error(path: &Path, detail: impl std::fmt::Display) -> EngineError {
    EngineError::Data {
        reason: format!("{}: {detail}", path.display()),
    }
}

fn field<'a>(
    record: &'a csv::StringRecord,
    index: usize,
    name: &str,
    path: &Path,
) -> Result<&'a str, EngineError> {
    record
        .get(index)
        .ok_or_else(|| data_error(path, format!("missing {name} column")))
}

fn read_daily(path: &PathBuf, symbol: &str) -> Result<Vec<DailyBar>, EngineError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| data_error(path, e))?;
    let mut bars = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|e| data_error(path, e))?;

        let date = NaiveDate::parse_from_str(field(&record, 0, "date", path)?, "%Y-%m-%d")
            .map_err(|e| data_error(path, format!("invalid date: {e}")))?;

        let number = |index: usize, name: &str| -> Result<f64, EngineError> {
            field(&record, index, name, path)?
                .parse::<f64>()
                .map_err(|e| data_error(path, format!("invalid {name}: {e}")))
        };
        let open = number(1, "open")?;
        let high = number(2, "high")?;
        let low = number(3, "low")?;
        let close = number(4, "close")?;

        let volume = field(&record, 5, "volume", path)?
            .parse::<i64>()
            .map_err(|e| data_error(path, format!("invalid volume: {e}")))?;

        bars.push(DailyBar {
            symbol: symbol.to_string(),
            date,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

fn read_minute(path: &PathBuf) -> Result<BTreeMap<NaiveDateTime, f64>, EngineError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| data_error(path, e))?;
    let mut closes = BTreeMap::new();

    for result in reader.records() {
        let record = result.map_err(|e| data_error(path, e))?;

        let at =
            NaiveDateTime::parse_from_str(field(&record, 0, "datetime", path)?, "%Y-%m-%d %H:%M")
                .map_err(|e| data_error(path, format!("invalid datetime: {e}")))?;
        let close = field(&record, 1, "close", path)?
            .parse::<f64>()
            .map_err(|e| data_error(path, format!("invalid close: {e}")))?;

        closes.insert(at, close);
    }

    Ok(closes)
}

impl MarketDataPort for CsvMarketData {
    fn fetch_daily_bars(
        &self,
        symbols: &[String],
        as_of: NaiveDate,
        lookback: usize,
    ) -> HashMap<String, Vec<DailyBar>> {
        let mut out = HashMap::new();
        for symbol in symbols {
            let Some(bars) = self.daily.get(symbol) else {
                continue;
            };
            let eligible: Vec<DailyBar> = bars
                .iter()
                .filter(|b| b.date <= as_of)
                .cloned()
                .collect();
            let start = eligible.len().saturating_sub(lookback);
            out.insert(symbol.clone(), eligible[start..].to_vec());
        }
        out
    }

    fn fetch_latest_price(
        &self,
        symbols: &[String],
        at: NaiveDateTime,
    ) -> HashMap<String, f64> {
        let mut out = HashMap::new();
        for symbol in symbols {
            let Some(closes) = self.minute.get(symbol) else {
                continue;
            };
            // Latest tick at or before `at`, same trading day only.
            if let Some((&ts, &close)) = closes.range(..=at).next_back() {
                if ts.date() == at.date() {
                    out.insert(symbol.clone(), close);
                }
            }
        }
        out
    }
}
