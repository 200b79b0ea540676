//! CSV directory price store.
//!
//! One file per symbol, `<base_path>/<SYMBOL>.csv`, with a header row that
//! names at least a `Date` and an `Adj Close` column (the layout of Yahoo
//! Finance daily history downloads). `nan`, `null` and empty prices mark a
//! missing observation and are skipped.

use crate::domain::error::AssessorError;
use crate::domain::price::PricePoint;
use crate::ports::data_port::PricePort;
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::warn;

const DATE_COLUMN: &str = "Date";
const PRICE_COLUMN: &str = "Adj Close";

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    /// Every recorded price for `symbol`, ascending by date.
    fn read_all(&self, symbol: &str) -> Result<Vec<PricePoint>, AssessorError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => AssessorError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: format!("no price file at {}", path.display()),
            },
            _ => AssessorError::price_store(format!("failed to read {}: {}", path.display(), e)),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| AssessorError::price_store(format!("CSV header error: {}", e)))?
            .clone();
        let date_idx = column_index(&headers, DATE_COLUMN, &path)?;
        let price_idx = column_index(&headers, PRICE_COLUMN, &path)?;

        let mut points = Vec::new();
        for result in rdr.records() {
            let record = result
                .map_err(|e| AssessorError::price_store(format!("CSV parse error: {}", e)))?;

            let date_str = record.get(date_idx).unwrap_or_default().trim();
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                AssessorError::price_store(format!("invalid date {:?}: {}", date_str, e))
            })?;

            let price_str = record.get(price_idx).unwrap_or_default().trim();
            if is_missing(price_str) {
                continue;
            }
            let price: f64 = price_str.parse().map_err(|e| {
                AssessorError::price_store(format!("invalid price {:?} on {}: {}", price_str, date, e))
            })?;
            if !price.is_finite() {
                warn!(%symbol, %date, "skipping non-finite price");
                continue;
            }

            points.push(PricePoint { date, price });
        }

        points.sort_by_key(|p| p.date);
        Ok(points)
    }
}

fn column_index(
    headers: &csv::StringRecord,
    name: &str,
    path: &std::path::Path,
) -> Result<usize, AssessorError> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| {
            AssessorError::price_store(format!("missing {} column in {}", name, path.display()))
        })
}

fn is_missing(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("nan") || value.eq_ignore_ascii_case("null")
}

impl PricePort for CsvAdapter {
    fn fetch_adjusted_close(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, AssessorError> {
        let mut points = self.read_all(symbol)?;
        points.retain(|p| p.date >= start_date && p.date <= end_date);
        Ok(points)
    }

    fn list_symbols(&self) -> Result<Vec<String>, AssessorError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            AssessorError::price_store(format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|e| AssessorError::price_store(format!("directory entry error: {}", e)))?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, AssessorError> {
        let points = match self.read_all(symbol) {
            Ok(points) => points,
            Err(AssessorError::DataUnavailable { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        match (points.first(), points.last()) {
            (Some(first), Some(last)) => Ok(Some((first.date, last.date, points.len()))),
            _ => Ok(None),
        }
    }
}
