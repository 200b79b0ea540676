//! Adjusted-close price points and the aligned price table.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::error::AssessorError;

/// One adjusted close for one symbol on one trading day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// One dated value of a portfolio (or benchmark) series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Date-indexed table with one column per symbol.
///
/// Every row carries a value for every symbol; the only way to build one from
/// raw series is [`PriceTable::align`], which drops incomplete dates.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    symbols: Vec<String>,
    dates: Vec<NaiveDate>,
    rows: Vec<Vec<f64>>,
}

impl PriceTable {
    /// Inner-align per-symbol series on date.
    ///
    /// Dates are ascending in the result. A date survives only when every
    /// symbol has a price for it. Duplicate dates within one series keep the
    /// last price seen.
    pub fn align(series: Vec<(String, Vec<PricePoint>)>) -> Self {
        let width = series.len();
        let mut joined: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
        let mut symbols = Vec::with_capacity(width);

        for (col, (symbol, points)) in series.into_iter().enumerate() {
            symbols.push(symbol);
            for point in points {
                joined.entry(point.date).or_insert_with(|| vec![None; width])[col] =
                    Some(point.price);
            }
        }

        let mut dates = Vec::with_capacity(joined.len());
        let mut rows = Vec::with_capacity(joined.len());
        for (date, row) in joined {
            if let Some(complete) = row.into_iter().collect::<Option<Vec<f64>>>() {
                dates.push(date);
                rows.push(complete);
            }
        }

        Self {
            symbols,
            dates,
            rows,
        }
    }

    /// Build a table from already-aligned parts. `dates` must be ascending.
    pub fn from_rows(
        symbols: Vec<String>,
        dates: Vec<NaiveDate>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self, AssessorError> {
        if dates.len() != rows.len() {
            return Err(AssessorError::DimensionMismatch {
                expected: dates.len(),
                actual: rows.len(),
            });
        }
        if let Some(bad) = rows.iter().find(|r| r.len() != symbols.len()) {
            return Err(AssessorError::DimensionMismatch {
                expected: symbols.len(),
                actual: bad.len(),
            });
        }
        Ok(Self {
            symbols,
            dates,
            rows,
        })
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.symbols.len()
    }

    pub fn first_row(&self) -> Option<&[f64]> {
        self.rows.first().map(Vec::as_slice)
    }

    pub fn symbol_index(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    pub fn get(&self, date: NaiveDate, symbol: &str) -> Option<f64> {
        let col = self.symbol_index(symbol)?;
        let row = self.dates.binary_search(&date).ok()?;
        Some(self.rows[row][col])
    }

    /// Dated values of a single symbol.
    pub fn column(&self, symbol: &str) -> Option<Vec<ValuePoint>> {
        let col = self.symbol_index(symbol)?;
        Some(
            self.dates
                .iter()
                .zip(&self.rows)
                .map(|(&date, row)| ValuePoint {
                    date,
                    value: row[col],
                })
                .collect(),
        )
    }

    /// New table with the same symbols and dates and every row mapped by `f`.
    pub(crate) fn map_rows<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&[f64]) -> Vec<f64>,
    {
        Self {
            symbols: self.symbols.clone(),
            dates: self.dates.clone(),
            rows: self.rows.iter().map(|r| f(r.as_slice())).collect(),
        }
    }
}
