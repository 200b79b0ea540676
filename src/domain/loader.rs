//! Build an aligned price table from a price store.

use chrono::NaiveDate;
use tracing::{debug, info};

use super::error::AssessorError;
use super::normalize::normalize_series;
use super::price::{PriceTable, ValuePoint};
use crate::ports::data_port::PricePort;

/// Fetch every symbol over the inclusive window and inner-align on date.
///
/// Dates missing a price for any symbol are dropped. An empty result is
/// [`AssessorError::DataUnavailable`], including when the window holds no
/// trading days for only some of the symbols.
pub fn load_prices(
    store: &dyn PricePort,
    symbols: &[String],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<PriceTable, AssessorError> {
    if symbols.is_empty() {
        return Err(AssessorError::DataUnavailable {
            symbol: "<none>".into(),
            reason: "no symbols requested".into(),
        });
    }

    let mut series = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let points = store.fetch_adjusted_close(symbol, start_date, end_date)?;
        debug!(%symbol, prices = points.len(), "fetched adjusted closes");
        series.push((symbol.clone(), points));
    }

    let table = PriceTable::align(series);
    if table.is_empty() {
        return Err(AssessorError::DataUnavailable {
            symbol: symbols.join(","),
            reason: format!("no trading day between {start_date} and {end_date} has a price for every symbol"),
        });
    }

    info!(
        symbols = symbols.len(),
        days = table.len(),
        first = %table.dates()[0],
        last = %table.dates()[table.len() - 1],
        "price table aligned"
    );
    Ok(table)
}

/// Normalized price series of one benchmark symbol, for plot comparison.
pub fn load_benchmark(
    store: &dyn PricePort,
    symbol: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<ValuePoint>, AssessorError> {
    let table = load_prices(store, &[symbol.to_string()], start_date, end_date)?;
    let series = table.column(symbol).unwrap_or_default();
    normalize_series(&series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::PricePoint;
    use std::collections::HashMap;

    struct StaticStore {
        prices: HashMap<String, Vec<PricePoint>>,
    }

    impl StaticStore {
        fn new(entries: &[(&str, &[(u32, f64)])]) -> Self {
            let prices = entries
                .iter()
                .map(|(symbol, points)| {
                    let series = points
                        .iter()
                        .map(|&(day, price)| PricePoint {
                            date: NaiveDate::from_ymd_opt(2010, 1, day).unwrap(),
                            price,
                        })
                        .collect();
                    (symbol.to_string(), series)
                })
                .collect();
            Self { prices }
        }
    }

    impl PricePort for StaticStore {
        fn fetch_adjusted_close(
            &self,
            symbol: &str,
            start_date: NaiveDate,
            end_date: NaiveDate,
        ) -> Result<Vec<PricePoint>, AssessorError> {
            let series = self
                .prices
                .get(symbol)
                .ok_or_else(|| AssessorError::DataUnavailable {
                    symbol: symbol.to_string(),
                    reason: "unknown symbol".into(),
                })?;
            Ok(series
                .iter()
                .filter(|p| p.date >= start_date && p.date <= end_date)
                .copied()
                .collect())
        }

        fn list_symbols(&self) -> Result<Vec<String>, AssessorError> {
            Ok(self.prices.keys().cloned().collect())
        }

        fn get_data_range(
            &self,
            _symbol: &str,
        ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, AssessorError> {
            Ok(None)
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2010, 1, d).unwrap()
    }

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn load_aligns_and_restricts_window() {
        let store = StaticStore::new(&[
            ("A", &[(4, 10.0), (5, 11.0), (6, 12.0), (7, 13.0)]),
            ("B", &[(4, 20.0), (6, 22.0), (7, 23.0)]),
        ]);
        let table = load_prices(&store, &symbols(&["A", "B"]), date(4), date(6)).unwrap();

        assert_eq!(table.dates(), &[date(4), date(6)]);
        assert_eq!(table.rows()[1], vec![12.0, 22.0]);
    }

    #[test]
    fn missing_symbol_is_data_unavailable() {
        let store = StaticStore::new(&[("A", &[(4, 10.0)])]);
        let err = load_prices(&store, &symbols(&["A", "ZZZ"]), date(1), date(31)).unwrap_err();
        assert!(matches!(err, AssessorError::DataUnavailable { symbol, .. } if symbol == "ZZZ"));
    }

    #[test]
    fn window_empty_for_one_symbol_is_data_unavailable() {
        let store = StaticStore::new(&[("A", &[(4, 10.0), (5, 11.0)]), ("B", &[(20, 5.0)])]);
        let err = load_prices(&store, &symbols(&["A", "B"]), date(1), date(10)).unwrap_err();
        assert!(matches!(err, AssessorError::DataUnavailable { .. }));
    }

    #[test]
    fn no_symbols_is_data_unavailable() {
        let store = StaticStore::new(&[]);
        assert!(load_prices(&store, &[], date(1), date(10)).is_err());
    }

    #[test]
    fn benchmark_is_normalized() {
        let store = StaticStore::new(&[("SPY", &[(4, 113.33), (5, 113.63), (6, 113.71)])]);
        let spy = load_benchmark(&store, "SPY", date(1), date(31)).unwrap();
        assert_eq!(spy.len(), 3);
        assert_eq!(spy[0].value, 1.0);
        assert!((spy[2].value - 113.71 / 113.33).abs() < 1e-12);
    }
}
