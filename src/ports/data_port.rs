//! Price store port trait.

use crate::domain::error::AssessorError;
use crate::domain::price::PricePoint;
use chrono::NaiveDate;

/// Read-only source of daily adjusted-close prices keyed by symbol.
pub trait PricePort {
    /// Adjusted closes for `symbol` within `[start_date, end_date]`, ascending.
    ///
    /// Fails with [`AssessorError::DataUnavailable`] when the store has no
    /// source for `symbol` at all. An existing symbol with no prices inside
    /// the window yields an empty vector.
    fn fetch_adjusted_close(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, AssessorError>;

    fn list_symbols(&self) -> Result<Vec<String>, AssessorError>;

    /// First date, last date and number of recorded prices for `symbol`.
    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, AssessorError>;
}
