//! Rescale series so the first observation is 1.0.

use super::error::AssessorError;
use super::price::{PriceTable, ValuePoint};

/// Divide every column by its first-row value.
pub fn normalize(table: &PriceTable) -> Result<PriceTable, AssessorError> {
    let first = table
        .first_row()
        .ok_or_else(|| AssessorError::division_by_zero("normalize: empty price table"))?
        .to_vec();

    if let Some(col) = first.iter().position(|&v| v == 0.0) {
        return Err(AssessorError::division_by_zero(format!(
            "normalize: first price of {} is zero",
            table.symbols()[col]
        )));
    }

    Ok(table.map_rows(|row| row.iter().zip(&first).map(|(v, base)| v / base).collect()))
}

/// Single-series form of [`normalize`], used for portfolio and benchmark curves.
pub fn normalize_series(series: &[ValuePoint]) -> Result<Vec<ValuePoint>, AssessorError> {
    let base = match series.first() {
        Some(p) if p.value != 0.0 => p.value,
        Some(_) => return Err(AssessorError::division_by_zero("normalize: first value is zero")),
        None => return Err(AssessorError::division_by_zero("normalize: empty series")),
    };

    Ok(series
        .iter()
        .map(|p| ValuePoint {
            date: p.date,
            value: p.value / base,
        })
        .collect())
}
