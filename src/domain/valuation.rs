//! Position values and total portfolio value over time.

use super::error::AssessorError;
use super::price::{PriceTable, ValuePoint};

/// Output of [`value_series`].
#[derive(Debug, Clone, PartialEq)]
pub struct Valuation {
    /// Capital held in each symbol on each date.
    pub positions: PriceTable,
    pub portfolio: Vec<ValuePoint>,
}

/// Apply static allocation weights and starting capital to normalized prices.
pub fn value_series(
    normalized: &PriceTable,
    allocations: &[f64],
    starting_capital: f64,
) -> Result<Valuation, AssessorError> {
    if allocations.len() != normalized.width() {
        return Err(AssessorError::DimensionMismatch {
            expected: normalized.width(),
            actual: allocations.len(),
        });
    }

    let positions = normalized.map_rows(|row| {
        row.iter()
            .zip(allocations)
            .map(|(price, weight)| price * weight * starting_capital)
            .collect()
    });

    let portfolio = positions
        .dates()
        .iter()
        .zip(positions.rows())
        .map(|(&date, row)| ValuePoint {
            date,
            value: row.iter().sum(),
        })
        .collect();

    Ok(Valuation {
        positions,
        portfolio,
    })
}

/// Portfolio values only, without materialising the position table.
///
/// Used on the optimizer's hot path.
pub(crate) fn portfolio_values(normalized: &PriceTable, allocations: &[f64]) -> Vec<f64> {
    normalized
        .rows()
        .iter()
        .map(|row| row.iter().zip(allocations).map(|(p, w)| p * w).sum())
        .collect()
}
