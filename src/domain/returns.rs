//! Period-over-period fractional returns.

use super::error::AssessorError;

/// `r[0] = 0`, `r[i] = v[i] / v[i-1] - 1`.
///
/// The leading zero is part of the series and is counted by every statistic
/// computed from it.
pub fn daily_returns(values: &[f64]) -> Result<Vec<f64>, AssessorError> {
    let mut returns = Vec::with_capacity(values.len());
    if values.is_empty() {
        return Ok(returns);
    }
    returns.push(0.0);

    for (i, w) in values.windows(2).enumerate() {
        if w[0] == 0.0 {
            return Err(AssessorError::division_by_zero(format!(
                "daily returns: value at index {i} is zero"
            )));
        }
        returns.push(w[1] / w[0] - 1.0);
    }

    Ok(returns)
}
