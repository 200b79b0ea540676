//! Portfolio statistics: cumulative return, average daily return, volatility,
//! Sharpe ratio and ending value.

use super::error::AssessorError;
use super::price::ValuePoint;
use super::returns::daily_returns;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Volatilities at or below this are treated as zero.
pub(crate) const MIN_VOLATILITY: f64 = 1e-15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioStats {
    pub cumulative_return: f64,
    pub average_daily_return: f64,
    /// Sample standard deviation (N - 1) of daily returns.
    pub daily_return_stddev: f64,
    pub sharpe_ratio: f64,
    pub ending_value: f64,
}

/// Compute [`PortfolioStats`] for a portfolio value series.
///
/// `risk_free_rate` is annual; it is converted to a per-period rate with
/// `(1 + rfr)^(1 / sampling_frequency) - 1`.
pub fn compute_stats(
    portfolio: &[ValuePoint],
    risk_free_rate: f64,
    sampling_frequency: f64,
    starting_capital: f64,
) -> Result<PortfolioStats, AssessorError> {
    let values: Vec<f64> = portfolio.iter().map(|p| p.value).collect();
    let (first, last) = match (values.first(), values.last()) {
        (Some(&f), Some(&l)) => (f, l),
        _ => {
            return Err(AssessorError::DataUnavailable {
                symbol: "portfolio".into(),
                reason: "empty value series".into(),
            });
        }
    };
    if first == 0.0 {
        return Err(AssessorError::division_by_zero(
            "cumulative return: first portfolio value is zero",
        ));
    }

    let cumulative_return = last / first - 1.0;
    let returns = daily_returns(&values)?;
    let average_daily_return = mean(&returns);
    let daily_return_stddev = sample_stddev(&returns, average_daily_return);
    let sharpe_ratio = sharpe_ratio(&returns, risk_free_rate, sampling_frequency)?;

    Ok(PortfolioStats {
        cumulative_return,
        average_daily_return,
        daily_return_stddev,
        sharpe_ratio,
        ending_value: (1.0 + cumulative_return) * starting_capital,
    })
}

/// Annualised Sharpe ratio of a daily-return series.
pub fn sharpe_ratio(
    returns: &[f64],
    risk_free_rate: f64,
    sampling_frequency: f64,
) -> Result<f64, AssessorError> {
    if returns.len() < 2 {
        return Err(AssessorError::UndefinedRatio {
            reason: format!("need at least 2 observations, have {}", returns.len()),
        });
    }

    let avg = mean(returns);
    let stddev = sample_stddev(returns, avg);
    if stddev.is_nan() || stddev <= MIN_VOLATILITY {
        return Err(AssessorError::UndefinedRatio {
            reason: "volatility of daily returns is zero".into(),
        });
    }

    let daily_rf = (1.0 + risk_free_rate).powf(1.0 / sampling_frequency) - 1.0;
    let excess = returns.iter().map(|r| r - daily_rf).sum::<f64>() / returns.len() as f64;

    Ok(excess / stddev * sampling_frequency.sqrt())
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        0.0
    } else {
        xs.iter().sum::<f64>() / xs.len() as f64
    }
}

fn sample_stddev(xs: &[f64], mean: f64) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let ss: f64 = xs.iter().map(|x| (x - mean).powi(2)).sum();
    (ss / (xs.len() - 1) as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_series(values: &[f64]) -> Vec<ValuePoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| ValuePoint {
                date: NaiveDate::from_ymd_opt(2010, 1, 4).unwrap()
                    + chrono::Duration::days(i as i64),
                value: v,
            })
            .collect()
    }

    #[test]
    fn stats_two_symbol_scenario() {
        let series = make_series(&[1000.0, 1050.0, 1105.0]);
        let stats = compute_stats(&series, 0.0, 252.0, 1000.0).unwrap();

        assert_relative_eq!(stats.cumulative_return, 0.105, epsilon = 1e-12);
        assert_relative_eq!(stats.average_daily_return, 0.034126984, epsilon = 1e-8);
        assert_relative_eq!(stats.daily_return_stddev, 0.029578802, epsilon = 1e-8);
        assert_relative_eq!(stats.sharpe_ratio, 18.315450405, epsilon = 1e-6);
        assert_relative_eq!(stats.ending_value, 1105.0, epsilon = 1e-9);
    }

    #[test]
    fn stddev_uses_sample_denominator() {
        let series = make_series(&[100.0, 110.0, 99.0]);
        let stats = compute_stats(&series, 0.0, 252.0, 100.0).unwrap();
        let r2: f64 = 99.0 / 110.0 - 1.0;
        let m = (0.1 + r2) / 3.0;
        let ss = m.powi(2) + (0.1 - m).powi(2) + (r2 - m).powi(2);
        assert_relative_eq!(stats.daily_return_stddev, (ss / 2.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn risk_free_rate_is_compounded_per_period() {
        let series = make_series(&[100.0, 101.0, 100.5, 102.0, 103.0]);
        let zero = compute_stats(&series, 0.0, 252.0, 100.0).unwrap();
        let rf = compute_stats(&series, 0.05, 252.0, 100.0).unwrap();

        let daily_rf = 1.05f64.powf(1.0 / 252.0) - 1.0;
        let expected = zero.sharpe_ratio - daily_rf / zero.daily_return_stddev * 252f64.sqrt();
        assert_relative_eq!(rf.sharpe_ratio, expected, epsilon = 1e-9);
        assert!(rf.sharpe_ratio < zero.sharpe_ratio);
    }

    #[test]
    fn ending_value_scales_with_starting_capital() {
        let series = make_series(&[1.0, 1.2]);
        let stats = compute_stats(&series, 0.0, 252.0, 1_000_000.0).unwrap();
        assert_relative_eq!(stats.ending_value, 1_200_000.0, epsilon = 1e-6);
    }

    #[test]
    fn constant_portfolio_has_undefined_sharpe() {
        let series = make_series(&[500.0, 500.0, 500.0, 500.0]);
        let err = compute_stats(&series, 0.0, 252.0, 500.0).unwrap_err();
        assert!(matches!(err, AssessorError::UndefinedRatio { .. }));
    }

    #[test]
    fn single_observation_has_undefined_sharpe() {
        let series = make_series(&[500.0]);
        let err = compute_stats(&series, 0.0, 252.0, 500.0).unwrap_err();
        assert!(matches!(err, AssessorError::UndefinedRatio { .. }));
    }

    #[test]
    fn empty_series_is_data_unavailable() {
        let err = compute_stats(&[], 0.0, 252.0, 500.0).unwrap_err();
        assert!(matches!(err, AssessorError::DataUnavailable { .. }));
    }

    #[test]
    fn negative_drift_gives_negative_sharpe() {
        let series = make_series(&[100.0, 98.0, 97.0, 94.0, 93.5]);
        let stats = compute_stats(&series, 0.0, 252.0, 100.0).unwrap();
        assert!(stats.sharpe_ratio < 0.0);
        assert!(stats.cumulative_return < 0.0);
    }
}
