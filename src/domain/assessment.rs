//! The two entry points, `assess_portfolio` and `optimize_portfolio`, built on
//! one shared load → normalize → value → statistics pipeline.

use chrono::NaiveDate;
use tracing::info;

use super::error::AssessorError;
use super::loader::load_prices;
use super::normalize::normalize;
use super::optimizer::{optimize_allocation, OptimizerSettings};
use super::price::{PriceTable, ValuePoint};
use super::stats::{compute_stats, PortfolioStats, TRADING_DAYS_PER_YEAR};
use super::valuation::value_series;
use crate::ports::data_port::PricePort;

/// Parameters of one portfolio assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub symbols: Vec<String>,
    pub allocations: Vec<f64>,
    pub starting_capital: f64,
    /// Annual rate.
    pub risk_free_rate: f64,
    /// Return periods per year.
    pub sampling_frequency: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub request: AssessmentRequest,
    pub stats: PortfolioStats,
    pub portfolio: Vec<ValuePoint>,
    pub positions: PriceTable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Optimization {
    pub allocations: Vec<f64>,
    pub iterations: u64,
    /// Re-assessment of the optimal allocation with unit capital, zero
    /// risk-free rate and daily sampling.
    pub assessment: Assessment,
}

pub fn assess_portfolio(
    store: &dyn PricePort,
    request: &AssessmentRequest,
) -> Result<Assessment, AssessorError> {
    let prices = load_prices(store, &request.symbols, request.start_date, request.end_date)?;
    let normalized = normalize(&prices)?;
    assess_normalized(&normalized, request)
}

/// Assessment over an already-normalized table.
pub fn assess_normalized(
    normalized: &PriceTable,
    request: &AssessmentRequest,
) -> Result<Assessment, AssessorError> {
    let valuation = value_series(normalized, &request.allocations, request.starting_capital)?;
    let stats = compute_stats(
        &valuation.portfolio,
        request.risk_free_rate,
        request.sampling_frequency,
        request.starting_capital,
    )?;

    info!(
        sharpe = stats.sharpe_ratio,
        cumulative_return = stats.cumulative_return,
        "portfolio assessed"
    );

    Ok(Assessment {
        request: request.clone(),
        stats,
        portfolio: valuation.portfolio,
        positions: valuation.positions,
    })
}

pub fn optimize_portfolio(
    store: &dyn PricePort,
    start_date: NaiveDate,
    end_date: NaiveDate,
    symbols: &[String],
    settings: &OptimizerSettings,
) -> Result<Optimization, AssessorError> {
    let prices = load_prices(store, symbols, start_date, end_date)?;
    let normalized = normalize(&prices)?;

    info!(symbols = symbols.len(), "searching for the maximum Sharpe allocation");
    let optimized = optimize_allocation(&normalized, settings)?;

    let request = AssessmentRequest {
        start_date,
        end_date,
        symbols: symbols.to_vec(),
        allocations: optimized.allocations.clone(),
        starting_capital: 1.0,
        risk_free_rate: 0.0,
        sampling_frequency: TRADING_DAYS_PER_YEAR,
    };
    let assessment = assess_normalized(&normalized, &request)?;

    Ok(Optimization {
        allocations: optimized.allocations,
        iterations: optimized.iterations,
        assessment,
    })
}
