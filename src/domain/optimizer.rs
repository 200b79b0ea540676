//! Sharpe-maximising allocation search over the probability simplex.
//!
//! Candidates are evaluated at their Euclidean projection onto
//! `{w : 0 <= w_i <= 1, sum(w) = 1}`, so the derivative-free Nelder-Mead
//! search runs unconstrained while every point it reports maps to a feasible
//! allocation. The squared distance to the projection is added to the cost so
//! that points outside the simplex never tie with their projection.
//!
//! The Sharpe ratio over the simplex can have several local maxima, often at
//! single-asset corners. The search therefore starts from the uniform
//! allocation and from every corner, restarts each run from its projected
//! best point until it stops improving, and keeps the best allocation found.

use argmin::core::{CostFunction, Executor, State, TerminationReason};
use argmin::solver::neldermead::NelderMead;
use tracing::{debug, warn};

use super::error::AssessorError;
use super::price::PriceTable;
use super::returns::daily_returns;
use super::stats::{sharpe_ratio, TRADING_DAYS_PER_YEAR};
use super::valuation::portfolio_values;

/// Weight of the squared distance between a candidate and its projection.
const INFEASIBILITY_PENALTY: f64 = 10.0;
/// Upper bound on Nelder-Mead runs chained from one starting point.
const MAX_RESTARTS: usize = 20;
/// A restart that improves the cost by no more than this ends the chain.
const RESTART_IMPROVEMENT: f64 = 1e-10;

/// Solver stopping criteria.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerSettings {
    /// Iteration cap for each Nelder-Mead run.
    pub max_iters: u64,
    /// Converged once the standard deviation of the simplex costs drops below this.
    pub sd_tolerance: f64,
    /// Edge length of the starting simplex around each starting allocation.
    pub initial_step: f64,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            max_iters: 5000,
            sd_tolerance: 1e-10,
            initial_step: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizedAllocation {
    pub allocations: Vec<f64>,
    pub sharpe_ratio: f64,
    /// Nelder-Mead iterations summed over every run.
    pub iterations: u64,
}

/// Immutable objective context: negative Sharpe ratio (risk-free rate 0,
/// 252 periods per year) of the portfolio a candidate allocation forms.
#[derive(Debug, Clone)]
pub struct SharpeObjective {
    normalized: PriceTable,
}

impl SharpeObjective {
    pub fn new(normalized: PriceTable) -> Self {
        Self { normalized }
    }

    pub fn evaluate(&self, allocations: &[f64]) -> Result<f64, AssessorError> {
        let values = portfolio_values(&self.normalized, allocations);
        let returns = daily_returns(&values)?;
        match sharpe_ratio(&returns, 0.0, TRADING_DAYS_PER_YEAR) {
            Ok(sr) => Ok(-sr),
            // Flat portfolios are scored as Sharpe 0 so the search can step away.
            Err(AssessorError::UndefinedRatio { .. }) => Ok(0.0),
            Err(e) => Err(e),
        }
    }
}

impl CostFunction for SharpeObjective {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        let projected = project_to_simplex(x);
        let distance: f64 = x
            .iter()
            .zip(&projected)
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        Ok(self.evaluate(&projected)? + INFEASIBILITY_PENALTY * distance)
    }
}

/// Best feasible point of one or more chained runs, with its unpenalised cost.
struct Candidate {
    allocations: Vec<f64>,
    cost: f64,
}

/// Find the allocation over `normalized`'s symbols that maximises the Sharpe
/// ratio.
pub fn optimize_allocation(
    normalized: &PriceTable,
    settings: &OptimizerSettings,
) -> Result<OptimizedAllocation, AssessorError> {
    let n = normalized.width();
    if n == 0 {
        return Err(AssessorError::OptimizationFailed {
            reason: "no symbols to allocate".into(),
        });
    }

    let objective = SharpeObjective::new(normalized.clone());

    if n == 1 {
        let allocations = vec![1.0];
        let sharpe_ratio = -objective.evaluate(&allocations)?;
        return Ok(OptimizedAllocation {
            allocations,
            sharpe_ratio,
            iterations: 0,
        });
    }

    let mut starts = vec![vec![1.0 / n as f64; n]];
    starts.extend((0..n).map(|i| {
        let mut corner = vec![0.0; n];
        corner[i] = 1.0;
        corner
    }));

    let mut iterations = 0;
    let mut best: Option<Candidate> = None;
    for start in starts {
        let candidate = search_from(&objective, start, settings, &mut iterations)?;
        if best.as_ref().map_or(true, |b| candidate.cost < b.cost) {
            best = Some(candidate);
        }
    }

    let best = best.ok_or_else(|| AssessorError::OptimizationFailed {
        reason: "solver produced no best allocation".into(),
    })?;
    debug!(
        iterations,
        sharpe = -best.cost,
        allocations = ?best.allocations,
        "allocation search converged"
    );

    Ok(OptimizedAllocation {
        allocations: best.allocations,
        sharpe_ratio: -best.cost,
        iterations,
    })
}

/// Chain Nelder-Mead runs from `start`, each restarted at the previous
/// run's projected best, until a run no longer improves the cost.
fn search_from(
    objective: &SharpeObjective,
    start: Vec<f64>,
    settings: &OptimizerSettings,
    iterations: &mut u64,
) -> Result<Candidate, AssessorError> {
    let mut guess = start;
    let mut best: Option<Candidate> = None;

    for _ in 0..MAX_RESTARTS {
        let candidate = run_nelder_mead(objective, &guess, settings, iterations)?;
        let improvement = best
            .as_ref()
            .map_or(f64::INFINITY, |previous| previous.cost - candidate.cost);
        if improvement > 0.0 {
            guess = candidate.allocations.clone();
            best = Some(candidate);
        }
        if improvement <= RESTART_IMPROVEMENT {
            break;
        }
    }

    best.ok_or_else(|| AssessorError::OptimizationFailed {
        reason: "solver produced no best allocation".into(),
    })
}

fn run_nelder_mead(
    objective: &SharpeObjective,
    guess: &[f64],
    settings: &OptimizerSettings,
    iterations: &mut u64,
) -> Result<Candidate, AssessorError> {
    let solver = NelderMead::new(initial_simplex(guess, settings.initial_step))
        .with_sd_tolerance(settings.sd_tolerance)
        .map_err(|e| AssessorError::OptimizationFailed {
            reason: e.to_string(),
        })?;

    let result = Executor::new(objective.clone(), solver)
        .configure(|state| state.max_iters(settings.max_iters))
        .run()
        .map_err(|e| AssessorError::OptimizationFailed {
            reason: e.to_string(),
        })?;

    let state = &result.state;
    let run_iterations = state.get_iter();
    *iterations += run_iterations;
    match state.get_termination_reason() {
        Some(TerminationReason::SolverConverged) | Some(TerminationReason::TargetCostReached) => {}
        other => {
            warn!(iterations = run_iterations, reason = ?other, "allocation search did not converge");
            return Err(AssessorError::OptimizationFailed {
                reason: match other {
                    Some(reason) => format!("{reason:?} after {run_iterations} iterations"),
                    None => "solver stopped without a termination reason".into(),
                },
            });
        }
    }

    let best = state
        .get_best_param()
        .ok_or_else(|| AssessorError::OptimizationFailed {
            reason: "solver produced no best allocation".into(),
        })?;
    let allocations = project_to_simplex(best);
    let cost = objective.evaluate(&allocations)?;
    if !cost.is_finite() {
        return Err(AssessorError::OptimizationFailed {
            reason: format!("non-finite objective {cost}"),
        });
    }

    Ok(Candidate { allocations, cost })
}

/// Euclidean projection onto the probability simplex.
///
/// Sort-based algorithm of Duchi et al. (2008). The result is non-negative
/// and sums to 1 up to rounding.
pub fn project_to_simplex(x: &[f64]) -> Vec<f64> {
    if x.is_empty() {
        return Vec::new();
    }

    let mut sorted = x.to_vec();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    let mut cumsum = 0.0;
    let mut theta = 0.0;
    for (j, &u) in sorted.iter().enumerate() {
        cumsum += u;
        let t = (cumsum - 1.0) / (j + 1) as f64;
        if u - t > 0.0 {
            theta = t;
        }
    }

    let projected: Vec<f64> = x.iter().map(|&v| (v - theta).max(0.0)).collect();
    let total: f64 = projected.iter().sum();
    if total > 0.0 {
        projected.iter().map(|w| (w / total).min(1.0)).collect()
    } else {
        vec![1.0 / x.len() as f64; x.len()]
    }
}

fn initial_simplex(guess: &[f64], step: f64) -> Vec<Vec<f64>> {
    let mut simplex = Vec::with_capacity(guess.len() + 1);
    simplex.push(guess.to_vec());
    for i in 0..guess.len() {
        let mut vertex = guess.to_vec();
        vertex[i] += step;
        simplex.push(vertex);
    }
    simplex
}
