//! Configuration validation.
//!
//! Validates all config fields before any price data is read.

use crate::domain::error::AssessorError;
use crate::domain::universe::{parse_allocations, parse_symbols};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

const ALLOCATION_SUM_TOLERANCE: f64 = 1e-6;

/// Checks shared by `assess` and `optimize`.
pub fn validate_portfolio_config(config: &dyn ConfigPort) -> Result<(), AssessorError> {
    validate_dates(config)?;
    validate_symbols(config)?;
    validate_data_source(config)?;
    Ok(())
}

/// Checks for a fixed-allocation assessment.
pub fn validate_assessment_config(config: &dyn ConfigPort) -> Result<(), AssessorError> {
    validate_portfolio_config(config)?;
    validate_allocations(config)?;
    validate_starting_capital(config)?;
    validate_risk_free_rate(config)?;
    validate_sampling_frequency(config)?;
    Ok(())
}

pub fn validate_optimizer_config(config: &dyn ConfigPort) -> Result<(), AssessorError> {
    validate_portfolio_config(config)?;

    if integer(config, "optimizer", "max_iters", 1)? <= 0 {
        return Err(invalid("optimizer", "max_iters", "max_iters must be positive"));
    }
    if number(config, "optimizer", "sd_tolerance", 1.0)? <= 0.0 {
        return Err(invalid(
            "optimizer",
            "sd_tolerance",
            "sd_tolerance must be positive",
        ));
    }
    let step = number(config, "optimizer", "initial_step", 0.1)?;
    if step <= 0.0 || step > 1.0 {
        return Err(invalid(
            "optimizer",
            "initial_step",
            "initial_step must be in (0, 1]",
        ));
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> AssessorError {
    AssessorError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn missing(section: &str, key: &str) -> AssessorError {
    AssessorError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

/// A present key must hold a finite number; an absent one takes `default`.
fn number(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, AssessorError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(default);
    };
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(_) => Err(invalid(section, key, format!("{key} must be finite, got {raw:?}"))),
        Err(_) => Err(invalid(section, key, format!("{key} is not a number: {raw:?}"))),
    }
}

fn integer(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, AssessorError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(section, key, format!("{key} is not an integer: {raw:?}"))),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), AssessorError> {
    let start_date = parse_date(config.get_string("portfolio", "start_date").as_deref(), "start_date")?;
    let end_date = parse_date(config.get_string("portfolio", "end_date").as_deref(), "end_date")?;

    if start_date > end_date {
        return Err(invalid(
            "portfolio",
            "start_date",
            "start_date must not be after end_date",
        ));
    }
    Ok(())
}

pub(crate) fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, AssessorError> {
    match value {
        None => Err(missing("portfolio", field)),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            invalid(
                "portfolio",
                field,
                format!("invalid {} format, expected YYYY-MM-DD", field),
            )
        }),
    }
}

fn validate_symbols(config: &dyn ConfigPort) -> Result<(), AssessorError> {
    match config.get_string("portfolio", "symbols") {
        Some(s) if !s.trim().is_empty() => parse_symbols(&s)
            .map(|_| ())
            .map_err(|e| invalid("portfolio", "symbols", e.to_string())),
        _ => Err(missing("portfolio", "symbols")),
    }
}

fn validate_data_source(config: &dyn ConfigPort) -> Result<(), AssessorError> {
    let source = config
        .get_string("data", "source")
        .unwrap_or_else(|| "csv".to_string());
    match source.trim().to_lowercase().as_str() {
        "csv" | "sqlite" => {}
        other => {
            return Err(invalid(
                "data",
                "source",
                format!("unknown source {other:?}, expected csv or sqlite"),
            ));
        }
    }
    match config.get_string("data", "path") {
        Some(p) if !p.trim().is_empty() => Ok(()),
        _ => Err(missing("data", "path")),
    }
}

fn validate_allocations(config: &dyn ConfigPort) -> Result<(), AssessorError> {
    let raw = config
        .get_string("portfolio", "allocations")
        .ok_or_else(|| missing("portfolio", "allocations"))?;
    let allocations =
        parse_allocations(&raw).map_err(|e| invalid("portfolio", "allocations", e.to_string()))?;

    let symbol_count = config
        .get_string("portfolio", "symbols")
        .and_then(|s| parse_symbols(&s).ok())
        .map(|s| s.len())
        .unwrap_or(0);
    if allocations.len() != symbol_count {
        return Err(invalid(
            "portfolio",
            "allocations",
            format!(
                "{} allocations for {} symbols",
                allocations.len(),
                symbol_count
            ),
        ));
    }

    if allocations.iter().any(|w| !(0.0..=1.0).contains(w)) {
        return Err(invalid(
            "portfolio",
            "allocations",
            "each allocation must be between 0 and 1",
        ));
    }

    let total: f64 = allocations.iter().sum();
    if (total - 1.0).abs() > ALLOCATION_SUM_TOLERANCE {
        return Err(invalid(
            "portfolio",
            "allocations",
            format!("allocations must sum to 1, got {total}"),
        ));
    }
    Ok(())
}

fn validate_starting_capital(config: &dyn ConfigPort) -> Result<(), AssessorError> {
    if number(config, "portfolio", "starting_capital", 1_000_000.0)? <= 0.0 {
        return Err(invalid(
            "portfolio",
            "starting_capital",
            "starting_capital must be positive",
        ));
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), AssessorError> {
    let value = number(config, "portfolio", "risk_free_rate", 0.0)?;
    if value <= -1.0 || value >= 1.0 {
        return Err(invalid(
            "portfolio",
            "risk_free_rate",
            "risk_free_rate must be between -1 and 1",
        ));
    }
    Ok(())
}

fn validate_sampling_frequency(config: &dyn ConfigPort) -> Result<(), AssessorError> {
    if number(config, "portfolio", "sampling_frequency", 252.0)? <= 0.0 {
        return Err(invalid(
            "portfolio",
            "sampling_frequency",
            "sampling_frequency must be positive",
        ));
    }
    Ok(())
}
