//! Domain error types.

/// Top-level error type for portfolio-assessor.
#[derive(Debug, thiserror::Error)]
pub enum AssessorError {
    #[error("no data for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("dimension mismatch: expected {expected} allocations, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("sharpe ratio undefined: {reason}")]
    UndefinedRatio { reason: String },

    #[error("optimization failed: {reason}")]
    OptimizationFailed { reason: String },

    #[error("price store error: {reason}")]
    PriceStore { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AssessorError {
    pub(crate) fn division_by_zero(context: impl Into<String>) -> Self {
        AssessorError::DivisionByZero {
            context: context.into(),
        }
    }

    pub(crate) fn price_store(reason: impl std::fmt::Display) -> Self {
        AssessorError::PriceStore {
            reason: reason.to_string(),
        }
    }
}

impl From<&AssessorError> for std::process::ExitCode {
    fn from(err: &AssessorError) -> Self {
        let code: u8 = match err {
            AssessorError::Io(_) | AssessorError::Report { .. } => 1,
            AssessorError::ConfigParse { .. }
            | AssessorError::ConfigMissing { .. }
            | AssessorError::ConfigInvalid { .. }
            | AssessorError::DimensionMismatch { .. } => 2,
            AssessorError::PriceStore { .. } => 3,
            AssessorError::DataUnavailable { .. } => 5,
            AssessorError::DivisionByZero { .. } | AssessorError::UndefinedRatio { .. } => 6,
            AssessorError::OptimizationFailed { .. } => 7,
        };
        std::process::ExitCode::from(code)
    }
}
