//! Report generation port trait.

use std::path::Path;

use crate::domain::assessment::{Assessment, Optimization};
use crate::domain::error::AssessorError;
use crate::domain::price::ValuePoint;

/// Port for rendering assessment results.
pub trait ReportPort {
    /// `benchmark` is the comparison series (already normalized), if any.
    fn write_assessment(
        &self,
        assessment: &Assessment,
        benchmark: Option<(&str, &[ValuePoint])>,
        output_path: &Path,
    ) -> Result<(), AssessorError>;

    /// Default implementation: the optimized portfolio's own assessment.
    fn write_optimization(
        &self,
        optimization: &Optimization,
        benchmark: Option<(&str, &[ValuePoint])>,
        output_path: &Path,
    ) -> Result<(), AssessorError> {
        self.write_assessment(&optimization.assessment, benchmark, output_path)
    }
}
