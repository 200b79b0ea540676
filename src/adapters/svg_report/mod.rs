//! SVG chart report: normalized portfolio value against a benchmark.

pub mod chart_svg;

use std::fs;
use std::path::Path;

use tracing::info;

use crate::domain::assessment::Assessment;
use crate::domain::error::AssessorError;
use crate::domain::normalize::normalize_series;
use crate::domain::price::ValuePoint;
use crate::ports::report_port::ReportPort;

use chart_svg::{generate_comparison_svg, Series};

#[derive(Debug, Default)]
pub struct SvgReportAdapter;

impl SvgReportAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Render the chart for `assessment` without writing it anywhere.
    pub fn render(
        &self,
        assessment: &Assessment,
        benchmark: Option<(&str, &[ValuePoint])>,
    ) -> Result<String, AssessorError> {
        let portfolio = normalize_series(&assessment.portfolio)?;

        let title = match benchmark {
            Some((symbol, _)) => format!("Daily Portfolio Value vs. {symbol}"),
            None => "Daily Portfolio Value".to_string(),
        };

        let mut series = vec![Series::portfolio(&portfolio)];
        if let Some((symbol, points)) = benchmark {
            series.push(Series::benchmark(symbol, points));
        }

        let svg = generate_comparison_svg(&title, &series);
        if svg.is_empty() {
            return Err(AssessorError::Report {
                reason: "no portfolio values to plot".into(),
            });
        }
        Ok(svg)
    }
}

impl ReportPort for SvgReportAdapter {
    fn write_assessment(
        &self,
        assessment: &Assessment,
        benchmark: Option<(&str, &[ValuePoint])>,
        output_path: &Path,
    ) -> Result<(), AssessorError> {
        let svg = self.render(assessment, benchmark)?;
        fs::write(output_path, svg).map_err(|e| AssessorError::Report {
            reason: format!("failed to write {}: {}", output_path.display(), e),
        })?;
        info!(path = %output_path.display(), "chart written");
        Ok(())
    }
}
