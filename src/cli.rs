//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::svg_report::SvgReportAdapter;
use crate::domain::assessment::{
    assess_portfolio, optimize_portfolio, Assessment, AssessmentRequest, Optimization,
};
use crate::domain::config_validation::{
    parse_date, validate_assessment_config, validate_optimizer_config,
};
use crate::domain::error::AssessorError;
use crate::domain::loader::load_benchmark;
use crate::domain::optimizer::OptimizerSettings;
use crate::domain::price::ValuePoint;
use crate::domain::stats::TRADING_DAYS_PER_YEAR;
use crate::domain::universe::{parse_allocations, parse_symbols};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PricePort;
use crate::ports::report_port::ReportPort;

const DEFAULT_BENCHMARK: &str = "SPY";

#[derive(Parser, Debug)]
#[command(
    name = "portfolio-assessor",
    about = "Assess and optimize long-only stock portfolios"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute statistics for a fixed allocation
    Assess {
        #[arg(short, long)]
        config: PathBuf,
        /// Write a chart of portfolio value against the benchmark
        #[arg(short, long)]
        plot: Option<PathBuf>,
        /// Comma-separated symbols, overriding [portfolio] symbols
        #[arg(long)]
        symbols: Option<String>,
        /// Comma-separated allocations, overriding [portfolio] allocations
        #[arg(long)]
        allocations: Option<String>,
    },
    /// Find the allocation with the highest Sharpe ratio
    Optimize {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        plot: Option<PathBuf>,
        #[arg(long)]
        symbols: Option<String>,
    },
    /// List symbols available in the price store
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show data range for symbol(s)
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Assess {
            config,
            plot,
            symbols,
            allocations,
        } => run_assess(&config, plot.as_deref(), symbols, allocations),
        Command::Optimize {
            config,
            plot,
            symbols,
        } => run_optimize(&config, plot.as_deref(), symbols),
        Command::ListSymbols { config } => run_list_symbols(&config),
        Command::Info { config, symbol } => run_info(&config, symbol),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Config view with command-line values layered over `[portfolio]` keys.
pub struct OverrideConfig<'a> {
    base: &'a dyn ConfigPort,
    symbols: Option<String>,
    allocations: Option<String>,
}

impl<'a> OverrideConfig<'a> {
    pub fn new(
        base: &'a dyn ConfigPort,
        symbols: Option<String>,
        allocations: Option<String>,
    ) -> Self {
        Self {
            base,
            symbols,
            allocations,
        }
    }
}

impl ConfigPort for OverrideConfig<'_> {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        match (section, key) {
            ("portfolio", "symbols") if self.symbols.is_some() => self.symbols.clone(),
            ("portfolio", "allocations") if self.allocations.is_some() => {
                self.allocations.clone()
            }
            _ => self.base.get_string(section, key),
        }
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.base.get_int(section, key, default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.base.get_double(section, key, default)
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, AssessorError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

/// Build an [`AssessmentRequest`] from a config that already passed
/// [`validate_assessment_config`].
pub fn build_assessment_request(
    config: &dyn ConfigPort,
) -> Result<AssessmentRequest, AssessorError> {
    let (start_date, end_date) = read_window(config)?;
    let symbols = read_symbols(config)?;

    let raw = config
        .get_string("portfolio", "allocations")
        .ok_or_else(|| AssessorError::ConfigMissing {
            section: "portfolio".into(),
            key: "allocations".into(),
        })?;
    let allocations = parse_allocations(&raw).map_err(|e| AssessorError::ConfigInvalid {
        section: "portfolio".into(),
        key: "allocations".into(),
        reason: e.to_string(),
    })?;

    Ok(AssessmentRequest {
        start_date,
        end_date,
        symbols,
        allocations,
        starting_capital: config.get_double("portfolio", "starting_capital", 1_000_000.0),
        risk_free_rate: config.get_double("portfolio", "risk_free_rate", 0.0),
        sampling_frequency: config.get_double(
            "portfolio",
            "sampling_frequency",
            TRADING_DAYS_PER_YEAR,
        ),
    })
}

pub fn build_optimizer_settings(config: &dyn ConfigPort) -> OptimizerSettings {
    let defaults = OptimizerSettings::default();
    OptimizerSettings {
        max_iters: config
            .get_int("optimizer", "max_iters", defaults.max_iters as i64)
            .max(1) as u64,
        sd_tolerance: config.get_double("optimizer", "sd_tolerance", defaults.sd_tolerance),
        initial_step: config.get_double("optimizer", "initial_step", defaults.initial_step),
    }
}

/// Open the price store named by `[data] source`.
pub fn open_price_store(config: &dyn ConfigPort) -> Result<Box<dyn PricePort>, AssessorError> {
    let source = config
        .get_string("data", "source")
        .unwrap_or_else(|| "csv".to_string())
        .trim()
        .to_lowercase();
    let path = config
        .get_string("data", "path")
        .ok_or_else(|| AssessorError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })?;

    match source.as_str() {
        "csv" => Ok(Box::new(CsvAdapter::new(PathBuf::from(path)))),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            use crate::adapters::sqlite_adapter::SqliteAdapter;
            Ok(Box::new(SqliteAdapter::from_config(config)?))
        }
        #[cfg(not(feature = "sqlite"))]
        "sqlite" => Err(AssessorError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: "sqlite feature is required for source = sqlite".into(),
        }),
        other => Err(AssessorError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: format!("unknown source {other:?}, expected csv or sqlite"),
        }),
    }
}

/// The printed summary of an assessment.
pub fn format_assessment(assessment: &Assessment) -> String {
    let request = &assessment.request;
    let stats = &assessment.stats;
    let mut out = String::new();
    out.push_str(&format!("Start Date: {}\n", request.start_date));
    out.push_str(&format!("End Date: {}\n", request.end_date));
    out.push_str(&format!("Symbols: {}\n", request.symbols.join(", ")));
    out.push_str(&format!(
        "Allocations: {}\n",
        format_allocations(&request.allocations)
    ));
    out.push_str(&format_statistics(assessment));
    out.push_str(&format!(
        "Starting Portfolio Value: {}\n",
        request.starting_capital
    ));
    out.push_str(&format!("Ending Portfolio Value: {}\n", stats.ending_value));
    out
}

/// The printed summary of an optimization.
pub fn format_optimization(optimization: &Optimization) -> String {
    let request = &optimization.assessment.request;
    let mut out = String::new();
    out.push_str(&format!("Start Date: {}\n", request.start_date));
    out.push_str(&format!("End Date: {}\n", request.end_date));
    out.push_str(&format!("Symbols: {}\n", request.symbols.join(", ")));
    out.push_str(&format!(
        "Optimal Allocations: {}\n",
        format_allocations(&optimization.allocations)
    ));
    out.push_str(&format_statistics(&optimization.assessment));
    out
}

fn format_statistics(assessment: &Assessment) -> String {
    let stats = &assessment.stats;
    format!(
        "Sharpe Ratio: {}\n\
         Volatility (stdev of daily returns): {}\n\
         Average Daily Return: {}\n\
         Cumulative Return: {}\n",
        stats.sharpe_ratio,
        stats.daily_return_stddev,
        stats.average_daily_return,
        stats.cumulative_return
    )
}

fn format_allocations(allocations: &[f64]) -> String {
    allocations
        .iter()
        .map(|w| format!("{w:.4}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn run_assess(
    config_path: &Path,
    plot: Option<&Path>,
    symbols: Option<String>,
    allocations: Option<String>,
) -> Result<(), AssessorError> {
    let file_config = load_config(config_path)?;
    let config = OverrideConfig::new(&file_config, symbols, allocations);
    validate_assessment_config(&config)?;

    let request = build_assessment_request(&config)?;
    let store = open_price_store(&config)?;
    let assessment = assess_portfolio(store.as_ref(), &request)?;

    print!("{}", format_assessment(&assessment));

    if let Some(path) = plot {
        let benchmark = benchmark_series(&config, store.as_ref(), &request)?;
        let benchmark_ref = benchmark
            .as_ref()
            .map(|(symbol, points)| (symbol.as_str(), points.as_slice()));
        SvgReportAdapter::new().write_assessment(&assessment, benchmark_ref, path)?;
        eprintln!("Chart written to: {}", path.display());
    }
    Ok(())
}

fn run_optimize(
    config_path: &Path,
    plot: Option<&Path>,
    symbols: Option<String>,
) -> Result<(), AssessorError> {
    let file_config = load_config(config_path)?;
    let config = OverrideConfig::new(&file_config, symbols, None);
    validate_optimizer_config(&config)?;

    let (start_date, end_date) = read_window(&config)?;
    let symbols = read_symbols(&config)?;
    let settings = build_optimizer_settings(&config);
    let store = open_price_store(&config)?;

    let optimization =
        optimize_portfolio(store.as_ref(), start_date, end_date, &symbols, &settings)?;
    info!(iterations = optimization.iterations, "optimization finished");

    print!("{}", format_optimization(&optimization));

    if let Some(path) = plot {
        let benchmark = benchmark_series(&config, store.as_ref(), &optimization.assessment.request)?;
        let benchmark_ref = benchmark
            .as_ref()
            .map(|(symbol, points)| (symbol.as_str(), points.as_slice()));
        SvgReportAdapter::new().write_optimization(&optimization, benchmark_ref, path)?;
        eprintln!("Chart written to: {}", path.display());
    }
    Ok(())
}

/// Benchmark series for the plot. A benchmark with no data over the window
/// is logged and left off the chart.
fn benchmark_series(
    config: &dyn ConfigPort,
    store: &dyn PricePort,
    request: &AssessmentRequest,
) -> Result<Option<(String, Vec<ValuePoint>)>, AssessorError> {
    let symbol = config
        .get_string("report", "benchmark")
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_BENCHMARK.to_string());

    match load_benchmark(store, &symbol, request.start_date, request.end_date) {
        Ok(points) => Ok(Some((symbol, points))),
        Err(AssessorError::DataUnavailable { reason, .. }) => {
            warn!(%symbol, %reason, "benchmark unavailable, plotting portfolio only");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn run_list_symbols(config_path: &Path) -> Result<(), AssessorError> {
    let config = load_config(config_path)?;
    let store = open_price_store(&config)?;
    let symbols = store.list_symbols()?;

    if symbols.is_empty() {
        eprintln!("No symbols found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(())
}

fn run_info(config_path: &Path, symbol: Option<String>) -> Result<(), AssessorError> {
    let config = load_config(config_path)?;
    let store = open_price_store(&config)?;

    let symbols = match symbol {
        Some(s) => vec![s.trim().to_uppercase()],
        None => read_symbols(&config)?,
    };

    for s in &symbols {
        match store.get_data_range(s) {
            Ok(Some((min_date, max_date, count))) => {
                println!("{}: {} prices, {} to {}", s, count, min_date, max_date);
            }
            Ok(None) => eprintln!("{}: no data found", s),
            Err(e) => eprintln!("error querying {}: {}", s, e),
        }
    }
    Ok(())
}

fn read_window(
    config: &dyn ConfigPort,
) -> Result<(chrono::NaiveDate, chrono::NaiveDate), AssessorError> {
    let start_date = parse_date(
        config.get_string("portfolio", "start_date").as_deref(),
        "start_date",
    )?;
    let end_date = parse_date(
        config.get_string("portfolio", "end_date").as_deref(),
        "end_date",
    )?;
    Ok((start_date, end_date))
}

fn read_symbols(config: &dyn ConfigPort) -> Result<Vec<String>, AssessorError> {
    let raw = config
        .get_string("portfolio", "symbols")
        .ok_or_else(|| AssessorError::ConfigMissing {
            section: "portfolio".into(),
            key: "symbols".into(),
        })?;
    parse_symbols(&raw).map_err(|e| AssessorError::ConfigInvalid {
        section: "portfolio".into(),
        key: "symbols".into(),
        reason: e.to_string(),
    })
}
