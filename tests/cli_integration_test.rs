//! CLI integration tests.
//!
//! Tests cover:
//! - Config loading and request building from INI files on disk
//! - `assess` and `optimize` end to end over a CSV directory, with plot
//! - Exit codes for config, data and ratio failures

mod common;

use portfolio_assessor::cli::{self, Cli, Command};
use portfolio_assessor::domain::error::AssessorError;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tempfile::TempDir;

fn write_prices(dir: &Path, symbol: &str, prices: &[f64]) {
    let start = common::date(2010, 1, 4);
    let mut content = String::from("Date,Adj Close\n");
    for point in common::make_points(start, prices) {
        content.push_str(&format!("{},{}\n", point.date, point.price));
    }
    fs::write(dir.join(format!("{symbol}.csv")), content).unwrap();
}

/// Data directory plus a config file pointing at it.
fn workspace(portfolio: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();

    write_prices(&data, "GOOG", &common::wavy(600.0, 0.001, 0.02, 0.0, 40));
    write_prices(&data, "AAPL", &common::wavy(200.0, 0.002, 0.03, 0.9, 40));
    write_prices(&data, "SPY", &common::wavy(110.0, 0.001, 0.01, 1.7, 40));
    write_prices(&data, "CASH", &[1.0; 40]);

    let config = format!(
        "[data]\nsource = csv\npath = {}\n\n[portfolio]\nstart_date = 2010-01-01\nend_date = 2010-12-31\n{}\n",
        data.display(),
        portfolio
    );
    let config_path = dir.path().join("portfolio.ini");
    fs::write(&config_path, config).unwrap();
    (dir, config_path)
}

fn exit(code: u8) -> String {
    format!("{:?}", ExitCode::from(code))
}

fn outcome(code: ExitCode) -> String {
    format!("{:?}", code)
}

#[test]
fn assess_writes_plot() {
    let (dir, config) = workspace("symbols = GOOG,AAPL\nallocations = 0.6,0.4\nstarting_capital = 1000000");
    let plot = dir.path().join("chart.svg");

    let code = cli::run(Cli {
        command: Command::Assess {
            config,
            plot: Some(plot.clone()),
            symbols: None,
            allocations: None,
        },
    });

    assert_eq!(outcome(code), outcome(ExitCode::SUCCESS));
    let svg = fs::read_to_string(&plot).unwrap();
    assert!(svg.contains("Daily Portfolio Value vs. SPY"));
}

#[test]
fn assess_with_command_line_overrides() {
    let (_dir, config) = workspace("symbols = GOOG,AAPL\nallocations = 0.6,0.4");
    let code = cli::run(Cli {
        command: Command::Assess {
            config,
            plot: None,
            symbols: Some("aapl".into()),
            allocations: Some("1.0".into()),
        },
    });
    assert_eq!(outcome(code), outcome(ExitCode::SUCCESS));
}

#[test]
fn optimize_end_to_end() {
    let (dir, config) = workspace("symbols = GOOG,AAPL\n\n[optimizer]\nmax_iters = 2000");
    let plot = dir.path().join("optimal.svg");
    let code = cli::run(Cli {
        command: Command::Optimize {
            config,
            plot: Some(plot.clone()),
            symbols: None,
        },
    });
    assert_eq!(outcome(code), outcome(ExitCode::SUCCESS));
    assert!(plot.exists());
}

#[test]
fn invalid_allocations_exit_with_config_code() {
    let (dir, config) = workspace("symbols = GOOG,AAPL\nallocations = 0.6,0.6");
    let plot = dir.path().join("chart.svg");
    let code = cli::run(Cli {
        command: Command::Assess {
            config,
            plot: Some(plot.clone()),
            symbols: None,
            allocations: None,
        },
    });
    assert_eq!(outcome(code), exit(2));
    assert!(!plot.exists());
}

#[test]
fn unparseable_capital_exits_with_config_code() {
    for capital in ["nan", "1,000"] {
        let (_dir, config) = workspace(&format!(
            "symbols = GOOG,AAPL\nallocations = 0.6,0.4\nstarting_capital = {capital}"
        ));
        let code = cli::run(Cli {
            command: Command::Assess {
                config,
                plot: None,
                symbols: None,
                allocations: None,
            },
        });
        assert_eq!(outcome(code), exit(2), "starting_capital = {capital}");
    }
}

#[test]
fn missing_symbol_exits_with_data_code() {
    let (_dir, config) = workspace("symbols = GOOG,MSFT\nallocations = 0.5,0.5");
    let code = cli::run(Cli {
        command: Command::Assess {
            config,
            plot: None,
            symbols: None,
            allocations: None,
        },
    });
    assert_eq!(outcome(code), exit(5));
}

#[test]
fn flat_portfolio_exits_with_ratio_code_and_no_plot() {
    let (dir, config) = workspace("symbols = CASH\nallocations = 1.0");
    let plot = dir.path().join("chart.svg");
    let code = cli::run(Cli {
        command: Command::Assess {
            config,
            plot: Some(plot.clone()),
            symbols: None,
            allocations: None,
        },
    });
    assert_eq!(outcome(code), exit(6));
    assert!(!plot.exists());
}

#[test]
fn missing_config_file_exits_with_config_code() {
    let code = cli::run(Cli {
        command: Command::ListSymbols {
            config: PathBuf::from("/nonexistent/portfolio.ini"),
        },
    });
    assert_eq!(outcome(code), exit(2));
}

#[test]
fn list_symbols_and_info_succeed() {
    let (_dir, config) = workspace("symbols = GOOG,AAPL");
    let code = cli::run(Cli {
        command: Command::ListSymbols {
            config: config.clone(),
        },
    });
    assert_eq!(outcome(code), outcome(ExitCode::SUCCESS));

    let code = cli::run(Cli {
        command: Command::Info {
            config,
            symbol: None,
        },
    });
    assert_eq!(outcome(code), outcome(ExitCode::SUCCESS));
}

#[test]
fn request_built_from_disk_config() {
    let (_dir, config) = workspace(
        "symbols = GOOG,AAPL\nallocations = 0.6,0.4\nstarting_capital = 250000\nrisk_free_rate = 0.02",
    );
    let adapter = cli::load_config(&config).unwrap();
    let request = cli::build_assessment_request(&adapter).unwrap();
    assert_eq!(request.symbols, vec!["GOOG", "AAPL"]);
    assert_eq!(request.allocations, vec![0.6, 0.4]);
    assert_eq!(request.starting_capital, 250_000.0);
    assert_eq!(request.risk_free_rate, 0.02);
    assert_eq!(request.sampling_frequency, 252.0);
}

#[test]
fn missing_data_path_is_config_missing() {
    let adapter = portfolio_assessor::adapters::file_config_adapter::FileConfigAdapter::from_string(
        "[data]\nsource = csv\n",
    )
    .unwrap();
    match cli::open_price_store(&adapter) {
        Err(AssessorError::ConfigMissing { key, .. }) => assert_eq!(key, "path"),
        Err(other) => panic!("expected ConfigMissing, got {other}"),
        Ok(_) => panic!("expected error"),
    }
}
