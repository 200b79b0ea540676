//! Symbol and allocation list parsing.

use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("invalid allocation {0:?}")]
    InvalidAllocation(String),
}

/// Parse `"goog, AAPL,GLD"` into upper-cased, de-duplicated symbols in input order.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

pub fn parse_allocations(input: &str) -> Result<Vec<f64>, UniverseError> {
    input
        .split(',')
        .map(|token| {
            let trimmed = token.trim();
            if trimmed.is_empty() {
                return Err(UniverseError::EmptyToken);
            }
            trimmed
                .parse::<f64>()
                .map_err(|_| UniverseError::InvalidAllocation(trimmed.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_symbols_basic() {
        let result = parse_symbols("GOOG,AAPL,GLD,XOM").unwrap();
        assert_eq!(result, vec!["GOOG", "AAPL", "GLD", "XOM"]);
    }

    #[test]
    fn parse_symbols_trims_and_uppercases() {
        let result = parse_symbols("  goog , aapl ,GLD").unwrap();
        assert_eq!(result, vec!["GOOG", "AAPL", "GLD"]);
    }

    #[test]
    fn parse_symbols_empty_token() {
        assert_eq!(parse_symbols("GOOG,,XOM"), Err(UniverseError::EmptyToken));
        assert_eq!(parse_symbols(""), Err(UniverseError::EmptyToken));
    }

    #[test]
    fn parse_symbols_duplicate_is_case_insensitive() {
        let result = parse_symbols("GOOG,xom,XOM");
        assert_eq!(result, Err(UniverseError::DuplicateSymbol("XOM".into())));
    }

    #[test]
    fn parse_allocations_basic() {
        let result = parse_allocations("0.2, 0.3,0.4 ,0.1").unwrap();
        assert_eq!(result, vec![0.2, 0.3, 0.4, 0.1]);
    }

    #[test]
    fn parse_allocations_rejects_garbage() {
        assert_eq!(
            parse_allocations("0.5,half"),
            Err(UniverseError::InvalidAllocation("half".into()))
        );
        assert_eq!(parse_allocations("0.5,"), Err(UniverseError::EmptyToken));
    }
}
