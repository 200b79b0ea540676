//! SQLite price store.
//!
//! Schema: `prices(symbol, date, adj_close)` keyed by `(symbol, date)`, dates
//! stored as `YYYY-MM-DD` text so lexical order is chronological.

use crate::domain::error::AssessorError;
use crate::domain::price::PricePoint;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PricePort;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn query_error(e: rusqlite::Error) -> AssessorError {
    AssessorError::price_store(e)
}

fn parse_date(value: &str) -> Result<NaiveDate, AssessorError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| AssessorError::price_store(format!("invalid date {:?}: {}", value, e)))
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, AssessorError> {
        let db_path = config
            .get_string("data", "path")
            .ok_or_else(|| AssessorError::ConfigMissing {
                section: "data".into(),
                key: "path".into(),
            })?;

        let pool_size = config.get_int("data", "pool_size", 4).max(1) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(AssessorError::price_store)?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, AssessorError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(AssessorError::price_store)?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, AssessorError> {
        self.pool.get().map_err(AssessorError::price_store)
    }

    pub fn initialize_schema(&self) -> Result<(), AssessorError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS prices (
                    symbol TEXT NOT NULL,
                    date TEXT NOT NULL,
                    adj_close REAL,
                    PRIMARY KEY (symbol, date)
                );
                CREATE INDEX IF NOT EXISTS idx_prices_date ON prices(date);",
            )
            .map_err(query_error)
    }

    /// Upsert prices for one symbol. `None` records a day with no price.
    pub fn insert_prices(
        &self,
        symbol: &str,
        prices: &[(NaiveDate, Option<f64>)],
    ) -> Result<(), AssessorError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_error)?;

        for (date, price) in prices {
            tx.execute(
                "INSERT OR REPLACE INTO prices (symbol, date, adj_close) VALUES (?1, ?2, ?3)",
                params![symbol, date.format("%Y-%m-%d").to_string(), price],
            )
            .map_err(query_error)?;
        }

        tx.commit().map_err(query_error)
    }

    fn has_symbol(&self, symbol: &str) -> Result<bool, AssessorError> {
        let count: i64 = self
            .conn()?
            .query_row(
                "SELECT COUNT(*) FROM prices WHERE symbol = ?1",
                params![symbol],
                |row| row.get(0),
            )
            .map_err(query_error)?;
        Ok(count > 0)
    }
}

impl PricePort for SqliteAdapter {
    fn fetch_adjusted_close(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, AssessorError> {
        if !self.has_symbol(symbol)? {
            return Err(AssessorError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "symbol not present in prices table".into(),
            });
        }

        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT date, adj_close FROM prices
                 WHERE symbol = ?1 AND date >= ?2 AND date <= ?3 AND adj_close IS NOT NULL
                 ORDER BY date ASC",
            )
            .map_err(query_error)?;

        let rows = stmt
            .query_map(
                params![
                    symbol,
                    start_date.format("%Y-%m-%d").to_string(),
                    end_date.format("%Y-%m-%d").to_string()
                ],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)),
            )
            .map_err(query_error)?;

        let mut points = Vec::new();
        for row in rows {
            let (date_str, price) = row.map_err(query_error)?;
            points.push(PricePoint {
                date: parse_date(&date_str)?,
                price,
            });
        }

        Ok(points)
    }

    fn list_symbols(&self) -> Result<Vec<String>, AssessorError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT symbol FROM prices ORDER BY symbol")
            .map_err(query_error)?;

        let rows = stmt
            .query_map([], |row| row.get(0))
            .map_err(query_error)?;

        let mut symbols = Vec::new();
        for row in rows {
            symbols.push(row.map_err(query_error)?);
        }

        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, AssessorError> {
        let result: (Option<String>, Option<String>, i64) = self
            .conn()?
            .query_row(
                "SELECT MIN(date), MAX(date), COUNT(*) FROM prices
                 WHERE symbol = ?1 AND adj_close IS NOT NULL",
                params![symbol],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(query_error)?;

        match result {
            (Some(min_str), Some(max_str), count) if count > 0 => Ok(Some((
                parse_date(&min_str)?,
                parse_date(&max_str)?,
                count as usize,
            ))),
            _ => Ok(None),
        }
    }
}
