use crate::api::Eod;
use crate::schema::request::Period;
use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use tickr_util::{Cell, Fetch, Table};
use tracing::{debug, warn};

/// The outcome of a best-effort computation: a value, or an explicit marker that
/// none could be produced (too little history, a failed fetch, bad prices).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BestEffort<T> {
    Value(T),
    Unavailable,
}

impl<T> BestEffort<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, BestEffort::Value(_))
    }

    pub fn value(self) -> Option<T> {
        match self {
            BestEffort::Value(v) => Some(v),
            BestEffort::Unavailable => None,
        }
    }
}

impl<T> From<Option<T>> for BestEffort<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => BestEffort::Value(v),
            None => BestEffort::Unavailable,
        }
    }
}

/// `ln(latest / close_days_before_latest)` over ascending closes.
///
/// Needs at least `days + 1` closes; every price used must be positive and finite.
pub fn log_momentum(closes: &[f64], days: usize) -> BestEffort<f64> {
    if closes.len() <= days {
        return BestEffort::Unavailable;
    }
    let latest = closes[closes.len() - 1];
    let earlier = closes[closes.len() - 1 - days];
    if !(latest.is_finite() && earlier.is_finite()) || latest <= 0.0 || earlier <= 0.0 {
        return BestEffort::Unavailable;
    }
    BestEffort::Value((latest / earlier).ln())
}

/// Period-over-period simple returns, `p[t] / p[t-1] - 1`; `None` where the base
/// price is not positive.
pub fn daily_returns(closes: &[f64]) -> Vec<Option<f64>> {
    closes
        .windows(2)
        .map(|w| (w[0] > 0.0 && w[0].is_finite()).then(|| w[1] / w[0] - 1.0))
        .collect()
}

/// Closes of `column` in table order; `None` if the column is missing or any cell
/// is not numeric.
pub fn numeric_column(table: &Table, column: &str) -> Option<Vec<f64>> {
    table
        .column(column)?
        .into_iter()
        .map(|cell| cell.as_f64())
        .collect()
}

/// `date, return` rows from an end-of-day table sorted by date; the first date
/// has no return and is left out.
pub fn returns_table(table: &Table, column: &str) -> Result<Table> {
    let closes = numeric_column(table, column)
        .with_context(|| format!("column \"{column}\" is missing or not numeric"))?;
    let dates = table.column("date").context("table has no date column")?;

    let mut out = Table::new(vec!["date".to_string(), "return".to_string()]);
    for (date, ret) in dates.into_iter().skip(1).zip(daily_returns(&closes)) {
        out.push_row(vec![date.clone(), ret.map(Cell::Float).unwrap_or(Cell::Null)])?;
    }
    Ok(out)
}

impl<C> Eod<C>
where
    C: Fetch + Sync,
{
    /// Log momentum of `symbol` over `days` trading days, from one year of daily
    /// adjusted closes ending `today`. Never fails: anything that goes wrong is
    /// logged and reported as [`BestEffort::Unavailable`].
    pub async fn momentum(&self, symbol: &str, days: usize, today: NaiveDate) -> BestEffort<f64> {
        let from = today.checked_sub_days(Days::new(365));
        let columns = Some(vec!["adjusted_close".to_string()]);

        let mut table = match self.eod(symbol, from, Some(today), Period::Daily, columns).await {
            Ok(table) => table,
            Err(e) => {
                warn!("[{symbol}] momentum unavailable, fetch failed: {e}");
                return BestEffort::Unavailable;
            }
        };
        table.sort_by_column("date");

        let Some(closes) = numeric_column(&table, "adjusted_close") else {
            warn!("[{symbol}] momentum unavailable, non-numeric adjusted closes");
            return BestEffort::Unavailable;
        };

        let momentum = log_momentum(&closes, days);
        match momentum {
            BestEffort::Value(m) => debug!("[{symbol}] {days}-day momentum: {m:.6}"),
            BestEffort::Unavailable => warn!(
                "[{symbol}] momentum unavailable, {} closes for a {days}-day lookback",
                closes.len()
            ),
        }
        momentum
    }
}
