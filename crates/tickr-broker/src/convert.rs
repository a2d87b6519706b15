use crate::types::Bar;
use anyhow::Result;
use tickr_util::{Cell, Table};

/// Gateway bars in the market-data provider's end-of-day layout, so either source
/// can feed the same downstream code. The gateway has no adjusted series, so
/// `adjusted_close` repeats `close`.
pub fn bars_to_eod(bars: &[Bar]) -> Result<Table> {
    let columns = ["date", "open", "high", "low", "close", "adjusted_close", "volume"];
    let mut table = Table::new(columns.map(String::from).to_vec());
    for bar in bars {
        table.push_row(vec![
            Cell::Text(bar.date.to_string()),
            Cell::Float(bar.open),
            Cell::Float(bar.high),
            Cell::Float(bar.low),
            Cell::Float(bar.close),
            Cell::Float(bar.close),
            Cell::Int(bar.volume),
        ])?;
    }
    Ok(table)
}
