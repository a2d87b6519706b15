use crate::types::Snapshot;
use anyhow::Result;
use serde::Serialize;
use std::fmt;
use tickr_util::{Cell, Table};

pub const DEFAULT_JUMP_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JumpStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "ALERT")]
    Alert,
    #[serde(rename = "NO DATA")]
    NoData,
}

impl fmt::Display for JumpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JumpStatus::Ok => "OK",
            JumpStatus::Alert => "ALERT",
            JumpStatus::NoData => "NO DATA",
        })
    }
}

/// How far a symbol has moved today, read off one quote snapshot.
///
/// `jump_pct` is the session range `(high - low) / low`, `change_pct` the move of
/// `last` against the previous `close`; both in percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntradayJump {
    pub symbol: String,
    pub jump_pct: f64,
    pub change_pct: f64,
    pub threshold: f64,
    pub status: JumpStatus,
}

impl IntradayJump {
    pub fn from_snapshot(snapshot: &Snapshot, threshold: f64) -> Self {
        let Snapshot {
            high, low, last, close, ..
        } = *snapshot;

        if [high, low, last, close].iter().any(|p| !(p.is_finite() && *p > 0.0)) {
            return Self {
                symbol: snapshot.symbol.clone(),
                jump_pct: 0.0,
                change_pct: 0.0,
                threshold,
                status: JumpStatus::NoData,
            };
        }

        let jump_pct = (high - low) / low * 100.0;
        let change_pct = (last - close) / close * 100.0;
        let status = if jump_pct > threshold {
            JumpStatus::Alert
        } else {
            JumpStatus::Ok
        };

        Self {
            symbol: snapshot.symbol.clone(),
            jump_pct,
            change_pct,
            threshold,
            status,
        }
    }
}

impl fmt::Display for IntradayJump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<8} {:>8.2} {:>8.2} {}",
            self.symbol, self.jump_pct, self.change_pct, self.status
        )
    }
}

/// One `symbol, jump_pct, change_pct, status` row per jump, in the given order.
pub fn jump_table(jumps: &[IntradayJump]) -> Result<Table> {
    let columns = ["symbol", "jump_pct", "change_pct", "status"];
    let mut table = Table::new(columns.map(String::from).to_vec());
    for jump in jumps {
        table.push_row(vec![
            Cell::Text(jump.symbol.clone()),
            Cell::Float(jump.jump_pct),
            Cell::Float(jump.change_pct),
            Cell::Text(jump.status.to_string()),
        ])?;
    }
    Ok(table)
}
