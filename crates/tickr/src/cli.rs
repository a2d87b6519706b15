use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tickr_broker::{Action, SecType, DEFAULT_JUMP_THRESHOLD};
use tickr_eod::{DividendField, Interval, Period};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Sets the level of tracing
    #[arg(long, global = true, default_value = "INFO", ignore_case = true)]
    pub trace: TraceLevel,

    /// API token for the data provider; overrides EOD_API_TOKEN
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Print tables as JSON records instead of aligned text
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct Select {
    /// Comma-separated columns to keep, e.g. `--columns close,volume`
    #[arg(long, value_delimiter = ',')]
    pub columns: Option<Vec<String>>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Every exchange the provider covers.
    Exchanges {
        #[command(flatten)]
        select: Select,
    },

    /// Symbols listed on one exchange.
    Symbols {
        exchange: String,
        #[command(flatten)]
        select: Select,
    },

    /// End-of-day price history.
    Eod {
        symbol: String,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long, default_value = "d")]
        period: Period,
        #[command(flatten)]
        select: Select,
    },

    /// Intraday bars; `--from`/`--to` as RFC 3339 timestamps.
    Intraday {
        symbol: String,
        #[arg(long, default_value = "5m")]
        interval: Interval,
        #[arg(long)]
        from: Option<DateTime<Utc>>,
        #[arg(long)]
        to: Option<DateTime<Utc>>,
        #[command(flatten)]
        select: Select,
    },

    /// Financial news by symbol and/or tag.
    News {
        #[arg(long, short)]
        symbol: Option<String>,
        #[arg(long, short)]
        tag: Option<String>,
        #[arg(long, default_value_t = 0)]
        offset: u32,
        #[arg(long, default_value_t = tickr_eod::schema::news::DEFAULT_NEWS_LIMIT)]
        limit: u32,
        #[command(flatten)]
        select: Select,
    },

    /// A company's fundamentals as one flattened row.
    Fundamentals {
        symbol: String,
        /// Section to narrow to, as a dotted path (e.g. `General`)
        #[arg(long)]
        filter: Option<String>,
        #[command(flatten)]
        select: Select,
    },

    /// A macro-economic indicator for one country (ISO alpha-3).
    Macro {
        country: String,
        indicator: String,
        #[command(flatten)]
        select: Select,
    },

    /// A dividend figure for every ticker of one exchange.
    Dividends {
        #[arg(long)]
        exchange: String,
        #[arg(long, default_value = "yield")]
        field: DividendField,
        #[arg(required = true)]
        tickers: Vec<String>,
    },

    /// Log momentum over the last N trading days.
    Momentum {
        symbol: String,
        #[arg(long, default_value_t = 21)]
        days: usize,
    },

    /// Daily returns of the adjusted close.
    Returns {
        symbol: String,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// Session calls against an in-process paper gateway, run in order within one
    /// session; separate steps with a lone `,`.
    ///
    /// e.g. `tickr paper place BUY AAPL 10 --limit 180 , orders , cancel 1`
    Paper {
        /// Candidate client ids, tried in order until one is free
        #[arg(long, value_delimiter = ',', default_value = "1")]
        client_id: Vec<u32>,
        /// Account to report on; every account when omitted
        #[arg(long)]
        account: Option<String>,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        steps: Vec<String>,
    },
}

/// One step of a paper session, parsed on its own.
#[derive(Parser, Debug)]
#[command(no_binary_name = true)]
struct PaperStep {
    #[command(subcommand)]
    action: PaperAction,
}

/// Split `args` on `,` and parse each chunk as one [`PaperAction`]. A trailing
/// comma on a word also ends the step, so `orders, cancel 1` works too.
pub fn paper_steps(args: &[String]) -> Result<Vec<PaperAction>, clap::Error> {
    let mut chunks: Vec<Vec<&str>> = vec![Vec::new()];
    for arg in args {
        let (word, ends_step) = match arg.strip_suffix(',') {
            Some(word) => (word, true),
            None => (arg.as_str(), false),
        };
        if !word.is_empty() {
            if let Some(chunk) = chunks.last_mut() {
                chunk.push(word);
            }
        }
        if ends_step {
            chunks.push(Vec::new());
        }
    }

    chunks
        .into_iter()
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| PaperStep::try_parse_from(chunk).map(|step| step.action))
        .collect()
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum PaperAction {
    /// Account summary tag/value pairs.
    Summary,
    /// Open positions.
    Positions,
    /// Open orders.
    Orders,
    /// Submit one stock order; a limit order when `--limit` is given.
    Place {
        action: Action,
        symbol: String,
        quantity: f64,
        #[arg(long)]
        limit: Option<f64>,
    },
    /// Cancel an open order by id.
    Cancel { order_id: i64 },
    /// Seed a quote into the paper book.
    Quote {
        symbol: String,
        last: f64,
        high: f64,
        low: f64,
        /// Previous session's close
        close: f64,
    },
    /// Seed one daily bar into the paper book.
    Bar {
        symbol: String,
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        #[arg(default_value_t = 0)]
        volume: i64,
    },
    /// Intraday jump report: range and change against the previous close.
    Jumps {
        #[arg(required = true)]
        symbols: Vec<String>,
        /// Percent range above which a symbol is flagged
        #[arg(long, default_value_t = DEFAULT_JUMP_THRESHOLD)]
        threshold: f64,
    },
    /// Historical bars in the end-of-day table layout.
    History {
        symbol: String,
        #[arg(long, default_value = "1 Y")]
        duration: String,
        #[arg(long, default_value = "1 day")]
        bar_size: String,
    },
    /// Contracts whose symbol starts with SYMBOL.
    Search {
        symbol: String,
        #[arg(long, default_value = "STK")]
        sec_type: SecType,
    },
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum TraceLevel {
    DEBUG,
    INFO,
    WARN,
    ERROR,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn steps_split_on_commas() {
        let steps = paper_steps(&args("place BUY AAPL 10 --limit 180 , orders, cancel 1")).unwrap();
        assert_eq!(
            steps,
            vec![
                PaperAction::Place {
                    action: Action::Buy,
                    symbol: "AAPL".into(),
                    quantity: 10.0,
                    limit: Some(180.0),
                },
                PaperAction::Orders,
                PaperAction::Cancel { order_id: 1 },
            ]
        );
    }

    #[test]
    fn step_defaults_and_errors() {
        let steps = paper_steps(&args("jumps NVDA AAPL , search aa")).unwrap();
        assert_eq!(
            steps[0],
            PaperAction::Jumps {
                symbols: vec!["NVDA".into(), "AAPL".into()],
                threshold: DEFAULT_JUMP_THRESHOLD,
            }
        );
        assert_eq!(
            steps[1],
            PaperAction::Search {
                symbol: "aa".into(),
                sec_type: SecType::Stock,
            }
        );

        assert!(paper_steps(&args("orders , fly")).is_err());
        assert!(paper_steps(&args("cancel")).is_err());
    }

    #[test]
    fn paper_keeps_its_steps_whole() {
        let cli = Cli::try_parse_from(args("tickr paper --client-id 3,4 summary , positions")).unwrap();
        match cli.command {
            Commands::Paper { client_id, steps, .. } => {
                assert_eq!(client_id, [3, 4]);
                assert_eq!(paper_steps(&steps).unwrap().len(), 2);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
