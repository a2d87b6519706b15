use super::payload::Shape;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Sampling period of end-of-day history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Period {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Daily => "d",
            Period::Weekly => "w",
            Period::Monthly => "m",
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "d" | "daily" => Ok(Period::Daily),
            "w" | "weekly" => Ok(Period::Weekly),
            "m" | "monthly" => Ok(Period::Monthly),
            other => Err(format!("unknown period \"{other}\"; expected d, w or m")),
        }
    }
}

/// Bar size of intraday history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Interval {
    OneMinute,
    #[default]
    FiveMinutes,
    OneHour,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::FiveMinutes => "5m",
            Interval::OneHour => "1h",
        }
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "1m" => Ok(Interval::OneMinute),
            "5m" => Ok(Interval::FiveMinutes),
            "1h" => Ok(Interval::OneHour),
            other => Err(format!("unknown interval \"{other}\"; expected 1m, 5m or 1h")),
        }
    }
}

/// The dividend figures read straight out of a company's fundamentals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DividendField {
    #[default]
    Yield,
    Share,
}

impl DividendField {
    /// Fundamentals filter selecting the field.
    pub fn filter(&self) -> &'static str {
        match self {
            DividendField::Yield => "Highlights::DividendYield",
            DividendField::Share => "Highlights::DividendShare",
        }
    }

    /// Column name used in normalized tables.
    pub fn column(&self) -> &'static str {
        match self {
            DividendField::Yield => "dividend_yield",
            DividendField::Share => "dividend_share",
        }
    }
}

impl FromStr for DividendField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yield" | "dividend_yield" => Ok(DividendField::Yield),
            "share" | "dividend_share" => Ok(DividendField::Share),
            other => Err(format!("unknown dividend field \"{other}\"; expected yield or share")),
        }
    }
}

/// Every kind of resource the provider is queried for, with its identifying parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    ExchangesList,
    SymbolList {
        exchange: String,
    },
    Eod {
        symbol: String,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        period: Period,
    },
    Intraday {
        symbol: String,
        interval: Interval,
        /// Unix seconds.
        from: Option<i64>,
        to: Option<i64>,
    },
    News {
        symbol: Option<String>,
        tag: Option<String>,
        offset: u32,
        limit: u32,
    },
    Fundamentals {
        symbol: String,
        /// Dotted path into the fundamentals document, e.g. `General` or `Highlights`.
        filter: Option<String>,
    },
    MacroIndicator {
        country: String,
        indicator: String,
    },
    DividendField {
        symbol: String,
        field: DividendField,
    },
}

impl Resource {
    /// The payload shape the endpoint answers with.
    pub fn shape(&self) -> Shape {
        match self {
            Resource::Fundamentals { filter: None, .. } => Shape::Record,
            Resource::Fundamentals { filter: Some(_), .. } => Shape::RecordOrScalar,
            Resource::DividendField { .. } => Shape::Scalar,
            _ => Shape::Records,
        }
    }

    /// Column that always leads a projected table.
    pub fn key(&self) -> Option<&'static str> {
        match self {
            Resource::ExchangesList | Resource::SymbolList { .. } => Some("Code"),
            Resource::Eod { .. } | Resource::News { .. } => Some("date"),
            Resource::Intraday { .. } => Some("datetime"),
            Resource::MacroIndicator { .. } => Some("Date"),
            Resource::Fundamentals { .. } | Resource::DividendField { .. } => None,
        }
    }

    /// Column holding a scalar answer; a filtered fundamentals field is named by
    /// its dotted path.
    pub fn value_column(&self) -> String {
        match self {
            Resource::DividendField { field, .. } => field.column().to_string(),
            Resource::Fundamentals {
                filter: Some(filter),
                ..
            } => dotted_filter(filter),
            _ => "value".to_string(),
        }
    }

    /// Path segments below the base URL; an empty final segment keeps a trailing slash.
    pub fn segments(&self) -> Vec<String> {
        match self {
            Resource::ExchangesList => vec!["exchanges-list".into(), String::new()],
            Resource::SymbolList { exchange } => {
                vec!["exchange-symbol-list".into(), exchange.to_uppercase()]
            }
            Resource::Eod { symbol, .. } => vec!["eod".into(), symbol.to_uppercase()],
            Resource::Intraday { symbol, .. } => vec!["intraday".into(), symbol.to_uppercase()],
            Resource::News { .. } => vec!["news".into()],
            Resource::Fundamentals { symbol, .. } | Resource::DividendField { symbol, .. } => {
                vec!["fundamentals".into(), symbol.to_uppercase()]
            }
            Resource::MacroIndicator { country, .. } => {
                vec!["macro-indicator".into(), country.to_uppercase()]
            }
        }
    }

    /// Query parameters, excluding the token and format.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        match self {
            Resource::ExchangesList | Resource::SymbolList { .. } => {}
            Resource::Eod {
                from, to, period, ..
            } => {
                if let Some(from) = from {
                    params.push(("from", from.to_string()));
                }
                if let Some(to) = to {
                    params.push(("to", to.to_string()));
                }
                params.push(("period", period.as_str().to_string()));
            }
            Resource::Intraday {
                interval, from, to, ..
            } => {
                params.push(("interval", interval.as_str().to_string()));
                if let Some(from) = from {
                    params.push(("from", from.to_string()));
                }
                if let Some(to) = to {
                    params.push(("to", to.to_string()));
                }
            }
            Resource::News {
                symbol,
                tag,
                offset,
                limit,
            } => {
                if let Some(symbol) = symbol {
                    params.push(("s", symbol.to_uppercase()));
                }
                if let Some(tag) = tag {
                    params.push(("t", tag.clone()));
                }
                params.push(("offset", offset.to_string()));
                params.push(("limit", limit.to_string()));
            }
            Resource::Fundamentals { filter, .. } => {
                if let Some(filter) = filter {
                    params.push(("filter", provider_filter(filter)));
                }
            }
            Resource::MacroIndicator { indicator, .. } => {
                params.push(("indicator", indicator.clone()));
            }
            Resource::DividendField { field, .. } => {
                params.push(("filter", field.filter().to_string()));
            }
        }
        params
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::ExchangesList => write!(f, "exchanges list"),
            Resource::SymbolList { exchange } => write!(f, "symbol list [{exchange}]"),
            Resource::Eod { symbol, .. } => write!(f, "end-of-day prices [{symbol}]"),
            Resource::Intraday { symbol, .. } => write!(f, "intraday prices [{symbol}]"),
            Resource::News { symbol, tag, .. } => write!(
                f,
                "news [{}]",
                symbol.as_deref().or(tag.as_deref()).unwrap_or("-")
            ),
            Resource::Fundamentals { symbol, .. } => write!(f, "fundamentals [{symbol}]"),
            Resource::MacroIndicator { country, indicator } => {
                write!(f, "macro indicator [{country}] {indicator}")
            }
            Resource::DividendField { symbol, field } => {
                write!(f, "{} [{symbol}]", field.column())
            }
        }
    }
}

/// The provider separates fundamentals path segments with `::`.
fn provider_filter(dotted: &str) -> String {
    dotted
        .split(['.', ':'])
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("::")
}

fn dotted_filter(filter: &str) -> String {
    filter
        .split(['.', ':'])
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

/// One fetch: what to get, which columns to keep, and an optional token
/// overriding the configured one. Built once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRequest {
    resource: Resource,
    columns: Option<Vec<String>>,
    token: Option<String>,
}

impl ResourceRequest {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            columns: None,
            token: None,
        }
    }

    /// Keep only these columns (plus the resource's leading key column).
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn maybe_columns(mut self, columns: Option<Vec<String>>) -> Self {
        self.columns = columns;
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn selected_columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    pub fn token_override(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl From<Resource> for ResourceRequest {
    fn from(resource: Resource) -> Self {
        Self::new(resource)
    }
}
