use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Connection
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Where a gateway listens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub const TWS_PAPER: u16 = 7497;
    pub const TWS_LIVE: u16 = 7496;
    pub const GATEWAY_PAPER: u16 = 4002;
    pub const GATEWAY_LIVE: u16 = 4001;

    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn local(port: u16) -> Self {
        Self::new(DEFAULT_HOST, port)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::local(Self::TWS_PAPER)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// A caller-chosen session identifier; unique among simultaneously open sessions
/// on one gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ClientId(pub u32);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ClientId {
    fn from(id: u32) -> Self {
        ClientId(id)
    }
}

pub type OrderId = i64;

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Contracts
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SecType {
    #[serde(rename = "STK")]
    Stock,
    #[serde(rename = "OPT")]
    Option,
    #[serde(rename = "FUT")]
    Future,
    #[serde(rename = "CASH")]
    Forex,
}

impl SecType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecType::Stock => "STK",
            SecType::Option => "OPT",
            SecType::Future => "FUT",
            SecType::Forex => "CASH",
        }
    }
}

impl FromStr for SecType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "STK" => Ok(SecType::Stock),
            "OPT" => Ok(SecType::Option),
            "FUT" => Ok(SecType::Future),
            "CASH" => Ok(SecType::Forex),
            other => Err(format!("unknown security type \"{other}\"; expected STK, OPT, FUT or CASH")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Right {
    #[serde(rename = "C")]
    Call,
    #[serde(rename = "P")]
    Put,
}

/// An instrument as the gateway identifies it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contract {
    pub symbol: String,
    pub sec_type: SecType,
    pub exchange: String,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strike: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<Right>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_exchange: Option<String>,
}

impl Contract {
    fn base(symbol: &str, sec_type: SecType, exchange: &str, currency: &str) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            sec_type,
            exchange: exchange.to_string(),
            currency: currency.to_string(),
            expiry: None,
            strike: None,
            right: None,
            multiplier: None,
            primary_exchange: None,
        }
    }

    /// A stock routed through `SMART` in USD.
    pub fn stock(symbol: &str) -> Self {
        Self::base(symbol, SecType::Stock, "SMART", "USD")
    }

    /// An equity option; `expiry` as `YYYYMMDD`.
    pub fn option(symbol: &str, expiry: &str, strike: f64, right: Right) -> Self {
        Self {
            expiry: Some(expiry.to_string()),
            strike: Some(strike),
            right: Some(right),
            multiplier: Some("100".to_string()),
            ..Self::base(symbol, SecType::Option, "SMART", "USD")
        }
    }

    pub fn future(symbol: &str, expiry: &str, exchange: &str) -> Self {
        Self {
            expiry: Some(expiry.to_string()),
            ..Self::base(symbol, SecType::Future, exchange, "USD")
        }
    }

    /// A currency pair on `IDEALPRO`, e.g. `forex("EUR", "USD")`.
    pub fn forex(base: &str, quote: &str) -> Self {
        Self::base(base, SecType::Forex, "IDEALPRO", &quote.to_uppercase())
    }

    pub fn on(mut self, exchange: &str) -> Self {
        self.exchange = exchange.to_string();
        self
    }

    pub fn in_currency(mut self, currency: &str) -> Self {
        self.currency = currency.to_uppercase();
        self
    }

    pub fn primary_exchange(mut self, exchange: &str) -> Self {
        self.primary_exchange = Some(exchange.to_string());
        self
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({}, {})", self.sec_type.as_str(), self.symbol, self.exchange, self.currency)
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Orders
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Action {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "SSHORT")]
    ShortSell,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::ShortSell => "SSHORT",
        }
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BUY" => Ok(Action::Buy),
            "SELL" => Ok(Action::Sell),
            "SSHORT" => Ok(Action::ShortSell),
            other => Err(format!("unknown order action \"{other}\"")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderType {
    #[serde(rename = "MKT")]
    Market,
    #[serde(rename = "LMT")]
    Limit,
    #[serde(rename = "STP")]
    Stop,
    #[serde(rename = "STP LMT")]
    StopLimit,
    #[serde(rename = "TRAIL")]
    TrailingStop,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "MKT",
            OrderType::Limit => "LMT",
            OrderType::Stop => "STP",
            OrderType::StopLimit => "STP LMT",
            OrderType::TrailingStop => "TRAIL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TimeInForce {
    #[default]
    #[serde(rename = "DAY")]
    Day,
    #[serde(rename = "GTC")]
    GoodTillCancel,
    #[serde(rename = "IOC")]
    ImmediateOrCancel,
    #[serde(rename = "FOK")]
    FillOrKill,
    #[serde(rename = "GTD")]
    GoodTillDate,
}

/// An order ticket. Prices only apply to the order types that use them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub action: Action,
    pub quantity: f64,
    pub order_type: OrderType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_percent: Option<f64>,
    pub time_in_force: TimeInForce,
    pub outside_rth: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

impl Order {
    fn base(action: Action, quantity: f64, order_type: OrderType) -> Self {
        Self {
            action,
            quantity,
            order_type,
            limit_price: None,
            stop_price: None,
            trailing_percent: None,
            time_in_force: TimeInForce::Day,
            outside_rth: false,
            account: None,
        }
    }

    pub fn market(action: Action, quantity: f64) -> Self {
        Self::base(action, quantity, OrderType::Market)
    }

    pub fn limit(action: Action, quantity: f64, limit_price: f64) -> Self {
        Self {
            limit_price: Some(limit_price),
            ..Self::base(action, quantity, OrderType::Limit)
        }
    }

    pub fn stop(action: Action, quantity: f64, stop_price: f64) -> Self {
        Self {
            stop_price: Some(stop_price),
            ..Self::base(action, quantity, OrderType::Stop)
        }
    }

    pub fn stop_limit(action: Action, quantity: f64, limit_price: f64, stop_price: f64) -> Self {
        Self {
            limit_price: Some(limit_price),
            stop_price: Some(stop_price),
            ..Self::base(action, quantity, OrderType::StopLimit)
        }
    }

    pub fn trailing_stop(action: Action, quantity: f64, trailing_percent: f64) -> Self {
        Self {
            trailing_percent: Some(trailing_percent),
            ..Self::base(action, quantity, OrderType::TrailingStop)
        }
    }

    /// Route the order to a specific account.
    pub fn account(mut self, account: &str) -> Self {
        self.account = Some(account.to_string());
        self
    }

    pub fn time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = tif;
        self
    }

    pub fn outside_rth(mut self, outside: bool) -> Self {
        self.outside_rth = outside;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderStatus {
    PendingSubmit,
    Submitted,
    Cancelled,
    Filled,
    Inactive,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What the gateway answers to a submitted order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderReceipt {
    pub order_id: OrderId,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenOrder {
    pub order_id: OrderId,
    pub client_id: ClientId,
    pub contract: Contract,
    pub order: Order,
    pub status: OrderStatus,
}

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Account & market data
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

/// One tag/value pair of an account summary, e.g. `TotalCashValue = 100000 USD`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountValue {
    pub account: String,
    pub tag: String,
    pub value: String,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub account: String,
    pub symbol: String,
    pub quantity: f64,
    pub average_cost: f64,
}

/// One historical bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// A point-in-time quote. Fields the gateway did not report are `0.0`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Snapshot {
    pub symbol: String,
    pub bid: f64,
    pub ask: f64,
    pub last: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl Snapshot {
    pub fn empty(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            ..Self::default()
        }
    }
}
