pub mod api;
pub mod config;
pub mod schema;

pub use api::Eod;
pub use config::Config;
pub use schema::momentum::{daily_returns, log_momentum, numeric_column, returns_table, BestEffort};
pub use schema::payload::{Payload, Shape};
pub use schema::request::{DividendField, Interval, Period, Resource, ResourceRequest};
