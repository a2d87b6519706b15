pub mod common;
pub mod dividends;
pub mod econ;
pub mod exchanges;
pub mod fundamentals;
pub mod momentum;
pub mod news;
pub mod payload;
pub mod prices;
pub mod request;
