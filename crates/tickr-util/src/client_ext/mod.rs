#[cfg(any(test, feature = "canned"))]
pub mod canned;
pub mod fetch;

pub use reqwest::Client;
