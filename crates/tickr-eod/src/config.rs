use anyhow::{Context, Result};
use dotenv::var;
use std::fmt;

pub const DEFAULT_BASE_URL: &str = "https://eodhd.com/api";

/// Connection settings for the market-data provider, built once at startup and
/// handed to [`Eod::new`](crate::Eod::new).
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub token: String,
    pub base_url: String,
    pub user_agent: Option<String>,
}

impl Config {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Read `EOD_API_TOKEN`, `EOD_BASE_URL` and `USER_AGENT` from the environment
    /// (call `dotenv()` first to pick up a `.env` file). An explicit `token` wins
    /// over the environment.
    pub fn from_env(token: Option<String>) -> Result<Self> {
        let token = match token {
            Some(token) => token,
            None => var("EOD_API_TOKEN")
                .context("EOD_API_TOKEN is not set; export it or pass --token")?,
        };

        Ok(Self {
            token,
            base_url: var("EOD_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            user_agent: var("USER_AGENT").ok(),
        })
    }
}

// keeps the token out of `{:?}` log lines
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &"***")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
