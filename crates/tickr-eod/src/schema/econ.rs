use crate::api::Eod;
use crate::schema::request::{Resource, ResourceRequest};
use anyhow::Result;
use tickr_util::{Fetch, Table};

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Macro-economic indicators, per country
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

impl<C> Eod<C>
where
    C: Fetch + Sync,
{
    /// One macro indicator (e.g. `inflation_consumer_prices_annual`, `gdp_current_usd`)
    /// for an ISO alpha-3 `country`; one row per observation, led by `Date`.
    pub async fn macro_indicator(
        &self,
        country: &str,
        indicator: &str,
        columns: Option<Vec<String>>,
    ) -> Result<Table> {
        let request = ResourceRequest::new(Resource::MacroIndicator {
            country: country.to_string(),
            indicator: indicator.to_string(),
        })
        .maybe_columns(columns);
        self.fetch(&request).await
    }
}
