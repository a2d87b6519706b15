use crate::api::Eod;
use crate::schema::request::{Resource, ResourceRequest};
use anyhow::Result;
use tickr_util::{Fetch, Table};

impl<C> Eod<C>
where
    C: Fetch + Sync,
{
    /// A company's fundamentals document flattened into a single row; nested
    /// fields become dotted columns (`General.Code`, `Highlights.MarketCapitalization`, ...).
    ///
    /// `filter` narrows the document to one section, given as a dotted path. A filter
    /// that reaches a single field gives one row under a column named by the path.
    pub async fn fundamentals(
        &self,
        symbol: &str,
        filter: Option<&str>,
        columns: Option<Vec<String>>,
    ) -> Result<Table> {
        let request = ResourceRequest::new(Resource::Fundamentals {
            symbol: symbol.to_string(),
            filter: filter.map(str::to_string),
        })
        .maybe_columns(columns);
        self.fetch(&request).await
    }
}
