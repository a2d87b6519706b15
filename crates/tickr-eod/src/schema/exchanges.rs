use crate::api::Eod;
use crate::schema::request::{Resource, ResourceRequest};
use anyhow::Result;
use tickr_util::{Fetch, Table};

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Exchanges & the symbols listed on them
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

impl<C> Eod<C>
where
    C: Fetch + Sync,
{
    /// Every exchange the provider covers; one row per exchange, led by `Code`.
    pub async fn exchanges(&self, columns: Option<Vec<String>>) -> Result<Table> {
        let request = ResourceRequest::new(Resource::ExchangesList).maybe_columns(columns);
        self.fetch(&request).await
    }

    /// Every symbol listed on `exchange` (e.g. `AS`, `US`); one row per symbol.
    pub async fn symbols(&self, exchange: &str, columns: Option<Vec<String>>) -> Result<Table> {
        let request = ResourceRequest::new(Resource::SymbolList {
            exchange: exchange.to_string(),
        })
        .maybe_columns(columns);
        self.fetch(&request).await
    }
}
