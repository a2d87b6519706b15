use crate::api::Eod;
use crate::schema::request::{Resource, ResourceRequest};
use anyhow::Result;
use tickr_util::{Fetch, Table};

pub const DEFAULT_NEWS_LIMIT: u32 = 50;

impl<C> Eod<C>
where
    C: Fetch + Sync,
{
    /// Financial news for a symbol and/or a topic tag, newest first.
    pub async fn news(
        &self,
        symbol: Option<&str>,
        tag: Option<&str>,
        offset: u32,
        limit: u32,
        columns: Option<Vec<String>>,
    ) -> Result<Table> {
        let request = ResourceRequest::new(Resource::News {
            symbol: symbol.map(str::to_string),
            tag: tag.map(str::to_string),
            offset,
            limit,
        })
        .maybe_columns(columns);
        self.fetch(&request).await
    }
}
