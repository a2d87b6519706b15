use crate::config::Config;
use crate::schema::payload::Payload;
use crate::schema::request::ResourceRequest;
use anyhow::{anyhow, bail, Context, Result};
use tickr_util::prelude::*;
use tickr_util::{get_json, redacted, Projection, Table};
use tracing::{debug, error, trace};
use url::Url;

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// API Documentation: https://eodhd.com/financial-apis/
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

/// The market-data provider: an HTTP client plus the configuration injected at startup.
///
/// Every fetch is a single GET, decoded and normalized into a [`Table`]; nothing is
/// cached between calls.
pub struct Eod<C = Client> {
    client: C,
    config: Config,
}

impl Eod<Client> {
    /// Build the provider on a fresh [`reqwest::Client`].
    pub fn connect(config: Config) -> Result<Self> {
        let client = build_client(config.user_agent.as_deref())?;
        Ok(Self::new(client, config))
    }
}

impl<C> Eod<C>
where
    C: Fetch + Sync,
{
    pub fn new(client: C, config: Config) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Substitute the request's parameters into its endpoint template.
    pub fn url(&self, request: &ResourceRequest) -> Result<Url> {
        let resource = request.resource();
        if let crate::Resource::News {
            symbol: None,
            tag: None,
            ..
        } = resource
        {
            bail!("news needs a symbol or a tag");
        }

        let mut url = Url::parse(&self.config.base_url)
            .with_context(|| format!("invalid base URL \"{}\"", self.config.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("base URL \"{}\" cannot hold a path", self.config.base_url))?
            .pop_if_empty()
            .extend(resource.segments());

        let token = request.token_override().unwrap_or(&self.config.token);
        url.query_pairs_mut()
            .extend_pairs(resource.params())
            .append_pair("api_token", token)
            .append_pair("fmt", "json");

        Ok(url)
    }

    /// Issue the request and decode the body into the resource's declared shape.
    pub async fn payload(&self, request: &ResourceRequest) -> Result<Payload> {
        let resource = request.resource();
        let url = self.url(request)?;

        trace!("fetching {resource}");
        let value = get_json(&self.client, &url).await?;
        let payload = Payload::decode(resource.shape(), value).map_err(|e| {
            error!("{resource} decoding error: {e}\nURL: {}", redacted(&url));
            e
        })?;
        trace!("{resource} decoded with {} entries", payload.len());

        Ok(payload)
    }

    /// Fetch one resource and normalize it into a table.
    pub async fn fetch(&self, request: &ResourceRequest) -> Result<Table> {
        let resource = request.resource();
        let payload = self.payload(request).await?;
        let projection = Projection::new(resource.key(), request.selected_columns());
        let table = payload.into_table(projection, &resource.value_column());
        debug!(
            "{resource} normalized: {} rows x {} columns",
            table.len(),
            table.columns().len()
        );
        Ok(table)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::Resource;
    use serde_json::json;
    use tickr_util::Canned;

    pub(crate) fn provider(client: Canned) -> Eod<Canned> {
        Eod::new(client, Config::new("demo").with_base_url("http://canned.local"))
    }

    #[test]
    fn url_carries_token_and_format() {
        let eod = provider(Canned::new());
        let url = eod
            .url(&ResourceRequest::new(Resource::ExchangesList))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://canned.local/exchanges-list/?api_token=demo&fmt=json"
        );
    }

    #[test]
    fn url_keeps_base_path_and_per_call_token() {
        let eod = Eod::new(
            Canned::new(),
            Config::new("demo").with_base_url("https://eodhd.com/api/"),
        );
        let request = ResourceRequest::new(Resource::MacroIndicator {
            country: "usa".into(),
            indicator: "inflation_consumer_prices_annual".into(),
        })
        .token("other");
        let url = eod.url(&request).unwrap();
        assert_eq!(
            url.as_str(),
            "https://eodhd.com/api/macro-indicator/USA?indicator=inflation_consumer_prices_annual&api_token=other&fmt=json"
        );
    }

    #[test]
    fn news_without_symbol_or_tag_is_rejected() {
        let eod = provider(Canned::new());
        let request = ResourceRequest::new(Resource::News {
            symbol: None,
            tag: None,
            offset: 0,
            limit: 10,
        });
        assert!(eod.url(&request).is_err());
    }

    #[tokio::test]
    async fn failures_propagate() {
        let client = Canned::new()
            .status("/exchange-symbol-list/XX", 404)
            .raw("/exchange-symbol-list/YY", "not json")
            .json("/exchange-symbol-list/ZZ", json!({ "message": "oops" }));
        let eod = provider(client);

        for exchange in ["XX", "YY", "ZZ", "UNROUTED"] {
            let request = ResourceRequest::new(Resource::SymbolList {
                exchange: exchange.into(),
            });
            assert!(eod.fetch(&request).await.is_err(), "{exchange} should fail");
        }
    }

    #[tokio::test]
    async fn same_payload_same_table() {
        let client = Canned::new().json(
            "/exchanges-list/",
            json!([{ "Name": "Euronext Amsterdam", "Code": "AS", "Country": "Netherlands" }]),
        );
        let eod = provider(client);
        let request = ResourceRequest::new(Resource::ExchangesList);

        let first = eod.fetch(&request).await.unwrap();
        let second = eod.fetch(&request).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(eod.client().requests().len(), 2);
    }
}
