use anyhow::Result;
use reqwest::Client;
use serde_json::Value;
use std::future::Future;
use tracing::{error, trace};
use url::Url;

/// Query parameters whose values never reach a log line.
const SECRET_PARAMS: [&str; 2] = ["api_token", "api_key"];

pub trait ClientFetchExt {
    /// GET request `url` and return the response body; a non-success status is an error.
    fn get_body(&self, url: &Url) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Add-on methods for [`reqwest::Client`].
///
/// [`reqwest::Client`]: https://docs.rs/reqwest/latest/reqwest/struct.Client.html
impl ClientFetchExt for Client {
    async fn get_body(&self, url: &Url) -> Result<Vec<u8>> {
        let shown = redacted(url);
        trace!("GET {shown}");

        let response = self
            .get(url.clone())
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                error!("request error: {e}\nURL: {shown}");
                e
            })?
            .error_for_status()
            .map_err(|e| {
                let e = e.without_url();
                error!("unsuccessful response: {e}\nURL: {shown}");
                e
            })?;

        let body = response.bytes().await.map_err(|e| {
            let e = e.without_url();
            error!("byte transformation error: {e}\nURL: {shown}");
            e
        })?;
        trace!("received {} bytes from {shown}", body.len());

        Ok(body.to_vec())
    }
}

/// GET request `url` and parse the body as JSON.
///
/// ```ignore
/// let value = tickr_util::get_json(&client, &url).await?;
/// ```
pub async fn get_json<C>(client: &C, url: &Url) -> Result<Value>
where
    C: ClientFetchExt + Sync,
{
    let body = client.get_body(url).await?;
    match serde_json::from_slice::<Value>(&body) {
        Ok(value) => Ok(value),
        Err(e) => {
            error!("deserialization error: {e}\nURL: {}", redacted(url));
            Err(e.into())
        }
    }
}

/// Render `url` with credentials masked, for logging.
pub fn redacted(url: &Url) -> String {
    if !url
        .query_pairs()
        .any(|(k, _)| SECRET_PARAMS.contains(&k.as_ref()))
    {
        return url.to_string();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if SECRET_PARAMS.contains(&k.as_ref()) {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();

    let mut shown = url.clone();
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}
