use crate::api::Eod;
use crate::schema::common::FieldValue;
use crate::schema::payload::Payload;
use crate::schema::request::{DividendField, Resource, ResourceRequest};
use anyhow::Result;
use tickr_util::{ui, Cell, Fetch, Table};
use tokio_stream::{self as stream, StreamExt};
use tracing::{debug, error, trace, warn};

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Dividend figures, per ticker and in batches
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

impl<C> Eod<C>
where
    C: Fetch + Sync,
{
    /// One dividend figure for `symbol`; `None` when the provider has no value.
    pub async fn dividend_field(&self, symbol: &str, field: DividendField) -> Result<Option<f64>> {
        let request = ResourceRequest::new(Resource::DividendField {
            symbol: symbol.to_string(),
            field,
        });

        let value = match self.payload(&request).await? {
            Payload::Scalar(value) => value,
            // the resource declares a scalar shape
            _ => return Ok(None),
        };
        let FieldValue(figure) = serde_json::from_value::<FieldValue>(value)?;
        Ok(figure)
    }

    /// Fetch `field` for every ticker on `exchange`, one independent call each.
    ///
    /// Tickers are bare (`INGA`); the exchange suffix is appended (`INGA.AS`). A
    /// ticker whose call fails, or that has no value, is logged and left out: the
    /// result holds one row per ticker that succeeded, with columns `ticker` and
    /// the field's column name.
    pub async fn dividend_batch(
        &self,
        tickers: &[String],
        exchange: &str,
        field: DividendField,
    ) -> Table {
        let mut table = Table::new(vec!["ticker".to_string(), field.column().to_string()]);
        let pb = ui::batch_pb(tickers.len() as u64, field.column());

        let mut stream = stream::iter(tickers);
        while let Some(ticker) = stream.next().await {
            let symbol = format!("{}.{}", ticker.trim().to_uppercase(), exchange.to_uppercase());
            pb.set_message(symbol.clone());

            match self.dividend_field(&symbol, field).await {
                Ok(Some(figure)) => {
                    trace!("{} for {symbol}: {figure}", field.column());
                    let row = vec![Cell::from(symbol.as_str()), Cell::from(figure)];
                    if let Err(e) = table.push_row(row) {
                        error!("failed to record {symbol}: {e}");
                    }
                }
                Ok(None) => warn!("{symbol} has no {}; skipping", field.column()),
                Err(e) => error!("failed to fetch {} for {symbol}: {e}", field.column()),
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        debug!(
            "{} batch on {exchange}: {}/{} tickers",
            field.column(),
            table.len(),
            tickers.len()
        );
        table
    }
}
