use crate::api::Eod;
use crate::schema::request::{Interval, Period, Resource, ResourceRequest};
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use tickr_util::{Fetch, Table};

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Prices, per ticker
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

impl<C> Eod<C>
where
    C: Fetch + Sync,
{
    /// End-of-day history for `symbol` (e.g. `ZYXI.US`), in the provider's
    /// ascending date order. Columns: `date, open, high, low, close, adjusted_close, volume`.
    pub async fn eod(
        &self,
        symbol: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        period: Period,
        columns: Option<Vec<String>>,
    ) -> Result<Table> {
        let request = ResourceRequest::new(Resource::Eod {
            symbol: symbol.to_string(),
            from,
            to,
            period,
        })
        .maybe_columns(columns);
        self.fetch(&request).await
    }

    /// Intraday bars for `symbol`. Columns: `timestamp, gmtoffset, datetime, open,
    /// high, low, close, volume`.
    pub async fn intraday(
        &self,
        symbol: &str,
        interval: Interval,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        columns: Option<Vec<String>>,
    ) -> Result<Table> {
        let request = ResourceRequest::new(Resource::Intraday {
            symbol: symbol.to_string(),
            interval,
            from: from.map(|t| t.timestamp()),
            to: to.map(|t| t.timestamp()),
        })
        .maybe_columns(columns);
        self.fetch(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::provider;
    use serde_json::json;
    use tickr_util::{Canned, Cell};

    fn bars() -> serde_json::Value {
        json!([
            { "date": "2023-01-03", "open": 14.45, "high": 14.6, "low": 13.93, "close": 14.07, "adjusted_close": 13.87, "volume": 204600 },
            { "date": "2023-01-04", "open": 14.15, "high": 14.36, "low": 13.8, "close": 14.17, "adjusted_close": 13.97, "volume": 165900 },
            { "date": "2023-01-05", "open": 14.13, "high": 14.2, "low": 13.57, "close": 13.66, "adjusted_close": 13.47, "volume": 189000 },
        ])
    }

    #[tokio::test]
    async fn eod_keeps_every_column_without_projection() {
        let eod = provider(Canned::new().json("/eod/ZYXI.US", bars()));
        let table = eod
            .eod("ZYXI.US", None, None, Period::Daily, None)
            .await
            .unwrap();

        assert_eq!(
            table.columns(),
            ["date", "open", "high", "low", "close", "adjusted_close", "volume"]
                .map(String::from)
                .as_slice()
        );
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(2, "volume"), Some(&Cell::Int(189000)));
    }

    #[tokio::test]
    async fn eod_projection_keeps_date_first() {
        let eod = provider(Canned::new().json("/eod/ZYXI.US", bars()));
        let from = NaiveDate::from_ymd_opt(2023, 1, 1);
        let table = eod
            .eod("ZYXI.US", from, None, Period::Weekly, Some(vec!["adjusted_close".into()]))
            .await
            .unwrap();

        assert_eq!(table.columns(), ["date", "adjusted_close"].map(String::from).as_slice());

        let url = &eod.client().requests()[0];
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(query.contains(&("from".into(), "2023-01-01".into())));
        assert!(query.contains(&("period".into(), "w".into())));
        assert!(!query.iter().any(|(k, _)| k == "to"));
    }

    #[tokio::test]
    async fn intraday_sends_unix_bounds() {
        let client = Canned::new().json(
            "/intraday/AAPL.US",
            json!([
                { "timestamp": 1696253400, "gmtoffset": 0, "datetime": "2023-10-02 13:30:00", "open": 171.22, "high": 171.9, "low": 170.9, "close": 171.6, "volume": 2651931 },
            ]),
        );
        let eod = provider(client);
        let from = DateTime::from_timestamp(1696204800, 0);
        let table = eod
            .intraday("AAPL.US", Interval::OneMinute, from, None, Some(vec!["close".into()]))
            .await
            .unwrap();

        assert_eq!(table.columns(), ["datetime", "close"].map(String::from).as_slice());
        let query: Vec<(String, String)> = eod.client().requests()[0]
            .query_pairs()
            .into_owned()
            .collect();
        assert!(query.contains(&("interval".into(), "1m".into())));
        assert!(query.contains(&("from".into(), "1696204800".into())));
    }
}
