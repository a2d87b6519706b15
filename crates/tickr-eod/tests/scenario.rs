use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde_json::{json, Value};
use tickr_eod::{Config, Eod, Period};
use tickr_util::{Canned, Cell};

/// 187 weekday bars starting 2023-01-03, the shape the provider sends for `/eod`.
fn zyxi_bars() -> Value {
    let mut day = NaiveDate::from_ymd_opt(2023, 1, 3).unwrap();
    let mut bars = Vec::new();
    while bars.len() < 187 {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            let close = 10.0 + bars.len() as f64 * 0.01;
            bars.push(json!({
                "date": day.to_string(),
                "open": close - 0.05,
                "high": close + 0.1,
                "low": close - 0.1,
                "close": close,
                "adjusted_close": close,
                "volume": 250_000 + bars.len()
            }));
        }
        day = day.checked_add_days(Days::new(1)).unwrap();
    }
    Value::Array(bars)
}

fn provider() -> Eod<Canned> {
    let client = Canned::new().json("/eod/ZYXI.US", zyxi_bars());
    Eod::new(client, Config::new("demo").with_base_url("http://canned.local/api"))
}

#[tokio::test]
async fn daily_history_for_a_date_window() {
    let eod = provider();
    let from = NaiveDate::from_ymd_opt(2023, 1, 1);
    let to = NaiveDate::from_ymd_opt(2023, 10, 1);

    let table = eod.eod("ZYXI.US", from, to, Period::Daily, None).await.unwrap();

    assert_eq!(table.len(), 187);
    assert_eq!(table.columns()[0], "date");
    assert_eq!(
        table.columns(),
        ["date", "open", "high", "low", "close", "adjusted_close", "volume"]
            .map(String::from)
            .as_slice()
    );

    let dates: Vec<&str> = table
        .column("date")
        .unwrap()
        .into_iter()
        .filter_map(Cell::as_str)
        .collect();
    assert_eq!(dates.len(), 187);
    assert!(dates.windows(2).all(|w| w[0] < w[1]));
    assert!(dates.iter().all(|d| ("2023-01-01"..="2023-10-01").contains(d)));

    let url = &eod.client().requests()[0];
    assert_eq!(url.path(), "/api/eod/ZYXI.US");
    let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    for (key, value) in [("from", "2023-01-01"), ("to", "2023-10-01"), ("period", "d")] {
        assert!(query.contains(&(key.to_string(), value.to_string())), "{key}");
    }
}

#[tokio::test]
async fn projection_keeps_the_date() {
    let eod = provider();
    let table = eod
        .eod(
            "zyxi.us",
            NaiveDate::from_ymd_opt(2023, 1, 1),
            NaiveDate::from_ymd_opt(2023, 10, 1),
            Period::Daily,
            Some(vec!["close".into()]),
        )
        .await
        .unwrap();

    assert_eq!(table.columns(), ["date", "close"].map(String::from).as_slice());
    assert_eq!(table.len(), 187);
    assert_eq!(table.get(0, "date"), Some(&Cell::from("2023-01-03")));
    assert_eq!(table.get(0, "close").and_then(Cell::as_f64), Some(10.0));
}
