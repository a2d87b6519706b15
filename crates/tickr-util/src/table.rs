//! A small, uniform row/column table that every fetched payload is normalized into.
//!
//! Every row holds exactly one [`Cell`] per column; rows are never ragged.

use anyhow::{ensure, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;

/// A single scalar value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Numeric view of the cell; numeric strings (e.g. `"0.0391"`) are parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) => Some(*f),
            Cell::Text(s) => s.trim().parse::<f64>().ok(),
            Cell::Null | Cell::Bool(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Cell::Null => 0,
            Cell::Bool(_) => 1,
            Cell::Int(_) | Cell::Float(_) => 2,
            Cell::Text(_) => 3,
        }
    }

    /// Total order used when sorting: nulls first, then booleans, numbers, text.
    pub fn total_cmp(&self, other: &Cell) -> Ordering {
        match (self, other) {
            (Cell::Bool(a), Cell::Bool(b)) => a.cmp(b),
            (Cell::Int(a), Cell::Int(b)) => a.cmp(b),
            (Cell::Text(a), Cell::Text(b)) => a.cmp(b),
            (a, b) if a.rank() == 2 && b.rank() == 2 => {
                let (a, b) = (a.as_f64().unwrap_or(f64::NAN), b.as_f64().unwrap_or(f64::NAN));
                a.total_cmp(&b)
            }
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl From<&Value> for Cell {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Null,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Int(i),
                None => n.as_f64().map(Cell::Float).unwrap_or(Cell::Null),
            },
            Value::String(s) => Cell::Text(s.clone()),
            // only reached for arrays kept whole inside list records
            nested => Cell::Text(nested.to_string()),
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Int(i) => write!(f, "{i}"),
            Cell::Float(x) => write!(f, "{x}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

/// How the columns of a table are chosen.
///
/// `key` is a structurally mandatory column that leads the table whenever a
/// projection is given; `columns`, when present, is the exact caller-selected set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Projection<'a> {
    pub key: Option<&'a str>,
    pub columns: Option<&'a [String]>,
}

impl<'a> Projection<'a> {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(key: Option<&'a str>, columns: Option<&'a [String]>) -> Self {
        Self { key, columns }
    }

    /// Resolve the final column list; `natural` is the payload's own key order.
    fn resolve(&self, natural: impl FnOnce() -> Vec<String>) -> Vec<String> {
        match self.columns {
            Some(selected) => {
                let mut columns: Vec<String> = Vec::with_capacity(selected.len() + 1);
                if let Some(key) = self.key {
                    if !selected.iter().any(|c| c == key) {
                        columns.push(key.to_string());
                    }
                }
                for column in selected {
                    if !columns.contains(column) {
                        columns.push(column.clone());
                    }
                }
                columns
            }
            None => natural(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// One row per record. Nested objects become dotted columns; arrays are kept
    /// whole as JSON text. Missing keys are filled with [`Cell::Null`].
    pub fn from_records(records: &[Map<String, Value>], projection: Projection) -> Self {
        let flat: Vec<Map<String, Value>> = records
            .iter()
            .map(|record| {
                let mut out = Map::new();
                flatten(record, None, false, &mut out);
                out
            })
            .collect();

        let columns = projection.resolve(|| {
            let mut seen: Vec<String> = Vec::new();
            for record in &flat {
                for key in record.keys() {
                    if !seen.contains(key) {
                        seen.push(key.clone());
                    }
                }
            }
            seen
        });

        let rows = flat
            .iter()
            .map(|record| row_for(&columns, record))
            .collect();

        Self { columns, rows }
    }

    /// Exactly one row from a nested record, every leaf reachable under its
    /// dotted path (array elements by index). An empty record gives no rows.
    pub fn from_record(record: &Map<String, Value>, projection: Projection) -> Self {
        let mut flat = Map::new();
        flatten(record, None, true, &mut flat);

        let columns = projection.resolve(|| flat.keys().cloned().collect());
        if record.is_empty() {
            return Self::new(columns);
        }
        let row = row_for(&columns, &flat);

        Self {
            columns,
            rows: vec![row],
        }
    }

    /// One column holding one value; a null value gives no rows.
    pub fn single(column: impl Into<String>, cell: Cell) -> Self {
        let rows = if cell.is_null() { Vec::new() } else { vec![vec![cell]] };
        Self {
            columns: vec![column.into()],
            rows,
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<()> {
        ensure!(
            row.len() == self.columns.len(),
            "row has {} cells, table has {} columns",
            row.len(),
            self.columns.len()
        );
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// Stable ascending sort on one column; a no-op if the column is absent.
    pub fn sort_by_column(&mut self, name: &str) {
        if let Some(idx) = self.column_index(name) {
            self.rows.sort_by(|a, b| a[idx].total_cmp(&b[idx]));
        }
    }

    /// Rows as JSON objects, in column order.
    pub fn to_json(&self) -> Value {
        Value::Array(
            self.rows
                .iter()
                .map(|row| {
                    let record: Map<String, Value> = self
                        .columns
                        .iter()
                        .cloned()
                        .zip(row.iter().map(|c| serde_json::to_value(c).unwrap_or(Value::Null)))
                        .collect();
                    Value::Object(record)
                })
                .collect(),
        )
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect();

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                rendered
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        writeln!(f, "{}", pad_line(&self.columns, &widths))?;
        for row in &rendered {
            writeln!(f, "{}", pad_line(row, &widths))?;
        }
        write!(f, "({} rows)", self.rows.len())
    }
}

fn pad_line(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<w$}", cell, w = *width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn row_for(columns: &[String], record: &Map<String, Value>) -> Vec<Cell> {
    columns
        .iter()
        .map(|c| record.get(c).map(Cell::from).unwrap_or(Cell::Null))
        .collect()
}

/// Flatten `value` into `out` under dotted keys; `arrays` decides whether array
/// elements are expanded by index or kept whole. Empty containers become null.
fn flatten(record: &Map<String, Value>, prefix: Option<&str>, arrays: bool, out: &mut Map<String, Value>) {
    for (key, value) in record {
        let path = match prefix {
            Some(p) => format!("{p}.{key}"),
            None => key.clone(),
        };
        flatten_value(value, path, arrays, out);
    }
}

fn flatten_value(value: &Value, path: String, arrays: bool, out: &mut Map<String, Value>) {
    match value {
        Value::Object(map) if map.is_empty() => {
            out.insert(path, Value::Null);
        }
        Value::Object(map) => flatten(map, Some(&path), arrays, out),
        Value::Array(items) if arrays && items.is_empty() => {
            out.insert(path, Value::Null);
        }
        Value::Array(items) if arrays => {
            for (i, item) in items.iter().enumerate() {
                flatten_value(item, format!("{path}.{i}"), arrays, out);
            }
        }
        leaf => {
            out.insert(path, leaf.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: Value) -> Vec<Map<String, Value>> {
        serde_json::from_value(value).unwrap()
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn records_keep_payload_key_order() {
        let data = records(json!([
            { "date": "2023-01-03", "open": 10.0, "close": 10.5, "volume": 100 },
            { "date": "2023-01-04", "open": 10.5, "close": 11.0, "volume": 200 },
        ]));
        let table = Table::from_records(&data, Projection::all());

        assert_eq!(table.columns(), cols(&["date", "open", "close", "volume"]).as_slice());
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1, "volume"), Some(&Cell::Int(200)));
        assert_eq!(table.get(0, "close"), Some(&Cell::Float(10.5)));
    }

    #[test]
    fn ragged_records_are_filled_with_nulls() {
        let data = records(json!([
            { "Code": "AS", "Name": "Euronext Amsterdam" },
            { "Code": "US", "Country": "USA" },
        ]));
        let table = Table::from_records(&data, Projection::all());

        assert_eq!(table.columns(), cols(&["Code", "Name", "Country"]).as_slice());
        assert!(table.rows().iter().all(|r| r.len() == 3));
        assert!(table.get(1, "Name").unwrap().is_null());
        assert!(table.get(0, "Country").unwrap().is_null());
    }

    #[test]
    fn single_value_table() {
        let table = Table::single("dividend_yield", Cell::Float(0.0391));
        assert_eq!(table.columns(), cols(&["dividend_yield"]).as_slice());
        assert_eq!(table.len(), 1);
        assert!(Table::single("dividend_yield", Cell::Null).is_empty());
    }

    #[test]
    fn projection_prepends_the_mandatory_key() {
        let data = records(json!([
            { "date": "2023-01-03", "open": 10.0, "adjusted_close": 10.4 },
        ]));
        let selected = cols(&["adjusted_close", "missing"]);
        let table = Table::from_records(&data, Projection::new(Some("date"), Some(&selected)));

        assert_eq!(table.columns(), cols(&["date", "adjusted_close", "missing"]).as_slice());
        assert_eq!(table.get(0, "adjusted_close"), Some(&Cell::Float(10.4)));
        assert!(table.get(0, "missing").unwrap().is_null());
    }

    #[test]
    fn projection_keeps_caller_order_when_key_is_listed() {
        let data = records(json!([{ "date": "2023-01-03", "open": 1, "close": 2 }]));
        let selected = cols(&["close", "date"]);
        let table = Table::from_records(&data, Projection::new(Some("date"), Some(&selected)));

        assert_eq!(table.columns(), cols(&["close", "date"]).as_slice());
    }

    #[test]
    fn nested_objects_in_records_become_dotted_columns() {
        let data = records(json!([
            { "title": "a", "symbols": ["AAPL.US", "MSFT.US"], "sentiment": { "polarity": 0.9 } },
        ]));
        let table = Table::from_records(&data, Projection::all());

        assert_eq!(table.columns(), cols(&["title", "symbols", "sentiment.polarity"]).as_slice());
        assert_eq!(
            table.get(0, "symbols"),
            Some(&Cell::Text(r#"["AAPL.US","MSFT.US"]"#.to_string()))
        );
    }

    #[test]
    fn empty_records_give_an_empty_table() {
        let table = Table::from_records(&[], Projection::all());
        assert!(table.is_empty());
        assert!(table.columns().is_empty());
    }

    #[test]
    fn single_record_flattens_every_leaf() {
        let record = json!({
            "General": { "Code": "ASML", "Address": { "City": "Veldhoven" } },
            "Highlights": { "DividendYield": 0.0089 },
            "Listings": [ { "Code": "ASME" } ],
            "Officers": {},
        });
        let table = Table::from_record(record.as_object().unwrap(), Projection::all());

        assert_eq!(table.len(), 1);
        assert_eq!(
            table.columns(),
            cols(&[
                "General.Code",
                "General.Address.City",
                "Highlights.DividendYield",
                "Listings.0.Code",
                "Officers",
            ])
            .as_slice()
        );
        assert_eq!(table.get(0, "General.Address.City"), Some(&Cell::from("Veldhoven")));
        assert!(table.get(0, "Officers").unwrap().is_null());
    }

    #[test]
    fn single_record_projection() {
        let record = json!({ "General": { "Code": "ASML", "Name": "ASML Holding" } });
        let selected = cols(&["General.Name"]);
        let table = Table::from_record(record.as_object().unwrap(), Projection::new(None, Some(&selected)));

        assert_eq!(table.columns(), selected.as_slice());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn empty_record_has_no_rows() {
        let table = Table::from_record(&Map::new(), Projection::all());
        assert!(table.is_empty());
    }

    #[test]
    fn push_row_rejects_ragged_rows() {
        let mut table = Table::new(cols(&["ticker", "dividend_yield"]));
        assert!(table.push_row(vec![Cell::from("INGA.AS"), Cell::Float(0.06)]).is_ok());
        assert!(table.push_row(vec![Cell::from("ASML.AS")]).is_err());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn sort_by_column_orders_dates() {
        let data = records(json!([
            { "date": "2023-01-05", "close": 3 },
            { "date": "2023-01-03", "close": 1 },
            { "date": "2023-01-04", "close": 2 },
        ]));
        let mut table = Table::from_records(&data, Projection::all());
        table.sort_by_column("date");

        let closes: Vec<f64> = table
            .column("close")
            .unwrap()
            .iter()
            .filter_map(|c| c.as_f64())
            .collect();
        assert_eq!(closes, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn to_json_round_trips_column_order() {
        let data = records(json!([{ "b": 1, "a": "x" }]));
        let table = Table::from_records(&data, Projection::all());
        assert_eq!(table.to_json().to_string(), r#"[{"b":1,"a":"x"}]"#);
    }

    #[test]
    fn display_aligns_columns() {
        let data = records(json!([{ "Code": "AS", "Name": "Amsterdam" }]));
        let table = Table::from_records(&data, Projection::all());
        let text = table.to_string();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Code  Name"));
        assert_eq!(lines.next(), Some("AS    Amsterdam"));
        assert_eq!(lines.next(), Some("(1 rows)"));
    }
}
