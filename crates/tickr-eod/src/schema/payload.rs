use anyhow::{bail, Result};
use serde_json::{Map, Value};
use tickr_util::{Cell, Projection, Table};

/// The structural shape an endpoint is documented to answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A flat array of objects, e.g. price history or news.
    Records,
    /// A single, possibly deeply nested object, e.g. fundamentals.
    Record,
    /// A bare value, e.g. one filtered fundamentals field.
    Scalar,
    /// A filtered fundamentals section: a nested object, or a bare value when the
    /// filter reaches down to a single field.
    RecordOrScalar,
}

/// A decoded response body, checked against the shape its resource declares.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Records(Vec<Map<String, Value>>),
    Record(Map<String, Value>),
    Scalar(Value),
}

impl Payload {
    /// Check `value` against `shape`. `null` and empty containers count as an
    /// empty payload of the expected shape rather than a mismatch.
    pub fn decode(shape: Shape, value: Value) -> Result<Self> {
        match (shape, value) {
            (Shape::Records, Value::Null) => Ok(Payload::Records(Vec::new())),
            (Shape::Records, Value::Array(items)) => {
                let mut records = Vec::with_capacity(items.len());
                for (i, item) in items.into_iter().enumerate() {
                    match item {
                        Value::Object(map) => records.push(map),
                        other => bail!(
                            "expected an array of records, element {i} is {}",
                            kind_of(&other)
                        ),
                    }
                }
                Ok(Payload::Records(records))
            }

            (Shape::Record, Value::Null) => Ok(Payload::Record(Map::new())),
            (Shape::Record, Value::Array(items)) if items.is_empty() => {
                Ok(Payload::Record(Map::new()))
            }
            (Shape::Record, Value::Object(map)) => Ok(Payload::Record(map)),

            (Shape::Scalar, Value::Array(items)) if items.is_empty() => {
                Ok(Payload::Scalar(Value::Null))
            }
            (Shape::Scalar, Value::Object(map)) if map.is_empty() => {
                Ok(Payload::Scalar(Value::Null))
            }
            (Shape::Scalar, value @ (Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_))) => {
                Ok(Payload::Scalar(value))
            }

            (Shape::RecordOrScalar, Value::Null) => Ok(Payload::Record(Map::new())),
            (Shape::RecordOrScalar, Value::Array(items)) if items.is_empty() => {
                Ok(Payload::Record(Map::new()))
            }
            (Shape::RecordOrScalar, Value::Object(map)) => Ok(Payload::Record(map)),
            (Shape::RecordOrScalar, value @ (Value::Bool(_) | Value::Number(_) | Value::String(_))) => {
                Ok(Payload::Scalar(value))
            }

            (shape, other) => bail!("expected {shape:?} payload, found {}", kind_of(&other)),
        }
    }

    /// Number of entries before normalization; a scalar counts once unless null.
    pub fn len(&self) -> usize {
        match self {
            Payload::Records(records) => records.len(),
            Payload::Record(map) => usize::from(!map.is_empty()),
            Payload::Scalar(value) => usize::from(!value.is_null()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Project the payload into a table; a scalar lands in `value_column`.
    pub fn into_table(self, projection: Projection, value_column: &str) -> Table {
        match self {
            Payload::Records(records) => Table::from_records(&records, projection),
            Payload::Record(map) => Table::from_record(&map, projection),
            Payload::Scalar(value) => Table::single(value_column, Cell::from(&value)),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
