use serde::{Deserialize, Deserializer};

/// The provider answers a single numeric field in several ways:
///
/// ```text
/// 0.0391      -> Some(0.0391)
/// "0.0391"    -> Some(0.0391)
/// "NA" / null -> None
/// ```
///
/// `de_lenient_f64` handles all of them; any other type is an error.
pub fn de_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: serde_json::Value = Deserialize::deserialize(deserializer)?;
    match value {
        serde_json::Value::Number(num) => Ok(num.as_f64().filter(|x| x.is_finite())),
        serde_json::Value::String(s) => Ok(s.trim().parse::<f64>().ok().filter(|x| x.is_finite())),
        serde_json::Value::Null => Ok(None),
        _ => Err(serde::de::Error::custom(
            "ERROR! Expected a number, numeric string or null",
        )),
    }
}

/// A single filtered fundamentals value.
#[derive(Debug, Deserialize, PartialEq)]
pub struct FieldValue(#[serde(deserialize_with = "de_lenient_f64")] pub Option<f64>);
