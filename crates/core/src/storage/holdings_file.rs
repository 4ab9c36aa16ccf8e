use std::path::Path;

use serde_json::Value;

use crate::errors::CoreError;
use crate::models::holding::RawHolding;

use super::repair::parse_lenient;

/// Reads the locally stored holdings list.
///
/// Accepted shapes: a top-level array of objects, or an object with a
/// `holdings` array. Parsing is strict first; if that fails the text goes
/// through [`parse_lenient`] (JSON5 plus cleanup) once more. A file that still does not
/// parse fails the request cycle with the parser's diagnostic.
pub struct HoldingsFile;

impl HoldingsFile {
    /// Parse holdings from raw file bytes. Invalid UTF-8 is replaced, not
    /// rejected.
    pub fn load_from_bytes(data: &[u8]) -> Result<Vec<RawHolding>, CoreError> {
        let text = String::from_utf8_lossy(data);
        Self::parse(&text)
    }

    /// Read and parse a holdings file from disk.
    pub async fn load_from_file(path: impl AsRef<Path>) -> Result<Vec<RawHolding>, CoreError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            CoreError::FileIO(format!("Failed to read holdings file {}: {e}", path.display()))
        })?;
        Self::load_from_bytes(&bytes)
    }

    /// Parse holdings from text, repairing it if the strict parse fails.
    pub fn parse(text: &str) -> Result<Vec<RawHolding>, CoreError> {
        let value = match serde_json::from_str::<Value>(text) {
            Ok(value) => value,
            Err(strict) => {
                let value = parse_lenient(text).map_err(|e| {
                    CoreError::InvalidHoldingsFile(format!(
                        "{e} (after repair; original error: {strict})"
                    ))
                })?;
                tracing::warn!(error = %strict, "holdings file needed repair before it could be parsed");
                value
            }
        };
        Self::into_holdings(value)
    }

    fn into_holdings(value: Value) -> Result<Vec<RawHolding>, CoreError> {
        let items = match value {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("holdings") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(CoreError::InvalidHoldingsFile(
                        "expected an array of holdings or an object with a `holdings` array".into(),
                    ))
                }
            },
            other => {
                return Err(CoreError::InvalidHoldingsFile(format!(
                    "expected an array of holdings, found {}",
                    json_kind(&other)
                )))
            }
        };

        items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| match item {
                Value::Object(fields) => Ok(RawHolding::new(fields)),
                other => Err(CoreError::InvalidHoldingsFile(format!(
                    "holding #{idx} is {}, expected an object",
                    json_kind(&other)
                ))),
            })
            .collect()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
