//! Decoding of feed payloads into raw records.

use ipo_core::RawIpoRecord;
use serde_json::Value;

/// Extract raw records from a feed payload.
///
/// Accepts a bare top-level array or an object with a `data` array. Any other
/// shape yields no records. Array elements that are not JSON objects are
/// skipped.
pub fn decode_payload(payload: Value) -> Vec<RawIpoRecord> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => {
                tracing::debug!("payload object has no data array");
                return Vec::new();
            }
        },
        _ => {
            tracing::debug!("payload is neither an array nor an object");
            return Vec::new();
        }
    };

    let total = items.len();
    let records: Vec<RawIpoRecord> = items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!(error = %e, "skipping undecodable record");
                None
            }
        })
        .collect();

    if records.len() < total {
        tracing::debug!(skipped = total - records.len(), "skipped non-record payload entries");
    }

    records
}

/// Decode a payload from raw bytes.
pub fn decode_payload_bytes(bytes: &[u8]) -> ipo_core::Result<Vec<RawIpoRecord>> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| ipo_core::Error::decode(format!("feed body is not JSON: {}", e)))?;
    Ok(decode_payload(value))
}
