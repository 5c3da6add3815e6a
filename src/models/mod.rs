//! Typed views over the raw JSON bodies returned by the authorization
//! server. Each model keeps the original object around so it can be
//! re-encoded verbatim, minus the fields that must never leave the proxy.

mod access_token;
mod device_code;

pub use access_token::AccessToken;
pub use device_code::DeviceCode;

use serde_json::{Map, Value};

use crate::error::{OAuthError, Result};

/// Parse a raw body into a JSON object map, or fail closed.
pub(crate) fn parse_object(raw: &str, model: &str) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_str(raw).map_err(|_| {
        OAuthError::MalformedResponse(format!("{model} cannot be decoded from: {raw}"))
    })?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(OAuthError::MalformedResponse(format!(
            "{model} expects a JSON object, received: {raw}"
        ))),
    }
}

/// Pull a required string field out of the object map.
pub(crate) fn require_str(map: &Map<String, Value>, field: &str, model: &str) -> Result<String> {
    map.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            OAuthError::MalformedResponse(format!("{model} is missing required field {field}"))
        })
}

/// Pull a required non-negative integer field out of the object map.
pub(crate) fn require_u64(map: &Map<String, Value>, field: &str, model: &str) -> Result<u64> {
    map.get(field).and_then(Value::as_u64).ok_or_else(|| {
        OAuthError::MalformedResponse(format!("{model} is missing required field {field}"))
    })
}
