use std::fmt;

use serde_json::{Map, Value};

use crate::error::Result;

use super::{parse_object, require_str, require_u64};

/// A thin wrapper around a device code/user code pair, based on the raw
/// JSON returned from the `POST /device` endpoint.
///
/// The device code is the proxy's half of the pairing and is stripped from
/// the retained JSON at construction time; only the user code, verification
/// URI, and timing fields are safe to show to a client.
#[derive(Clone)]
pub struct DeviceCode {
    device_code: String,
    user_code: String,
    verification_uri: String,
    expires_in: u64,
    interval: u64,
    raw: Map<String, Value>,
}

impl DeviceCode {
    /// Parse a raw `POST /device` response body.
    ///
    /// Fails with [`crate::error::OAuthError::MalformedResponse`] if the
    /// body is not a JSON object or any of the five expected fields is
    /// missing.
    pub fn from_json(raw_body: &str) -> Result<Self> {
        let mut raw = parse_object(raw_body, "DeviceCode")?;
        let device_code = require_str(&raw, "device_code", "DeviceCode")?;
        let user_code = require_str(&raw, "user_code", "DeviceCode")?;
        let verification_uri = require_str(&raw, "verification_uri", "DeviceCode")?;
        let expires_in = require_u64(&raw, "expires_in", "DeviceCode")?;
        let interval = require_u64(&raw, "interval", "DeviceCode")?;
        raw.remove("device_code");
        Ok(Self {
            device_code,
            user_code,
            verification_uri,
            expires_in,
            interval,
            raw,
        })
    }

    /// The code the proxy exchanges for a token once the user has logged
    /// in. Never returned to the client.
    pub fn device_code(&self) -> &str {
        &self.device_code
    }

    /// The short code the user is asked to enter at the verification URI.
    pub fn user_code(&self) -> &str {
        &self.user_code
    }

    /// The external URL at which the user should log in.
    pub fn verification_uri(&self) -> &str {
        &self.verification_uri
    }

    /// Remaining lifetime of the code pair, in seconds.
    pub fn expires_in(&self) -> u64 {
        self.expires_in
    }

    /// The interval (in seconds) at which the client is advised to poll.
    pub fn interval(&self) -> u64 {
        self.interval
    }

    /// Re-encode the original response, minus the device code. This is the
    /// only representation safe to hand back to a client.
    pub fn to_json(&self) -> String {
        Value::Object(self.raw.clone()).to_string()
    }
}

impl fmt::Display for DeviceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}

impl fmt::Debug for DeviceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceCode")
            .field("device_code", &"..")
            .field("user_code", &self.user_code)
            .field("verification_uri", &self.verification_uri)
            .field("expires_in", &self.expires_in)
            .field("interval", &self.interval)
            .finish()
    }
}
