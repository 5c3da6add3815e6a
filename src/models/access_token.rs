use std::fmt;

use serde_json::{Map, Value};

use crate::error::Result;

use super::{parse_object, require_str, require_u64};

/// A thin wrapper around an access token, based on the raw JSON returned
/// from the `POST /token` endpoint.
///
/// The refresh token is stripped from the retained JSON at construction
/// time: it is persisted server-side only and must never be echoed back to
/// a client, not even through `Debug` or `Display` output.
#[derive(Clone)]
pub struct AccessToken {
    access_token: String,
    token_type: String,
    expires_in: u64,
    refresh_token: Option<String>,
    raw: Map<String, Value>,
}

impl AccessToken {
    /// Parse a raw `POST /token` response body.
    ///
    /// Fails with [`crate::error::OAuthError::MalformedResponse`] if the
    /// body is not a JSON object or if `access_token`, `token_type`, or
    /// `expires_in` is missing.
    pub fn from_json(raw_body: &str) -> Result<Self> {
        let mut raw = parse_object(raw_body, "AccessToken")?;
        let access_token = require_str(&raw, "access_token", "AccessToken")?;
        let token_type = require_str(&raw, "token_type", "AccessToken")?;
        let expires_in = require_u64(&raw, "expires_in", "AccessToken")?;
        let refresh_token = raw
            .remove("refresh_token")
            .and_then(|value| value.as_str().map(str::to_string));
        Ok(Self {
            access_token,
            token_type,
            expires_in,
            refresh_token,
            raw,
        })
    }

    /// The access token itself.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// The type of token, usually `Bearer`.
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Remaining lifetime of the token, in seconds.
    pub fn expires_in(&self) -> u64 {
        self.expires_in
    }

    /// The refresh token paired with this access token, if the server
    /// issued one.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Re-encode the original response, minus the refresh token. This is
    /// the only representation safe to hand back to a client.
    pub fn to_json(&self) -> String {
        Value::Object(self.raw.clone()).to_string()
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &self.access_token)
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| ".."))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_token_response() {
        let token = AccessToken::from_json(
            r#"{"access_token":"A1","token_type":"Bearer","expires_in":3600,"refresh_token":"R1"}"#,
        )
        .unwrap();
        assert_eq!(token.access_token(), "A1");
        assert_eq!(token.token_type(), "Bearer");
        assert_eq!(token.expires_in(), 3600);
        assert_eq!(token.refresh_token(), Some("R1"));
    }

    #[test]
    fn refresh_token_is_optional() {
        let token = AccessToken::from_json(
            r#"{"access_token":"A1","token_type":"Bearer","expires_in":3600}"#,
        )
        .unwrap();
        assert!(token.refresh_token().is_none());
    }

    #[test]
    fn serialization_omits_refresh_token() {
        let token = AccessToken::from_json(
            r#"{"access_token":"A1","token_type":"Bearer","expires_in":3600,"refresh_token":"R1"}"#,
        )
        .unwrap();
        let reencoded: Value = serde_json::from_str(&token.to_json()).unwrap();
        assert_eq!(reencoded["access_token"], "A1");
        assert_eq!(reencoded["token_type"], "Bearer");
        assert_eq!(reencoded["expires_in"], 3600);
        assert!(reencoded.get("refresh_token").is_none());
    }

    #[test]
    fn serialization_preserves_extra_fields() {
        let token = AccessToken::from_json(
            r#"{"access_token":"A1","token_type":"Bearer","expires_in":3600,"scope":"read write"}"#,
        )
        .unwrap();
        let reencoded: Value = serde_json::from_str(&token.to_json()).unwrap();
        assert_eq!(reencoded["scope"], "read write");
    }

    #[test]
    fn debug_hides_refresh_token() {
        let token = AccessToken::from_json(
            r#"{"access_token":"A1","token_type":"Bearer","expires_in":3600,"refresh_token":"R1"}"#,
        )
        .unwrap();
        let printed = format!("{token:?}");
        assert!(!printed.contains("R1"));
    }

    #[test]
    fn missing_required_fields_fail() {
        for body in [
            r#"{"token_type":"Bearer","expires_in":3600}"#,
            r#"{"access_token":"A1","expires_in":3600}"#,
            r#"{"access_token":"A1","token_type":"Bearer"}"#,
        ] {
            let result = AccessToken::from_json(body);
            assert!(
                matches!(result, Err(crate::error::OAuthError::MalformedResponse(_))),
                "expected MalformedResponse for {body}"
            );
        }
    }

    #[test]
    fn non_json_body_fails() {
        let result = AccessToken::from_json("<html>oops</html>");
        assert!(matches!(
            result,
            Err(crate::error::OAuthError::MalformedResponse(_))
        ));
    }

    #[test]
    fn non_object_body_fails() {
        let result = AccessToken::from_json(r#"["not","an","object"]"#);
        assert!(matches!(
            result,
            Err(crate::error::OAuthError::MalformedResponse(_))
        ));
    }
}
