//! Grant-flow controllers and the machinery they share.
//!
//! Each controller is constructed fresh for one inbound request, wired up
//! with its collaborators through builder-style setters, and invoked through
//! exactly one public entry point. No field survives past the request; all
//! durable state lives in the injected storage providers.

mod auth_code;
mod device_code;
mod logout;
mod refresh;

pub use auth_code::AuthCodeController;
pub use device_code::DeviceCodeController;
pub use logout::LogoutController;
pub use refresh::RefreshTokenController;

use std::sync::Arc;

use crate::config::ConfigProvider;
use crate::encryption::{CipherEncryption, Encryption};
use crate::error::{OAuthError, Result};
use crate::http::{HttpResponse, HttpTransport, ReqwestTransport};
use crate::models::AccessToken;
use crate::storage::{SecureStorage, Storage};

/// Refresh tokens effectively live until rotated or revoked.
pub(crate) const FIVE_YEARS: u64 = 157_784_760;

/// CSRF state entries only need to survive the redirect round-trip.
pub(crate) const ONE_DAY: u64 = 86_400;

pub(crate) const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub(crate) const DEVICE_CODE_KEY: &str = "device_code";

/// Optional geolocation hints captured from the inbound request, forwarded
/// to the authorization server on every outbound call.
#[derive(Debug, Clone)]
pub struct GeoHints {
    pub latitude: String,
    pub longitude: String,
}

/// Shared machinery for all grant types: provider wiring, the precondition
/// gate, token-endpoint calls, and the refresh-token persistence policy.
///
/// Flow controllers hold one of these by composition; consumers never
/// interact with it directly.
pub(crate) struct GrantContext {
    geo: Option<GeoHints>,
    config: Option<Arc<dyn ConfigProvider>>,
    secure_storage: Option<SecureStorage>,
    encryption: Arc<dyn Encryption>,
    transport: Arc<dyn HttpTransport>,
}

impl GrantContext {
    pub(crate) fn new(geo: Option<GeoHints>) -> Self {
        Self {
            geo,
            config: None,
            secure_storage: None,
            encryption: Arc::new(CipherEncryption::new()),
            transport: Arc::new(ReqwestTransport::new()),
        }
    }

    pub(crate) fn set_config(&mut self, config: Arc<dyn ConfigProvider>) {
        self.config = Some(config);
    }

    pub(crate) fn set_secure_storage(&mut self, storage: SecureStorage) {
        self.secure_storage = Some(storage);
    }

    pub(crate) fn set_encryption(&mut self, encryption: Arc<dyn Encryption>) {
        self.encryption = encryption;
    }

    pub(crate) fn set_transport(&mut self, transport: Arc<dyn HttpTransport>) {
        self.transport = transport;
    }

    pub(crate) fn config(&self) -> Result<&Arc<dyn ConfigProvider>> {
        self.config.as_ref().ok_or_else(|| {
            OAuthError::Configuration(
                "ConfigProvider must be set; see set_config_provider".to_string(),
            )
        })
    }

    pub(crate) fn secure_storage(&self) -> Result<&SecureStorage> {
        self.secure_storage.as_ref().ok_or_else(|| {
            OAuthError::Configuration(
                "SecureStorageProvider must be set; see set_secure_storage_provider".to_string(),
            )
        })
    }

    /// The precondition gate, run at the start of every public operation.
    /// Idempotent; safe to call any number of times per request.
    pub(crate) fn ensure_providers(&self) -> Result<()> {
        let config = self.config()?;
        match self.secure_storage()? {
            SecureStorage::Encrypted(storage) => {
                storage.set_domain(config.cookie_domain().as_deref())?;
                storage.set_key_prefix(&config.cookie_key_prefix())?;
                let salt = config.encryption_salt();
                if !salt.is_empty() {
                    self.encryption.set_salt(&salt)?;
                }
                if !self.encryption.is_valid() {
                    return Err(OAuthError::Configuration(
                        "EncryptionProvider must be valid; configure a non-empty salt and a supported cipher".to_string(),
                    ));
                }
                storage.set_encryption(self.encryption.clone())?;
            }
            SecureStorage::Plain(_) => {
                tracing::warn!("plain cookie storage offered as the secure storage provider");
                return Err(OAuthError::Configuration(
                    "It is strongly discouraged to use plain cookie storage as the secure storage \
                     provider; use the encrypted cookie storage instead"
                        .to_string(),
                ));
            }
            SecureStorage::Custom(_) => {}
        }
        Ok(())
    }

    /// Basic scope validation: at least one scope, all non-empty. The
    /// authorization server still has the final say on whether they exist.
    pub(crate) fn validate_scopes(&self, scopes: &[String]) -> Result<()> {
        if scopes.is_empty() {
            return Err(OAuthError::InvalidArgument(
                "Must specify at least one scope".to_string(),
            ));
        }
        if scopes.iter().any(String::is_empty) {
            return Err(OAuthError::InvalidArgument(
                "All scopes must be non-empty strings".to_string(),
            ));
        }
        Ok(())
    }

    /// Geolocation hint headers, forwarded verbatim on every outbound call.
    pub(crate) fn geo_headers(&self) -> Vec<(String, String)> {
        match &self.geo {
            Some(geo) => vec![
                ("X-Latitude".to_string(), geo.latitude.clone()),
                ("X-Longitude".to_string(), geo.longitude.clone()),
            ],
            None => Vec::new(),
        }
    }

    /// POST a form to the authorization server and surface non-2xx
    /// responses as typed API errors.
    pub(crate) async fn post(
        &self,
        url: &str,
        headers: Vec<(String, String)>,
        form: Vec<(String, String)>,
    ) -> Result<HttpResponse> {
        let response = self.transport.post(url, &headers, &form).await?;
        if response.status >= 400 {
            tracing::warn!(status = response.status, url, "authorization server returned an error");
            return Err(OAuthError::api(
                response.status,
                response.reason,
                response.body,
            ));
        }
        Ok(response)
    }

    /// Create a new access token by POSTing to the `/token` endpoint.
    /// Returns successfully only if a token was actually created.
    pub(crate) async fn create_access_token(
        &self,
        grant_type: &str,
        extra_params: Vec<(String, String)>,
    ) -> Result<AccessToken> {
        if grant_type.is_empty() {
            return Err(OAuthError::InvalidArgument(
                "Must specify grant type".to_string(),
            ));
        }
        self.ensure_providers()?;

        let config = self.config()?;
        let mut form = vec![
            ("client_id".to_string(), config.client_id()),
            ("client_secret".to_string(), config.client_secret()),
            ("grant_type".to_string(), grant_type.to_string()),
        ];
        form.extend(extra_params);

        let url = format!("{}/token", config.auth_server_host());
        let response = self.post(&url, self.geo_headers(), form).await?;
        tracing::debug!(grant_type, "access token created");
        AccessToken::from_json(&response.body)
    }

    /// Refresh-token persistence policy: a rotated token replaces the old
    /// one; a response with no refresh token removes whatever was stored,
    /// favoring invalidation over staleness.
    pub(crate) fn store_refresh_token(&self, access_token: &AccessToken) -> Result<()> {
        let storage = self.secure_storage()?;
        match access_token.refresh_token() {
            Some(refresh_token) if !refresh_token.is_empty() => {
                storage.set(REFRESH_TOKEN_KEY, refresh_token, Some(FIVE_YEARS))
            }
            _ => {
                tracing::debug!("token response carried no refresh token; clearing stored value");
                storage.remove(REFRESH_TOKEN_KEY)
            }
        }
    }
}
