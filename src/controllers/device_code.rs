//! The `device_code` grant: issue a user code for login on another device,
//! then poll until the exchange succeeds.

use std::sync::Arc;

use crate::config::ConfigProvider;
use crate::encryption::Encryption;
use crate::error::{OAuthError, Result};
use crate::http::HttpTransport;
use crate::models::{AccessToken, DeviceCode};
use crate::storage::{SecureStorage, Storage};

use super::{GeoHints, GrantContext, DEVICE_CODE_KEY};

/// Controller for the `device_code` grant.
///
/// The routing layer forwards the relevant requests to
/// [`start_device_code_grant`](Self::start_device_code_grant) and
/// [`poll_device_code_grant`](Self::poll_device_code_grant).
pub struct DeviceCodeController {
    ctx: GrantContext,
}

impl DeviceCodeController {
    pub fn new(geo: Option<GeoHints>) -> Self {
        Self {
            ctx: GrantContext::new(geo),
        }
    }

    pub fn set_config_provider(mut self, config: Arc<dyn ConfigProvider>) -> Self {
        self.ctx.set_config(config);
        self
    }

    pub fn set_secure_storage_provider(mut self, storage: SecureStorage) -> Self {
        self.ctx.set_secure_storage(storage);
        self
    }

    pub fn set_encryption_provider(mut self, encryption: Arc<dyn Encryption>) -> Self {
        self.ctx.set_encryption(encryption);
        self
    }

    pub fn set_http_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.ctx.set_transport(transport);
        self
    }

    /// Kick off a new device code flow: request a code pair from the
    /// authorization server and stash the device code server-side for the
    /// lifetime the server granted it.
    ///
    /// Only the returned model's client-safe fields (user code,
    /// verification URI, timing) should leave the proxy; its serialization
    /// already drops the device code.
    pub async fn start_device_code_grant(&self, scopes: &[String]) -> Result<DeviceCode> {
        self.ctx.ensure_providers()?;
        self.ctx.validate_scopes(scopes)?;

        let config = self.ctx.config()?;
        let url = format!("{}/device", config.auth_server_host());
        let form = vec![
            ("client_id".to_string(), config.client_id()),
            ("client_secret".to_string(), config.client_secret()),
            ("scope".to_string(), scopes.join(" ")),
        ];
        let response = self.ctx.post(&url, self.ctx.geo_headers(), form).await?;
        let device_code = DeviceCode::from_json(&response.body)?;

        self.ctx.secure_storage()?.set(
            DEVICE_CODE_KEY,
            device_code.device_code(),
            Some(device_code.expires_in()),
        )?;
        tracing::debug!(
            expires_in = device_code.expires_in(),
            "device code grant started"
        );

        Ok(device_code)
    }

    /// Poll the token endpoint with the stored device code. While the user
    /// has not yet logged in elsewhere the authorization server answers
    /// with an error status, which surfaces here as
    /// [`OAuthError::Api`] for the routing layer to translate into a
    /// poll-again-later signal.
    pub async fn poll_device_code_grant(&self) -> Result<AccessToken> {
        self.ctx.ensure_providers()?;

        let device_code = self
            .ctx
            .secure_storage()?
            .get(DEVICE_CODE_KEY)?
            .filter(|code| !code.is_empty())
            .ok_or_else(|| {
                OAuthError::MissingToken("Could not locate a device code".to_string())
            })?;

        let access_token = self
            .ctx
            .create_access_token("device_code", vec![("code".to_string(), device_code)])
            .await?;

        self.ctx.store_refresh_token(&access_token)?;

        Ok(access_token)
    }
}
