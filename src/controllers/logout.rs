//! Logout: revoke the token pair upstream and drop the stored refresh
//! token.

use std::sync::Arc;

use crate::config::ConfigProvider;
use crate::encryption::Encryption;
use crate::error::{OAuthError, Result};
use crate::http::HttpTransport;
use crate::storage::{SecureStorage, Storage};

use super::{GeoHints, GrantContext, REFRESH_TOKEN_KEY};

/// Controller for fully logging users out, regardless of which grant type
/// obtained their tokens.
pub struct LogoutController {
    ctx: GrantContext,
}

impl LogoutController {
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

    /// Revoke an access+refresh token pair and remove the stored refresh
    /// token.
    ///
    /// With an access token supplied, that token is revoked directly.
    /// Without one, the refresh token previously saved to secure storage
    /// is revoked instead (with a `token_type_hint`); if none exists there
    /// is nothing to revoke and the call fails. Either way the stored
    /// refresh token is removed afterward, even if the upstream revocation
    /// already invalidated it.
    pub async fn delete_access_and_refresh_tokens(
        &self,
        access_token: Option<&str>,
    ) -> Result<()> {
        self.ctx.ensure_providers()?;

        match access_token.filter(|token| !token.is_empty()) {
            Some(token) => self.revoke_token(token, false).await?,
            None => {
                let refresh_token = self
                    .ctx
                    .secure_storage()?
                    .get(REFRESH_TOKEN_KEY)?
                    .filter(|token| !token.is_empty())
                    .ok_or_else(|| {
                        OAuthError::MissingToken(
                            "Could not locate a token to revoke".to_string(),
                        )
                    })?;
                self.revoke_token(&refresh_token, true).await?;
            }
        }

        self.ctx.secure_storage()?.remove(REFRESH_TOKEN_KEY)?;
        tracing::debug!("stored refresh token removed after revocation");
        Ok(())
    }

    /// POST to the revoke endpoint, authenticated as the proxy itself via
    /// the client credentials token.
    async fn revoke_token(&self, token: &str, is_refresh_token: bool) -> Result<()> {
        if token.is_empty() {
            return Err(OAuthError::InvalidArgument(
                "Must specify token to be revoked".to_string(),
            ));
        }
        self.ctx.ensure_providers()?;

        let config = self.ctx.config()?;
        let url = format!("{}/token/revoke", config.auth_server_host());
        let mut headers = self.ctx.geo_headers();
        headers.push((
            "Authorization".to_string(),
            format!("Bearer {}", config.client_credentials_token()),
        ));
        let mut form = vec![("token".to_string(), token.to_string())];
        if is_refresh_token {
            form.push((
                "token_type_hint".to_string(),
                "refresh_token".to_string(),
            ));
        }

        // A successful revocation has no response body.
        self.ctx.post(&url, headers, form).await?;
        Ok(())
    }
}
