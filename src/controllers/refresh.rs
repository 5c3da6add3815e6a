//! Silent renewal: trade the stored refresh token for a fresh access token.

use std::sync::Arc;

use crate::config::ConfigProvider;
use crate::encryption::Encryption;
use crate::error::{OAuthError, Result};
use crate::http::HttpTransport;
use crate::models::AccessToken;
use crate::storage::{SecureStorage, Storage};

use super::{GeoHints, GrantContext, REFRESH_TOKEN_KEY};

/// Controller for the `refresh_token` grant. Used with both other grant
/// types to renew expired access tokens.
pub struct RefreshTokenController {
    ctx: GrantContext,
}

impl RefreshTokenController {
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

    /// Locate the refresh token in secure storage and, if found, exchange
    /// it for a new access token. The persistence policy then rotates or
    /// revokes the stored refresh token according to what the server sent
    /// back.
    pub async fn generate_new_access_token_from_refresh_token(&self) -> Result<AccessToken> {
        self.ctx.ensure_providers()?;

        let refresh_token = self
            .ctx
            .secure_storage()?
            .get(REFRESH_TOKEN_KEY)?
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                OAuthError::MissingToken("Could not locate a refresh token".to_string())
            })?;

        let access_token = self
            .ctx
            .create_access_token(
                "refresh_token",
                vec![("refresh_token".to_string(), refresh_token)],
            )
            .await?;

        self.ctx.store_refresh_token(&access_token)?;

        Ok(access_token)
    }
}
