//! The `authorization_code` grant: redirect the browser to the
//! authorization server, then exchange the code it sends back.

use std::sync::Arc;

use url::Url;
use uuid::Uuid;

use crate::config::ConfigProvider;
use crate::encryption::Encryption;
use crate::error::{OAuthError, Result};
use crate::http::HttpTransport;
use crate::models::AccessToken;
use crate::storage::{CookieStorage, SecureStorage, Storage};

use super::{GeoHints, GrantContext, ONE_DAY};

/// Controller for the `authorization_code` grant.
///
/// The routing layer forwards the relevant requests to
/// [`start_authorization_grant`](Self::start_authorization_grant) and
/// [`complete_authorization_grant`](Self::complete_authorization_grant),
/// and uses [`redirect_uri`](Self::redirect_uri) to send the browser back
/// to the client application after either outcome.
pub struct AuthCodeController {
    ctx: GrantContext,
    storage: Option<Arc<dyn Storage>>,
    cookies: Option<Arc<CookieStorage>>,
}

impl AuthCodeController {
    pub fn new(geo: Option<GeoHints>) -> Self {
        Self {
            ctx: GrantContext::new(geo),
            storage: None,
            cookies: None,
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

    /// Session storage used to persist the OAuth `state` across the
    /// redirect round-trip.
    pub fn set_storage_provider(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Plain cookie storage for the short-lived `access_token` cookie
    /// written after a successful exchange.
    pub fn set_cookie_provider(mut self, cookies: Arc<CookieStorage>) -> Self {
        self.cookies = Some(cookies);
        self
    }

    fn storage(&self) -> Result<&Arc<dyn Storage>> {
        self.storage.as_ref().ok_or_else(|| {
            OAuthError::Configuration(
                "StorageProvider must be set; see set_storage_provider".to_string(),
            )
        })
    }

    fn cookies(&self) -> Result<&Arc<CookieStorage>> {
        self.cookies.as_ref().ok_or_else(|| {
            OAuthError::Configuration(
                "CookieProvider must be set; see set_cookie_provider".to_string(),
            )
        })
    }

    /// The shared gate, extended with this flow's own collaborators; also
    /// propagates the cookie domain and key prefix into the plain cookie
    /// layer.
    fn ensure_providers(&self) -> Result<()> {
        self.ctx.ensure_providers()?;
        self.storage()?;
        let cookies = self.cookies()?;
        let config = self.ctx.config()?;
        cookies.set_domain(config.cookie_domain().as_deref())?;
        cookies.set_key_prefix(&config.cookie_key_prefix())?;
        Ok(())
    }

    /// The client application URL both success and failure redirects end
    /// at; by callback time the browser is mid-flow and has nowhere else
    /// to go.
    pub fn redirect_uri(&self) -> Result<String> {
        self.ensure_providers()?;
        Ok(self.ctx.config()?.client_app_url())
    }

    /// Kick off a new authorization grant: persist a fresh one-time state
    /// token and return the URL to redirect the browser to.
    ///
    /// `email` pre-populates the login page; `user_id` carries an existing
    /// anonymous identity across the login, if there is one.
    pub fn start_authorization_grant(
        &self,
        scopes: &[String],
        email: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<String> {
        self.ensure_providers()?;
        self.ctx.validate_scopes(scopes)?;

        let state = self.generate_state()?;
        let config = self.ctx.config()?;

        let mut url = Url::parse(&format!("{}/authorize", config.auth_server_host()))
            .map_err(|err| {
                OAuthError::Configuration(format!("auth server host is not a valid URL: {err}"))
            })?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &config.client_id())
                .append_pair("redirect_uri", &config.auth_code_callback_url())
                .append_pair("state", &state)
                .append_pair("response_type", "code")
                .append_pair("scope", &scopes.join(" "));
            if let Some(email) = email {
                query.append_pair("email", email);
            }
            if let Some(user_id) = user_id {
                query.append_pair("user_id", user_id);
            }
        }
        Ok(url.into())
    }

    /// Finish the authorization grant: verify the one-time state, exchange
    /// the code for an access token, persist it, and return it.
    pub async fn complete_authorization_grant(
        &self,
        authorization_code: &str,
        state: &str,
    ) -> Result<AccessToken> {
        if authorization_code.is_empty() {
            return Err(OAuthError::InvalidArgument(
                "Must specify authorization code".to_string(),
            ));
        }
        if state.is_empty() {
            return Err(OAuthError::InvalidArgument(
                "Must specify state".to_string(),
            ));
        }
        self.ensure_providers()?;

        self.verify_state(state)?;

        let config = self.ctx.config()?;
        let access_token = self
            .ctx
            .create_access_token(
                "authorization_code",
                vec![
                    ("code".to_string(), authorization_code.to_string()),
                    ("redirect_uri".to_string(), config.auth_code_callback_url()),
                ],
            )
            .await?;

        self.cookies()?.set(
            "access_token",
            access_token.access_token(),
            Some(access_token.expires_in()),
        )?;

        self.ctx.store_refresh_token(&access_token)?;

        Ok(access_token)
    }

    /// Generate a `key:value` state token, both halves random, and persist
    /// `key -> value` so the callback can verify it.
    fn generate_state(&self) -> Result<String> {
        let key = Uuid::new_v4().simple().to_string();
        let value = Uuid::new_v4().simple().to_string();
        self.storage()?.set(&key, &value, Some(ONE_DAY))?;
        Ok(format!("{key}:{value}"))
    }

    /// Verify a state token against session storage. The entry is removed
    /// no matter what: a state token is single-use, match or mismatch.
    fn verify_state(&self, state: &str) -> Result<()> {
        let storage = self.storage()?;
        let Some((key, value)) = state.split_once(':') else {
            return Err(OAuthError::StateVerification(format!(
                "Invalid state returned from OAuth server, colon separator missing: {state}"
            )));
        };

        let matched = storage.compare(key, value)?;
        storage.remove(key)?;

        if !matched {
            tracing::warn!("state verification failed; possible CSRF or replay");
            return Err(OAuthError::StateVerification(format!(
                "Invalid state returned from OAuth server, state '{state}' does not match stored value"
            )));
        }
        Ok(())
    }
}
