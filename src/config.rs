//! Configuration contract supplied by the integrator.

/// Read-only settings every controller needs. Implemented by the consumer of
/// this crate; no ambient or global configuration lookup exists anywhere in
/// the core, so every value flows through this trait.
pub trait ConfigProvider: Send + Sync {
    /// OAuth2 client ID registered with the authorization server.
    fn client_id(&self) -> String;

    /// OAuth2 client secret. Only ever sent server-to-server; the whole
    /// point of this proxy is that browsers never see it.
    fn client_secret(&self) -> String;

    /// Static long-lived token identifying the proxy itself, used only for
    /// token revocation. May be empty if logout is not wired up.
    fn client_credentials_token(&self) -> String;

    /// Authorization server origin, without a trailing slash.
    fn auth_server_host(&self) -> String;

    /// The client application URL the browser is redirected back to after
    /// the authorization-code flow finishes, successfully or not.
    fn client_app_url(&self) -> String;

    /// This proxy's own callback URL, registered as a `redirect_uri` with
    /// the authorization server.
    fn auth_code_callback_url(&self) -> String;

    /// Custom cookie domain, or `None` for the default.
    fn cookie_domain(&self) -> Option<String>;

    /// Prefix for cookie names; lets multiple proxies share one domain.
    /// Empty by default.
    fn cookie_key_prefix(&self) -> String {
        String::new()
    }

    /// Salt for the default encryption provider.
    fn encryption_salt(&self) -> String;
}

/// Plain-struct config for integrators who keep settings in code or load
/// them from their own source, and for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticConfig {
    pub client_id: String,
    pub client_secret: String,
    pub client_credentials_token: String,
    pub auth_server_host: String,
    pub client_app_url: String,
    pub auth_code_callback_url: String,
    pub cookie_domain: Option<String>,
    pub cookie_key_prefix: String,
    pub encryption_salt: String,
}

impl ConfigProvider for StaticConfig {
    fn client_id(&self) -> String {
        self.client_id.clone()
    }

    fn client_secret(&self) -> String {
        self.client_secret.clone()
    }

    fn client_credentials_token(&self) -> String {
        self.client_credentials_token.clone()
    }

    fn auth_server_host(&self) -> String {
        self.auth_server_host.clone()
    }

    fn client_app_url(&self) -> String {
        self.client_app_url.clone()
    }

    fn auth_code_callback_url(&self) -> String {
        self.auth_code_callback_url.clone()
    }

    fn cookie_domain(&self) -> Option<String> {
        self.cookie_domain.clone()
    }

    fn cookie_key_prefix(&self) -> String {
        self.cookie_key_prefix.clone()
    }

    fn encryption_salt(&self) -> String {
        self.encryption_salt.clone()
    }
}
