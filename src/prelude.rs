//! Convenience re-exports for common use.

pub use crate::config::{ConfigProvider, StaticConfig};
pub use crate::controllers::{
    AuthCodeController, DeviceCodeController, GeoHints, LogoutController, RefreshTokenController,
};
pub use crate::encryption::{CipherEncryption, CipherMethod, Encryption};
pub use crate::error::{OAuthError, Result};
pub use crate::http::{HttpTransport, ReqwestTransport};
pub use crate::models::{AccessToken, DeviceCode};
pub use crate::storage::{
    CookieJar, CookieStorage, MemoryStorage, SecureCookieStorage, SecureStorage, Storage,
};
