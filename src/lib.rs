//! tokengate — backend-for-frontend OAuth2 proxy core.
//!
//! Shields a client-secret-bearing OAuth2 exchange behind a server
//! component so browser and mobile clients never see the secret. Provides
//! the grant-flow controllers (authorization code, device code, refresh
//! token, logout), CSRF state verification, and encrypted at-rest storage
//! for refresh tokens. The HTTP routing layer, CORS, and cookie I/O
//! primitives belong to the integrator.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokengate::config::StaticConfig;
//! use tokengate::controllers::DeviceCodeController;
//! use tokengate::storage::{MemoryStorage, SecureStorage};
//!
//! # async fn example() -> tokengate::error::Result<()> {
//! let config = Arc::new(StaticConfig {
//!     client_id: "client-id".into(),
//!     client_secret: "client-secret".into(),
//!     auth_server_host: "https://authorization.example.org".into(),
//!     encryption_salt: "long-random-salt".into(),
//!     ..Default::default()
//! });
//! let controller = DeviceCodeController::new(None)
//!     .set_config_provider(config)
//!     .set_secure_storage_provider(SecureStorage::custom(Arc::new(MemoryStorage::new())));
//! let device_code = controller
//!     .start_device_code_grant(&["identity.readonly".to_string()])
//!     .await?;
//! // show device_code.user_code() and device_code.verification_uri(),
//! // then poll poll_device_code_grant() until the user has logged in
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controllers;
pub mod encryption;
pub mod error;
pub mod http;
pub mod models;
pub mod storage;

pub mod prelude;
