//! vault-api - typed client for the HashiCorp Vault HTTP API
//!
//! ```no_run
//! # async fn run() -> vault_api::Result<()> {
//! let client = vault_api::VaultClient::builder()
//!     .address("https://vault.example.com:8200")
//!     .build()?;
//! client.auth().approle().login("role-id", Some("secret-id")).await?;
//! let secret: vault_api::secret::KvData = client.secret().kv2().read("app/db", None).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
mod client;
mod error;
pub mod identity;
mod models;
pub mod path;
pub mod secret;
pub mod session;
pub mod sys;

pub use client::{ApiRequest, VaultClient, VaultClientBuilder};
pub use error::{Result, VaultError};
pub use models::{
    AuditDeviceType, AuthInfo, ErrorResponse, ListData, ListingVisibility, TokenParams,
    TokenSettings, TokenType, VaultResponse, WrapInfo,
};
