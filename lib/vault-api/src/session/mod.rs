//! Login methods and token lifecycle on top of the auth backends.

mod kubernetes;
mod login;
mod manager;
mod oidc;
mod oidc_cache;
mod token;
mod token_info;

pub use kubernetes::KubernetesAuth;
pub use login::{AppRoleAuth, UserpassAuth};
pub use manager::{TokenManager, TokenManagerConfig};
pub use oidc::OidcAuth;
pub use oidc_cache::OidcCache;
pub use token::StaticTokenAuth;
pub use token_info::TokenInfo;

use crate::client::VaultClient;
use crate::error::Result;
use async_trait::async_trait;

/// Trait for authentication methods
#[async_trait]
pub trait AuthMethod: Send + Sync {
    /// Obtain a token. Implementations may store it on the client.
    async fn authenticate(&self, client: &VaultClient) -> Result<TokenInfo>;

    /// Whether the issued token should be kept alive via renew-self
    fn supports_renewal(&self) -> bool;
}
