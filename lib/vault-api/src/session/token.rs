use super::{AuthMethod, TokenInfo};
use crate::client::VaultClient;
use crate::error::Result;
use async_trait::async_trait;

/// A token handed in from outside (VAULT_TOKEN, a file, a wrapped response)
pub struct StaticTokenAuth {
    token: String,
}

impl StaticTokenAuth {
    pub fn new(token: String) -> Self {
        Self { token }
    }
}

#[async_trait]
impl AuthMethod for StaticTokenAuth {
    async fn authenticate(&self, _client: &VaultClient) -> Result<TokenInfo> {
        Ok(TokenInfo::static_token(self.token.clone()))
    }

    fn supports_renewal(&self) -> bool {
        false
    }
}
