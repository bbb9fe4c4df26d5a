use super::{AuthMethod, TokenInfo};
use crate::client::VaultClient;
use crate::error::Result;
use async_trait::async_trait;

/// Machine login with a role ID and optional secret ID
pub struct AppRoleAuth {
    pub mount: String,
    pub role_id: String,
    pub secret_id: Option<String>,
}

impl AppRoleAuth {
    pub fn new(role_id: String, secret_id: Option<String>) -> Self {
        Self {
            mount: "approle".to_string(),
            role_id,
            secret_id,
        }
    }

    pub fn with_mount(mut self, mount: String) -> Self {
        self.mount = mount;
        self
    }
}

#[async_trait]
impl AuthMethod for AppRoleAuth {
    async fn authenticate(&self, client: &VaultClient) -> Result<TokenInfo> {
        let auth = client
            .auth()
            .approle()
            .with_mount(&self.mount)
            .login(&self.role_id, self.secret_id.as_deref())
            .await?;
        Ok(TokenInfo::from_auth(&auth))
    }

    fn supports_renewal(&self) -> bool {
        true
    }
}

pub struct UserpassAuth {
    pub mount: String,
    pub username: String,
    password: String,
}

impl UserpassAuth {
    pub fn new(username: String, password: String) -> Self {
        Self {
            mount: "userpass".to_string(),
            username,
            password,
        }
    }

    pub fn with_mount(mut self, mount: String) -> Self {
        self.mount = mount;
        self
    }
}

#[async_trait]
impl AuthMethod for UserpassAuth {
    async fn authenticate(&self, client: &VaultClient) -> Result<TokenInfo> {
        let auth = client
            .auth()
            .userpass()
            .with_mount(&self.mount)
            .login(&self.username, &self.password)
            .await?;
        Ok(TokenInfo::from_auth(&auth))
    }

    fn supports_renewal(&self) -> bool {
        true
    }
}
