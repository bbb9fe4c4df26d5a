use super::{AuthMethod, TokenInfo};
use crate::client::VaultClient;
use crate::error::{Result, VaultError};
use async_trait::async_trait;

const DEFAULT_JWT_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";

/// Log in with the pod's service account token
pub struct KubernetesAuth {
    pub mount: String,
    pub role: String,
    pub jwt_path: String,
}

impl KubernetesAuth {
    pub fn new(mount: String, role: String) -> Self {
        Self {
            mount,
            role,
            jwt_path: DEFAULT_JWT_PATH.to_string(),
        }
    }

    pub fn with_jwt_path(mut self, path: String) -> Self {
        self.jwt_path = path;
        self
    }

    fn read_jwt(&self) -> Result<String> {
        std::fs::read_to_string(&self.jwt_path)
            .map(|s| s.trim().to_string())
            .map_err(|e| {
                VaultError::KubernetesError(format!(
                    "Failed to read JWT from {}: {}",
                    self.jwt_path, e
                ))
            })
    }
}

#[async_trait]
impl AuthMethod for KubernetesAuth {
    async fn authenticate(&self, client: &VaultClient) -> Result<TokenInfo> {
        let jwt = self.read_jwt()?;
        let auth = client
            .auth()
            .kubernetes()
            .with_mount(&self.mount)
            .login(&self.role, &jwt)
            .await?;
        Ok(TokenInfo::from_auth(&auth))
    }

    fn supports_renewal(&self) -> bool {
        true
    }
}
