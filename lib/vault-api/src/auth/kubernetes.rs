use super::mount_path;
use crate::client::{ApiRequest, VaultClient};
use crate::error::Result;
use crate::models::{AuthInfo, TokenParams, TokenSettings};
use crate::path;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize)]
pub struct KubernetesConfigPayload {
    pub kubernetes_host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubernetes_ca_cert: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_reviewer_jwt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pem_keys: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_local_ca_jwt: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_annotations_as_alias_metadata: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KubernetesConfig {
    pub kubernetes_host: String,
    #[serde(default)]
    pub kubernetes_ca_cert: Option<String>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub pem_keys: Vec<String>,
    #[serde(default)]
    pub disable_local_ca_jwt: bool,
    #[serde(default)]
    pub use_annotations_as_alias_metadata: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct KubernetesRolePayload {
    pub bound_service_account_names: Vec<String>,
    pub bound_service_account_namespaces: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    /// `serviceaccount_uid` or `serviceaccount_name`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_name_source: Option<String>,
    #[serde(flatten)]
    pub token: TokenParams,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KubernetesRole {
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub bound_service_account_names: Vec<String>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub bound_service_account_namespaces: Vec<String>,
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default)]
    pub alias_name_source: Option<String>,
    #[serde(flatten)]
    pub token: TokenSettings,
}

#[derive(Serialize)]
struct LoginRequest<'r> {
    role: &'r str,
    jwt: &'r str,
}

/// Kubernetes auth backend
pub struct Kubernetes<'a> {
    client: &'a VaultClient,
    path: String,
}

impl<'a> Kubernetes<'a> {
    pub(crate) fn new(client: &'a VaultClient, mount: &str) -> Self {
        Self {
            client,
            path: mount_path(mount),
        }
    }

    pub fn with_mount(self, mount: &str) -> Self {
        Self::new(self.client, mount)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub async fn configure(&self, payload: &KubernetesConfigPayload) -> Result<()> {
        let request = ApiRequest::post(path::join(&self.path, "config")).json(payload)?;
        self.client.send_unit(request).await
    }

    pub async fn read_config(&self) -> Result<KubernetesConfig> {
        let request = ApiRequest::get(path::join(&self.path, "config"));
        self.client.send_data(request).await
    }

    pub async fn create_or_update_role(
        &self,
        role_name: &str,
        payload: &KubernetesRolePayload,
    ) -> Result<()> {
        let request =
            ApiRequest::post(path::join_all([self.path.as_str(), "role", path::name("role", role_name)?])).json(payload)?;
        self.client.send_unit(request).await
    }

    pub async fn read_role(&self, role_name: &str) -> Result<KubernetesRole> {
        let request = ApiRequest::get(path::join_all([self.path.as_str(), "role", path::name("role", role_name)?]));
        self.client.send_data(request).await
    }

    pub async fn list_roles(&self) -> Result<Vec<String>> {
        let request = ApiRequest::list(path::join(&self.path, "role"));
        self.client.send_list(request).await
    }

    pub async fn delete_role(&self, role_name: &str) -> Result<()> {
        let request = ApiRequest::delete(path::join_all([self.path.as_str(), "role", path::name("role", role_name)?]));
        self.client.send_unit(request).await
    }

    /// Exchange a service account JWT for a Vault token and store it on the
    /// client.
    pub async fn login(&self, role: &str, jwt: &str) -> Result<AuthInfo> {
        let request =
            ApiRequest::post(path::join(&self.path, "login")).json(&LoginRequest { role, jwt })?;
        self.client.send_login(request).await
    }
}
