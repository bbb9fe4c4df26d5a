use super::mount_path;
use crate::client::{ApiRequest, VaultClient};
use crate::error::Result;
use crate::models::{AuthInfo, TokenParams, TokenSettings};
use crate::path;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize)]
pub struct AppRolePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_secret_id: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_id_bound_cidrs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_id_num_uses: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_id_ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_secret_ids: Option<bool>,
    #[serde(flatten)]
    pub token: TokenParams,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppRoleInfo {
    #[serde(default)]
    pub bind_secret_id: bool,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub secret_id_bound_cidrs: Vec<String>,
    #[serde(default)]
    pub secret_id_num_uses: u64,
    #[serde(default)]
    pub secret_id_ttl: u64,
    #[serde(default)]
    pub local_secret_ids: bool,
    #[serde(flatten)]
    pub token: TokenSettings,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerateSecretIdPayload {
    /// Stored by Vault as a JSON-encoded string
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "metadata_as_string"
    )]
    pub metadata: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidr_list: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_bound_cidrs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_uses: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
}

fn metadata_as_string<S: Serializer>(
    metadata: &Option<HashMap<String, String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match metadata {
        Some(map) => {
            let encoded = serde_json::to_string(map).map_err(serde::ser::Error::custom)?;
            serializer.serialize_str(&encoded)
        }
        None => serializer.serialize_none(),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedSecretId {
    pub secret_id: String,
    pub secret_id_accessor: String,
    #[serde(default)]
    pub secret_id_ttl: u64,
    #[serde(default)]
    pub secret_id_num_uses: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecretIdInfo {
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub cidr_list: Vec<String>,
    pub creation_time: String,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub expiration_time: String,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub last_updated_time: String,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub metadata: HashMap<String, String>,
    pub secret_id_accessor: String,
    #[serde(default)]
    pub secret_id_num_uses: u64,
    #[serde(default)]
    pub secret_id_ttl: u64,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub token_bound_cidrs: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RoleIdData {
    role_id: String,
}

#[derive(Serialize)]
struct LoginRequest<'r> {
    role_id: &'r str,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret_id: Option<&'r str>,
}

/// AppRole auth backend
pub struct AppRole<'a> {
    client: &'a VaultClient,
    path: String,
}

impl<'a> AppRole<'a> {
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

    fn role_path(&self, role_name: &str, sub: &str) -> Result<String> {
        let role_name = path::name("role", role_name)?;
        Ok(path::join_all([self.path.as_str(), "role", role_name, sub]))
    }

    pub async fn list_roles(&self) -> Result<Vec<String>> {
        let request = ApiRequest::list(path::join(&self.path, "role"));
        self.client.send_list(request).await
    }

    pub async fn create_or_update_role(
        &self,
        role_name: &str,
        payload: &AppRolePayload,
    ) -> Result<()> {
        let request = ApiRequest::post(self.role_path(role_name, "")?).json(payload)?;
        self.client.send_unit(request).await
    }

    pub async fn read_role(&self, role_name: &str) -> Result<AppRoleInfo> {
        let request = ApiRequest::get(self.role_path(role_name, "")?);
        self.client.send_data(request).await
    }

    pub async fn delete_role(&self, role_name: &str) -> Result<()> {
        let request = ApiRequest::delete(self.role_path(role_name, "")?);
        self.client.send_unit(request).await
    }

    pub async fn read_role_id(&self, role_name: &str) -> Result<String> {
        let request = ApiRequest::get(self.role_path(role_name, "role-id")?);
        let data: RoleIdData = self.client.send_data(request).await?;
        Ok(data.role_id)
    }

    pub async fn update_role_id(&self, role_name: &str, role_id: &str) -> Result<()> {
        let request = ApiRequest::post(self.role_path(role_name, "role-id")?)
            .json(&serde_json::json!({ "role_id": role_id }))?;
        self.client.send_unit(request).await
    }

    pub async fn generate_secret_id(
        &self,
        role_name: &str,
        payload: &GenerateSecretIdPayload,
    ) -> Result<GeneratedSecretId> {
        let request = ApiRequest::post(self.role_path(role_name, "secret-id")?).json(payload)?;
        self.client.send_data(request).await
    }

    /// Accessors of every secret ID issued for the role
    pub async fn list_secret_id_accessors(&self, role_name: &str) -> Result<Vec<String>> {
        let request = ApiRequest::list(self.role_path(role_name, "secret-id")?);
        self.client.send_list(request).await
    }

    pub async fn lookup_secret_id(&self, role_name: &str, secret_id: &str) -> Result<SecretIdInfo> {
        let request = ApiRequest::post(self.role_path(role_name, "secret-id/lookup")?)
            .json(&serde_json::json!({ "secret_id": secret_id }))?;
        self.client.send_data(request).await
    }

    pub async fn destroy_secret_id(&self, role_name: &str, secret_id: &str) -> Result<()> {
        let request = ApiRequest::post(self.role_path(role_name, "secret-id/destroy")?)
            .json(&serde_json::json!({ "secret_id": secret_id }))?;
        self.client.send_unit(request).await
    }

    pub async fn lookup_secret_id_accessor(
        &self,
        role_name: &str,
        accessor: &str,
    ) -> Result<SecretIdInfo> {
        let request = ApiRequest::post(self.role_path(role_name, "secret-id-accessor/lookup")?)
            .json(&serde_json::json!({ "secret_id_accessor": accessor }))?;
        self.client.send_data(request).await
    }

    pub async fn destroy_secret_id_accessor(&self, role_name: &str, accessor: &str) -> Result<()> {
        let request = ApiRequest::post(self.role_path(role_name, "secret-id-accessor/destroy")?)
            .json(&serde_json::json!({ "secret_id_accessor": accessor }))?;
        self.client.send_unit(request).await
    }

    /// Clean up expired secret IDs and their accessors
    pub async fn tidy(&self) -> Result<()> {
        let request = ApiRequest::post(path::join(&self.path, "tidy/secret-id"));
        self.client.send_unit(request).await
    }

    /// Log in and store the issued token on the client. `secret_id` may be
    /// omitted for roles created with `bind_secret_id = false`.
    pub async fn login(&self, role_id: &str, secret_id: Option<&str>) -> Result<AuthInfo> {
        let request = ApiRequest::post(path::join(&self.path, "login"))
            .json(&LoginRequest { role_id, secret_id })?;
        self.client.send_login(request).await
    }
}
