use crate::client::{ApiRequest, VaultClient};
use crate::error::Result;
use crate::path;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const OIDC_PATH: &str = "identity/oidc";

#[derive(Debug, Clone, Default, Serialize)]
pub struct OidcKeyPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_client_ids: Option<Vec<String>>,
    /// RS256, RS384, RS512, ES256, ES384, ES512 or EdDSA
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OidcKey {
    pub algorithm: String,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub allowed_client_ids: Vec<String>,
    pub rotation_period: u64,
    pub verification_ttl: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OidcAssignment {
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub entity_ids: Vec<String>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub group_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OidcScope {
    /// JSON template, base64 or plain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OidcClientType {
    Confidential,
    Public,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OidcClientPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uris: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignments: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_type: Option<OidcClientType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token_ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token_ttl: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OidcClient {
    pub client_id: String,
    /// Absent for public clients
    #[serde(default)]
    pub client_secret: Option<String>,
    pub key: String,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub redirect_uris: Vec<String>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub assignments: Vec<String>,
    pub client_type: OidcClientType,
    #[serde(default)]
    pub id_token_ttl: u64,
    #[serde(default)]
    pub access_token_ttl: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OidcProviderPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_client_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes_supported: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OidcProviderInfo {
    pub issuer: String,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub allowed_client_ids: Vec<String>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub scopes_supported: Vec<String>,
}

/// `.well-known/openid-configuration` of a provider
#[derive(Debug, Clone, Deserialize)]
pub struct OidcDiscovery {
    pub issuer: String,
    pub jwks_uri: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
    #[serde(default)]
    pub request_parameter_supported: bool,
    #[serde(default)]
    pub request_uri_parameter_supported: bool,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub id_token_signing_alg_values_supported: Vec<String>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub response_types_supported: Vec<String>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub scopes_supported: Vec<String>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub subject_types_supported: Vec<String>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub grant_types_supported: Vec<String>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub token_endpoint_auth_methods_supported: Vec<String>,
}

/// OIDC identity provider objects: keys, assignments, scopes, clients and
/// providers. Every kind lives at `identity/oidc/<kind>/<name>`.
pub struct OidcProvider<'a> {
    client: &'a VaultClient,
}

impl<'a> OidcProvider<'a> {
    pub(crate) fn new(client: &'a VaultClient) -> Self {
        Self { client }
    }

    fn object_path(kind: &str, name: &str) -> String {
        path::join_all([OIDC_PATH, kind, name])
    }

    /// Path of one named object; the name must not be empty
    fn named_path(kind: &'static str, name: &str) -> Result<String> {
        Ok(Self::object_path(kind, path::name(kind, name)?))
    }

    async fn write<P: Serialize>(&self, kind: &'static str, name: &str, payload: &P) -> Result<()> {
        let request = ApiRequest::post(Self::named_path(kind, name)?).json(payload)?;
        self.client.send_unit(request).await
    }

    async fn read<D: DeserializeOwned>(&self, kind: &'static str, name: &str) -> Result<D> {
        let request = ApiRequest::get(Self::named_path(kind, name)?);
        self.client.send_data(request).await
    }

    async fn list(&self, kind: &str) -> Result<Vec<String>> {
        let request = ApiRequest::list(Self::object_path(kind, ""));
        self.client.send_list(request).await
    }

    async fn delete(&self, kind: &'static str, name: &str) -> Result<()> {
        let request = ApiRequest::delete(Self::named_path(kind, name)?);
        self.client.send_unit(request).await
    }

    pub async fn create_or_update_key(&self, name: &str, payload: &OidcKeyPayload) -> Result<()> {
        self.write("key", name, payload).await
    }

    pub async fn read_key(&self, name: &str) -> Result<OidcKey> {
        self.read("key", name).await
    }

    pub async fn list_keys(&self) -> Result<Vec<String>> {
        self.list("key").await
    }

    pub async fn delete_key(&self, name: &str) -> Result<()> {
        self.delete("key", name).await
    }

    /// Rotate a key now. Old public keys stay published for
    /// `verification_ttl`, or the key's own setting when `None`.
    pub async fn rotate_key(&self, name: &str, verification_ttl: Option<&str>) -> Result<()> {
        let mut request = ApiRequest::post(path::join(&Self::named_path("key", name)?, "rotate"));
        if let Some(ttl) = verification_ttl {
            request = request.json(&serde_json::json!({ "verification_ttl": ttl }))?;
        }
        self.client.send_unit(request).await
    }

    pub async fn create_or_update_assignment(
        &self,
        name: &str,
        assignment: &OidcAssignment,
    ) -> Result<()> {
        self.write("assignment", name, assignment).await
    }

    pub async fn read_assignment(&self, name: &str) -> Result<OidcAssignment> {
        self.read("assignment", name).await
    }

    pub async fn list_assignments(&self) -> Result<Vec<String>> {
        self.list("assignment").await
    }

    pub async fn delete_assignment(&self, name: &str) -> Result<()> {
        self.delete("assignment", name).await
    }

    pub async fn create_or_update_scope(&self, name: &str, scope: &OidcScope) -> Result<()> {
        self.write("scope", name, scope).await
    }

    pub async fn read_scope(&self, name: &str) -> Result<OidcScope> {
        self.read("scope", name).await
    }

    pub async fn list_scopes(&self) -> Result<Vec<String>> {
        self.list("scope").await
    }

    pub async fn delete_scope(&self, name: &str) -> Result<()> {
        self.delete("scope", name).await
    }

    pub async fn create_or_update_client(&self, name: &str, payload: &OidcClientPayload) -> Result<()> {
        self.write("client", name, payload).await
    }

    pub async fn read_client(&self, name: &str) -> Result<OidcClient> {
        self.read("client", name).await
    }

    pub async fn list_clients(&self) -> Result<Vec<String>> {
        self.list("client").await
    }

    pub async fn delete_client(&self, name: &str) -> Result<()> {
        self.delete("client", name).await
    }

    pub async fn create_or_update_provider(
        &self,
        name: &str,
        payload: &OidcProviderPayload,
    ) -> Result<()> {
        self.write("provider", name, payload).await
    }

    pub async fn read_provider(&self, name: &str) -> Result<OidcProviderInfo> {
        self.read("provider", name).await
    }

    pub async fn list_providers(&self) -> Result<Vec<String>> {
        self.list("provider").await
    }

    pub async fn delete_provider(&self, name: &str) -> Result<()> {
        self.delete("provider", name).await
    }

    /// Unauthenticated discovery document; not wrapped in the usual envelope
    pub async fn read_provider_discovery(&self, name: &str) -> Result<OidcDiscovery> {
        let request = ApiRequest::get(path::join(
            &Self::named_path("provider", name)?,
            ".well-known/openid-configuration",
        ));
        self.client.send(request).await
    }
}
