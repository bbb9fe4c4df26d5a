use super::mount_path;
use crate::client::{ApiRequest, VaultClient};
use crate::error::Result;
use crate::models::{AuthInfo, TokenParams, TokenSettings};
use crate::path;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JwtConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oidc_discovery_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oidc_discovery_ca_pem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oidc_client_id: Option<String>,
    /// Write-only, never returned on read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oidc_client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oidc_response_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oidc_response_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwks_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwks_ca_pem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt_validation_pubkeys: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound_issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt_supported_algs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_config: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_in_state: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JwtRoleType {
    Oidc,
    Jwt,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct JwtRolePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_type: Option<JwtRoleType>,
    pub user_claim: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bound_audiences: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_claim_json_pointer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock_skew_leeway: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_leeway: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_before_leeway: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bound_subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bound_claims: Option<HashMap<String, serde_json::Value>>,
    /// `string` or `glob`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bound_claims_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups_claim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_mappings: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oidc_scopes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_redirect_uris: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose_oidc_logging: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age: Option<String>,
    #[serde(flatten)]
    pub token: TokenParams,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtRole {
    pub role_type: JwtRoleType,
    pub user_claim: String,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub bound_audiences: Vec<String>,
    #[serde(default)]
    pub user_claim_json_pointer: bool,
    #[serde(default)]
    pub clock_skew_leeway: i64,
    #[serde(default)]
    pub expiration_leeway: i64,
    #[serde(default)]
    pub not_before_leeway: i64,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub bound_subject: String,
    #[serde(default)]
    pub bound_claims: Option<HashMap<String, serde_json::Value>>,
    #[serde(default)]
    pub bound_claims_type: Option<String>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub groups_claim: String,
    #[serde(default)]
    pub claim_mappings: Option<HashMap<String, String>>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub oidc_scopes: Vec<String>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub allowed_redirect_uris: Vec<String>,
    #[serde(default)]
    pub verbose_oidc_logging: bool,
    #[serde(default)]
    pub max_age: u64,
    #[serde(flatten)]
    pub token: TokenSettings,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OidcAuthUrlPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub redirect_uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_nonce: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OidcAuthUrl {
    pub auth_url: String,
}

impl OidcAuthUrl {
    /// The `state` query parameter Vault embedded in the authorization URL.
    pub fn state(&self) -> Option<String> {
        let url = reqwest::Url::parse(&self.auth_url).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "state")
            .map(|(_, value)| value.into_owned())
    }
}

#[derive(Debug, Clone, Default)]
pub struct OidcCallbackParams {
    pub state: String,
    pub code: String,
    pub nonce: Option<String>,
    pub client_nonce: Option<String>,
}

#[derive(Serialize)]
struct LoginRequest<'r> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'r str>,
    jwt: &'r str,
}

/// JWT/OIDC auth backend
pub struct Jwt<'a> {
    client: &'a VaultClient,
    path: String,
}

impl<'a> Jwt<'a> {
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

    pub async fn configure(&self, config: &JwtConfig) -> Result<()> {
        let request = ApiRequest::post(path::join(&self.path, "config")).json(config)?;
        self.client.send_unit(request).await
    }

    pub async fn read_config(&self) -> Result<JwtConfig> {
        let request = ApiRequest::get(path::join(&self.path, "config"));
        self.client.send_data(request).await
    }

    pub async fn create_or_update_role(&self, role_name: &str, payload: &JwtRolePayload) -> Result<()> {
        let request =
            ApiRequest::post(path::join_all([self.path.as_str(), "role", path::name("role", role_name)?])).json(payload)?;
        self.client.send_unit(request).await
    }

    pub async fn read_role(&self, role_name: &str) -> Result<JwtRole> {
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

    /// First step of the OIDC flow: obtain the provider authorization URL.
    pub async fn oidc_auth_url(&self, payload: &OidcAuthUrlPayload) -> Result<OidcAuthUrl> {
        let request = ApiRequest::post(path::join(&self.path, "oidc/auth_url")).json(payload)?;
        self.client.send_data(request).await
    }

    /// Final step of the OIDC flow: trade the provider's code for a Vault
    /// token, stored on the client.
    pub async fn oidc_callback(&self, params: &OidcCallbackParams) -> Result<AuthInfo> {
        let mut request = ApiRequest::get(path::join(&self.path, "oidc/callback"))
            .query("state", &params.state)
            .query("code", &params.code);
        if let Some(ref nonce) = params.nonce {
            request = request.query("nonce", nonce);
        }
        if let Some(ref client_nonce) = params.client_nonce {
            request = request.query("client_nonce", client_nonce);
        }
        self.client.send_login(request).await
    }

    /// Log in with a signed JWT. Without a role the backend's
    /// `default_role` applies.
    pub async fn login(&self, role: Option<&str>, jwt: &str) -> Result<AuthInfo> {
        let request =
            ApiRequest::post(path::join(&self.path, "login")).json(&LoginRequest { role, jwt })?;
        self.client.send_login(request).await
    }
}
