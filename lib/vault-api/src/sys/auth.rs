use crate::client::{ApiRequest, VaultClient};
use crate::error::Result;
use crate::models::{ListingVisibility, TokenType};
use crate::path;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const SYS_AUTH_PATH: &str = "sys/auth";

#[derive(Debug, Clone, Default, Serialize)]
pub struct AuthMountConfigPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_lease_ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_lease_ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_non_hmac_request_keys: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_non_hmac_response_keys: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_visibility: Option<ListingVisibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passthrough_request_headers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_response_headers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EnableAuthMethodPayload {
    #[serde(rename = "type")]
    pub method_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<AuthMountConfigPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seal_wrap: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<HashMap<String, String>>,
}

impl EnableAuthMethodPayload {
    pub fn new(method_type: impl Into<String>) -> Self {
        Self {
            method_type: method_type.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthMountConfig {
    #[serde(default)]
    pub default_lease_ttl: u64,
    #[serde(default)]
    pub max_lease_ttl: u64,
    #[serde(default)]
    pub force_no_cache: bool,
    #[serde(default)]
    pub token_type: Option<TokenType>,
    #[serde(default)]
    pub listing_visibility: Option<ListingVisibility>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub audit_non_hmac_request_keys: Vec<String>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub audit_non_hmac_response_keys: Vec<String>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub passthrough_request_headers: Vec<String>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub allowed_response_headers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthMethodInfo {
    #[serde(rename = "type")]
    pub method_type: String,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub accessor: String,
    #[serde(default)]
    pub config: AuthMountConfig,
    #[serde(default)]
    pub local: bool,
    #[serde(default)]
    pub seal_wrap: bool,
    #[serde(default)]
    pub external_entropy_access: bool,
    #[serde(default)]
    pub options: Option<HashMap<String, String>>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub uuid: String,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub plugin_version: String,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub running_plugin_version: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthMethodTuning {
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub description: String,
    #[serde(default)]
    pub default_lease_ttl: u64,
    #[serde(default)]
    pub max_lease_ttl: u64,
    #[serde(default)]
    pub force_no_cache: bool,
    #[serde(default)]
    pub token_type: Option<TokenType>,
    #[serde(default)]
    pub listing_visibility: Option<ListingVisibility>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub audit_non_hmac_request_keys: Vec<String>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub audit_non_hmac_response_keys: Vec<String>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub passthrough_request_headers: Vec<String>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub allowed_response_headers: Vec<String>,
    #[serde(default)]
    pub user_lockout_config: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TuneAuthMethodPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_lease_ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_lease_ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_non_hmac_request_keys: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_non_hmac_response_keys: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_visibility: Option<ListingVisibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passthrough_request_headers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_response_headers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<TokenType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_version: Option<String>,
}

/// Enable, inspect and tune auth methods
pub struct AuthMethods<'a> {
    client: &'a VaultClient,
}

impl<'a> AuthMethods<'a> {
    pub(crate) fn new(client: &'a VaultClient) -> Self {
        Self { client }
    }

    /// Enabled methods keyed by mount path (with trailing `/`)
    pub async fn list(&self) -> Result<HashMap<String, AuthMethodInfo>> {
        self.client.send_data(ApiRequest::get(SYS_AUTH_PATH)).await
    }

    pub async fn enable(&self, mount: &str, payload: &EnableAuthMethodPayload) -> Result<()> {
        let request = ApiRequest::post(path::join(SYS_AUTH_PATH, path::name("mount", mount)?)).json(payload)?;
        self.client.send_unit(request).await
    }

    pub async fn read(&self, mount: &str) -> Result<AuthMethodInfo> {
        let request = ApiRequest::get(path::join(SYS_AUTH_PATH, path::name("mount", mount)?));
        self.client.send_data(request).await
    }

    pub async fn disable(&self, mount: &str) -> Result<()> {
        let request = ApiRequest::delete(path::join(SYS_AUTH_PATH, path::name("mount", mount)?));
        self.client.send_unit(request).await
    }

    pub async fn read_tuning(&self, mount: &str) -> Result<AuthMethodTuning> {
        let request = ApiRequest::get(path::join_all([SYS_AUTH_PATH, path::name("mount", mount)?, "tune"]));
        self.client.send_data(request).await
    }

    pub async fn tune(&self, mount: &str, payload: &TuneAuthMethodPayload) -> Result<()> {
        let request =
            ApiRequest::post(path::join_all([SYS_AUTH_PATH, path::name("mount", mount)?, "tune"])).json(payload)?;
        self.client.send_unit(request).await
    }
}
