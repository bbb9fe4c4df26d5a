use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Vault plugins written in Go report unset lists, maps and strings as
/// `null`; decode those as the empty value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Standard Vault response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct VaultResponse<D> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub request_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lease_id: String,
    #[serde(default)]
    pub renewable: bool,
    #[serde(default)]
    pub lease_duration: u64,
    pub data: Option<D>,
    #[serde(default)]
    pub wrap_info: Option<WrapInfo>,
    #[serde(default)]
    pub warnings: Option<Vec<String>>,
    #[serde(default)]
    pub auth: Option<AuthInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WrapInfo {
    pub token: String,
    pub accessor: String,
    pub ttl: u64,
    pub creation_time: String,
    pub creation_path: String,
}

/// Token issued by a login or token-create call
#[derive(Debug, Clone, Deserialize)]
pub struct AuthInfo {
    pub client_token: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub accessor: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub policies: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub token_policies: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub identity_policies: Vec<String>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
    #[serde(default)]
    pub lease_duration: u64,
    #[serde(default)]
    pub renewable: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entity_id: String,
    #[serde(default)]
    pub token_type: Option<TokenType>,
    #[serde(default)]
    pub orphan: bool,
    #[serde(default)]
    pub num_uses: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub keys: Vec<String>,
}

/// Body Vault sends with every non-2xx status
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenType {
    Service,
    DefaultService,
    Batch,
    DefaultBatch,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditDeviceType {
    File,
    Socket,
    Syslog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingVisibility {
    Hidden,
    Unauth,
}

/// Token fields accepted by auth roles and users. Durations take Vault
/// duration strings such as `"1h"` or plain seconds.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TokenParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_max_ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_policies: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_bound_cidrs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_explicit_max_ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_no_default_policy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_num_uses: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<TokenType>,
}

/// Token fields as Vault returns them on read (durations in seconds)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenSettings {
    #[serde(default)]
    pub token_ttl: u64,
    #[serde(default)]
    pub token_max_ttl: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub token_policies: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub token_bound_cidrs: Vec<String>,
    #[serde(default)]
    pub token_explicit_max_ttl: u64,
    #[serde(default)]
    pub token_no_default_policy: bool,
    #[serde(default)]
    pub token_num_uses: u64,
    #[serde(default)]
    pub token_period: u64,
    #[serde(default)]
    pub token_type: Option<TokenType>,
}
