use crate::client::{ApiRequest, VaultClient};
use crate::error::Result;
use crate::models::{AuthInfo, TokenType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const TOKEN_PATH: &str = "auth/token";

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateTokenPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policies: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_parent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_default_policy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renewable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explicit_max_ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_uses: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub token_type: Option<TokenType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_alias: Option<String>,
}

/// Result of a token lookup
#[derive(Debug, Clone, Deserialize)]
pub struct TokenLookup {
    pub accessor: String,
    #[serde(default)]
    pub creation_time: u64,
    #[serde(default)]
    pub creation_ttl: u64,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub display_name: String,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub entity_id: String,
    #[serde(default)]
    pub expire_time: Option<String>,
    #[serde(default)]
    pub explicit_max_ttl: u64,
    pub id: String,
    #[serde(default)]
    pub issue_time: Option<String>,
    #[serde(default)]
    pub meta: Option<HashMap<String, String>>,
    #[serde(default)]
    pub num_uses: u64,
    #[serde(default)]
    pub orphan: bool,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub path: String,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub policies: Vec<String>,
    #[serde(default)]
    pub renewable: bool,
    #[serde(default)]
    pub ttl: u64,
    #[serde(rename = "type", default)]
    pub token_type: Option<TokenType>,
}

/// Token auth backend, scoped to the client's own token
pub struct Token<'a> {
    client: &'a VaultClient,
}

impl<'a> Token<'a> {
    pub(crate) fn new(client: &'a VaultClient) -> Self {
        Self { client }
    }

    pub async fn lookup_self(&self) -> Result<TokenLookup> {
        let request = ApiRequest::get(format!("{TOKEN_PATH}/lookup-self"));
        self.client.send_data(request).await
    }

    /// Renew the client's token. The returned auth block carries the token
    /// and its new lease; the client token itself is unchanged.
    pub async fn renew_self(&self, increment: Option<&str>) -> Result<AuthInfo> {
        let mut request = ApiRequest::post(format!("{TOKEN_PATH}/renew-self"));
        if let Some(increment) = increment {
            request = request.json(&serde_json::json!({ "increment": increment }))?;
        }
        self.client.send_auth(request).await
    }

    /// Revoke the client's token and forget it.
    pub async fn revoke_self(&self) -> Result<()> {
        let request = ApiRequest::post(format!("{TOKEN_PATH}/revoke-self"));
        self.client.send_unit(request).await?;
        self.client.set_token(None).await;
        Ok(())
    }

    /// Create a child token. The client keeps using its own token.
    pub async fn create(&self, payload: &CreateTokenPayload) -> Result<AuthInfo> {
        let request = ApiRequest::post(format!("{TOKEN_PATH}/create")).json(payload)?;
        self.client.send_auth(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_payload_type_field() {
        let payload = CreateTokenPayload {
            policies: Some(vec!["default".to_string()]),
            token_type: Some(TokenType::Batch),
            ..Default::default()
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({"policies": ["default"], "type": "batch"}));
    }
}
