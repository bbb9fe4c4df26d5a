use crate::client::{ApiRequest, VaultClient};
use crate::error::Result;
use crate::models::AuditDeviceType;
use crate::path;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const AUDIT_PATH: &str = "sys/audit";
const AUDIT_HASH_PATH: &str = "sys/audit-hash";

#[derive(Debug, Clone, Deserialize)]
pub struct AuditDevice {
    #[serde(rename = "type")]
    pub device_type: AuditDeviceType,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub options: HashMap<String, String>,
    #[serde(default)]
    pub local: bool,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnableAuditPayload {
    #[serde(rename = "type")]
    pub device_type: AuditDeviceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Device specific, e.g. `file_path` for `file`
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub options: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local: Option<bool>,
}

impl EnableAuditPayload {
    pub fn new(device_type: AuditDeviceType) -> Self {
        Self {
            device_type,
            description: None,
            options: HashMap::new(),
            local: None,
        }
    }
}

#[derive(Deserialize)]
struct HashData {
    hash: String,
}

/// Audit device management
pub struct Audit<'a> {
    client: &'a VaultClient,
}

impl<'a> Audit<'a> {
    pub(crate) fn new(client: &'a VaultClient) -> Self {
        Self { client }
    }

    /// Enabled devices keyed by path (with trailing `/`)
    pub async fn list(&self) -> Result<HashMap<String, AuditDevice>> {
        self.client.send_data(ApiRequest::get(AUDIT_PATH)).await
    }

    pub async fn enable(&self, device_path: &str, payload: &EnableAuditPayload) -> Result<()> {
        let request = ApiRequest::post(path::join(AUDIT_PATH, path::name("audit device", device_path)?)).json(payload)?;
        self.client.send_unit(request).await
    }

    pub async fn disable(&self, device_path: &str) -> Result<()> {
        let request = ApiRequest::delete(path::join(AUDIT_PATH, path::name("audit device", device_path)?));
        self.client.send_unit(request).await
    }

    /// Hash `input` with the device's salt, as it would appear in its log
    pub async fn calculate_hash(&self, device_path: &str, input: &str) -> Result<String> {
        let request = ApiRequest::post(path::join(AUDIT_HASH_PATH, path::name("audit device", device_path)?))
            .json(&serde_json::json!({ "input": input }))?;
        let data: HashData = self.client.send_data(request).await?;
        Ok(data.hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_payload() {
        let mut payload = EnableAuditPayload::new(AuditDeviceType::File);
        payload
            .options
            .insert("file_path".to_string(), "/var/log/vault_audit.log".to_string());
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "file", "options": {"file_path": "/var/log/vault_audit.log"}})
        );
    }

    #[test]
    fn test_enable_payload_without_options() {
        let json = serde_json::to_value(EnableAuditPayload::new(AuditDeviceType::Syslog)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "syslog"}));
    }
}
