use crate::client::{ApiRequest, VaultClient};
use crate::error::Result;
use crate::path;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};

/// KV v2 secret data with version metadata
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct KvData<T = HashMap<String, serde_json::Value>> {
    pub data: T,
    pub metadata: KvVersion,
}

/// Version information for a secret
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvVersion {
    pub version: u64,
    pub created_time: DateTime<Utc>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub deletion_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub destroyed: bool,
    #[serde(default)]
    pub custom_metadata: Option<HashMap<String, String>>,
}

/// State of one version inside the metadata listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvVersionState {
    pub created_time: DateTime<Utc>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub deletion_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub destroyed: bool,
}

/// Full metadata for a secret including all versions
#[derive(Debug, Clone, Deserialize)]
pub struct KvMetadata {
    #[serde(default)]
    pub cas_required: bool,
    pub created_time: DateTime<Utc>,
    pub current_version: u64,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub delete_version_after: String,
    #[serde(default)]
    pub max_versions: u64,
    #[serde(default)]
    pub oldest_version: u64,
    pub updated_time: DateTime<Utc>,
    #[serde(default)]
    pub custom_metadata: Option<HashMap<String, String>>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub versions: BTreeMap<u64, KvVersionState>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct KvMetadataPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_versions: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cas_required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_version_after: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_metadata: Option<HashMap<String, String>>,
}

/// Engine-wide settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KvConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_versions: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cas_required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_version_after: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KvSubkeys {
    pub subkeys: serde_json::Value,
    pub metadata: KvVersion,
}

#[derive(Serialize)]
struct WriteRequest<'r, T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<WriteOptions>,
    data: &'r T,
}

#[derive(Serialize)]
struct WriteOptions {
    cas: u64,
}

#[derive(Serialize)]
struct VersionsRequest<'r> {
    versions: &'r [u64],
}

/// Vault reports "not deleted" as an empty string
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// KV v2 secret engine
pub struct Kv2<'a> {
    client: &'a VaultClient,
    path: String,
}

impl<'a> Kv2<'a> {
    pub(crate) fn new(client: &'a VaultClient, mount: &str) -> Self {
        Self {
            client,
            path: path::join("", mount),
        }
    }

    pub fn with_mount(self, mount: &str) -> Self {
        Self::new(self.client, mount)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn sub_path(&self, kind: &str, secret_path: &str) -> String {
        path::join_all([self.path.as_str(), kind, secret_path])
    }

    fn secret_path(&self, kind: &str, secret_path: &str) -> Result<String> {
        Ok(self.sub_path(kind, path::name("secret", secret_path)?))
    }

    pub async fn configure(&self, config: &KvConfig) -> Result<()> {
        let request = ApiRequest::post(path::join(&self.path, "config")).json(config)?;
        self.client.send_unit(request).await
    }

    pub async fn read_config(&self) -> Result<KvConfig> {
        let request = ApiRequest::get(path::join(&self.path, "config"));
        self.client.send_data(request).await
    }

    /// Read the latest version, or a specific one
    pub async fn read<T: DeserializeOwned>(
        &self,
        secret_path: &str,
        version: Option<u64>,
    ) -> Result<KvData<T>> {
        let mut request = ApiRequest::get(self.secret_path("data", secret_path)?);
        if let Some(version) = version {
            request = request.query("version", version);
        }
        self.client.send_data(request).await
    }

    /// Key structure of a secret with values replaced by null
    pub async fn read_subkeys(
        &self,
        secret_path: &str,
        version: Option<u64>,
        depth: Option<u32>,
    ) -> Result<KvSubkeys> {
        let mut request = ApiRequest::get(self.secret_path("subkeys", secret_path)?);
        if let Some(version) = version {
            request = request.query("version", version);
        }
        if let Some(depth) = depth {
            request = request.query("depth", depth);
        }
        self.client.send_data(request).await
    }

    /// Write a new version. With `cas`, the write only succeeds if the
    /// current version matches (0 means "must not exist").
    pub async fn write<T: Serialize>(
        &self,
        secret_path: &str,
        data: &T,
        cas: Option<u64>,
    ) -> Result<KvVersion> {
        let body = WriteRequest {
            options: cas.map(|cas| WriteOptions { cas }),
            data,
        };
        let request = ApiRequest::post(self.secret_path("data", secret_path)?).json(&body)?;
        self.client.send_data(request).await
    }

    /// Merge `data` into the latest version, creating a new version
    pub async fn patch<T: Serialize>(
        &self,
        secret_path: &str,
        data: &T,
        cas: Option<u64>,
    ) -> Result<KvVersion> {
        let body = WriteRequest {
            options: cas.map(|cas| WriteOptions { cas }),
            data,
        };
        let request = ApiRequest::merge_patch(self.secret_path("data", secret_path)?).json(&body)?;
        self.client.send_data(request).await
    }

    /// Soft-delete the latest version
    pub async fn delete_latest(&self, secret_path: &str) -> Result<()> {
        let request = ApiRequest::delete(self.secret_path("data", secret_path)?);
        self.client.send_unit(request).await
    }

    pub async fn delete_versions(&self, secret_path: &str, versions: &[u64]) -> Result<()> {
        let request = ApiRequest::post(self.secret_path("delete", secret_path)?)
            .json(&VersionsRequest { versions })?;
        self.client.send_unit(request).await
    }

    pub async fn undelete_versions(&self, secret_path: &str, versions: &[u64]) -> Result<()> {
        let request = ApiRequest::post(self.secret_path("undelete", secret_path)?)
            .json(&VersionsRequest { versions })?;
        self.client.send_unit(request).await
    }

    /// Permanently remove version data
    pub async fn destroy_versions(&self, secret_path: &str, versions: &[u64]) -> Result<()> {
        let request = ApiRequest::put(self.secret_path("destroy", secret_path)?)
            .json(&VersionsRequest { versions })?;
        self.client.send_unit(request).await
    }

    /// Keys under a folder; folders end with `/`
    pub async fn list(&self, folder: &str) -> Result<Vec<String>> {
        let request = ApiRequest::list(self.sub_path("metadata", folder));
        self.client.send_list(request).await
    }

    pub async fn read_metadata(&self, secret_path: &str) -> Result<KvMetadata> {
        let request = ApiRequest::get(self.secret_path("metadata", secret_path)?);
        self.client.send_data(request).await
    }

    pub async fn write_metadata(&self, secret_path: &str, payload: &KvMetadataPayload) -> Result<()> {
        let request = ApiRequest::post(self.secret_path("metadata", secret_path)?).json(payload)?;
        self.client.send_unit(request).await
    }

    pub async fn patch_metadata(&self, secret_path: &str, payload: &KvMetadataPayload) -> Result<()> {
        let request =
            ApiRequest::merge_patch(self.secret_path("metadata", secret_path)?).json(payload)?;
        self.client.send_unit(request).await
    }

    /// Delete metadata and every version of the secret
    pub async fn delete_metadata(&self, secret_path: &str) -> Result<()> {
        let request = ApiRequest::delete(self.secret_path("metadata", secret_path)?);
        self.client.send_unit(request).await
    }
}
