use crate::client::{ApiRequest, VaultClient};
use crate::error::{Result, VaultError};
use crate::path;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const NAMESPACES_PATH: &str = "sys/namespaces";
const API_LOCK_PATH: &str = "sys/namespaces/api-lock";

#[derive(Debug, Clone, Deserialize)]
pub struct NamespaceInfo {
    pub id: String,
    pub path: String,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub custom_metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct NamespaceList {
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    keys: Vec<String>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    key_info: HashMap<String, NamespaceInfo>,
}

#[derive(Serialize)]
struct MetadataRequest<'r> {
    custom_metadata: &'r HashMap<String, String>,
}

#[derive(Deserialize)]
struct LockData {
    unlock_key: String,
}

/// Vault Enterprise namespaces, relative to the client's namespace
pub struct Namespaces<'a> {
    client: &'a VaultClient,
}

impl<'a> Namespaces<'a> {
    pub(crate) fn new(client: &'a VaultClient) -> Self {
        Self { client }
    }

    /// Child namespaces, in the order Vault lists them
    pub async fn list(&self) -> Result<Vec<NamespaceInfo>> {
        let list = match self
            .client
            .send_data::<NamespaceList>(ApiRequest::list(NAMESPACES_PATH))
            .await
        {
            Ok(list) => list,
            Err(VaultError::Api { status: 404, errors }) if errors.is_empty() => {
                NamespaceList::default()
            }
            Err(e) => return Err(e),
        };

        let NamespaceList { keys, mut key_info } = list;
        Ok(keys.iter().filter_map(|key| key_info.remove(key)).collect())
    }

    pub async fn create(
        &self,
        namespace: &str,
        custom_metadata: &HashMap<String, String>,
    ) -> Result<NamespaceInfo> {
        let request = ApiRequest::post(path::join(NAMESPACES_PATH, path::name("namespace", namespace)?))
            .json(&MetadataRequest { custom_metadata })?;
        self.client.send_data(request).await
    }

    /// Merge into the namespace's custom metadata
    pub async fn patch(
        &self,
        namespace: &str,
        custom_metadata: &HashMap<String, String>,
    ) -> Result<NamespaceInfo> {
        let request = ApiRequest::merge_patch(path::join(NAMESPACES_PATH, path::name("namespace", namespace)?))
            .json(&MetadataRequest { custom_metadata })?;
        self.client.send_data(request).await
    }

    pub async fn read(&self, namespace: &str) -> Result<NamespaceInfo> {
        let request = ApiRequest::get(path::join(NAMESPACES_PATH, path::name("namespace", namespace)?));
        self.client.send_data(request).await
    }

    pub async fn delete(&self, namespace: &str) -> Result<()> {
        let request = ApiRequest::delete(path::join(NAMESPACES_PATH, path::name("namespace", namespace)?));
        self.client.send_unit(request).await
    }

    /// Lock the API of the current namespace, or of `subpath` below it.
    /// Returns the key needed to unlock it.
    pub async fn lock(&self, subpath: Option<&str>) -> Result<String> {
        let request = ApiRequest::post(path::join_all([
            API_LOCK_PATH,
            "lock",
            subpath.unwrap_or_default(),
        ]));
        let data: LockData = self.client.send_data(request).await?;
        Ok(data.unlock_key)
    }

    /// Unlock a namespace API. Root tokens may omit the key.
    pub async fn unlock(&self, subpath: Option<&str>, unlock_key: Option<&str>) -> Result<()> {
        let mut request = ApiRequest::post(path::join_all([
            API_LOCK_PATH,
            "unlock",
            subpath.unwrap_or_default(),
        ]));
        if let Some(key) = unlock_key {
            request = request.json(&serde_json::json!({ "unlock_key": key }))?;
        }
        self.client.send_unit(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_list_deserialize() {
        let json = r#"{
            "keys": ["bar/", "foo/"],
            "key_info": {
                "bar/": {"custom_metadata": {}, "id": "HWmNL", "path": "bar/"},
                "foo/": {"custom_metadata": {"owner": "ops"}, "id": "5q39x", "path": "foo/"}
            }
        }"#;
        let list: NamespaceList = serde_json::from_str(json).unwrap();
        assert_eq!(list.keys, vec!["bar/", "foo/"]);
        assert_eq!(list.key_info["foo/"].custom_metadata["owner"], "ops");
    }
}
