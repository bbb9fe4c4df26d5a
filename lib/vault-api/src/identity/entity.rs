use crate::client::{ApiRequest, VaultClient};
use crate::error::Result;
use crate::path;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const ENTITY_PATH: &str = "identity/entity";

#[derive(Debug, Clone, Default, Serialize)]
pub struct EntityPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policies: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

/// What Vault returns when an entity is created
#[derive(Debug, Clone, Deserialize)]
pub struct EntityRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub aliases: Option<Vec<EntityAlias>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Entity {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub aliases: Vec<EntityAlias>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub policies: Vec<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub creation_time: String,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub last_update_time: String,
    #[serde(default)]
    pub merged_entity_ids: Option<Vec<String>>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub direct_group_ids: Vec<String>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub group_ids: Vec<String>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub inherited_group_ids: Vec<String>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub namespace_id: String,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub bucket_key_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntityAlias {
    pub id: String,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub canonical_id: String,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub mount_accessor: String,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub mount_path: String,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub mount_type: String,
    pub name: String,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
    #[serde(default)]
    pub custom_metadata: Option<HashMap<String, String>>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub creation_time: String,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub last_update_time: String,
    #[serde(default)]
    pub merged_from_canonical_ids: Option<Vec<String>>,
    #[serde(default)]
    pub local: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeEntitiesPayload {
    pub from_entity_ids: Vec<String>,
    pub to_entity_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicting_alias_ids_to_keep: Option<Vec<String>>,
}

/// Identity entities
pub struct Entities<'a> {
    client: &'a VaultClient,
}

impl<'a> Entities<'a> {
    pub(crate) fn new(client: &'a VaultClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, payload: &EntityPayload) -> Result<Option<EntityRef>> {
        let request = ApiRequest::post(ENTITY_PATH).json(payload)?;
        self.client.send_optional_data(request).await
    }

    pub async fn read_by_id(&self, id: &str) -> Result<Entity> {
        let request = ApiRequest::get(path::join_all([ENTITY_PATH, "id", path::name("entity id", id)?]));
        self.client.send_data(request).await
    }

    pub async fn update_by_id(&self, id: &str, payload: &EntityPayload) -> Result<Option<EntityRef>> {
        let request = ApiRequest::post(path::join_all([ENTITY_PATH, "id", path::name("entity id", id)?])).json(payload)?;
        self.client.send_optional_data(request).await
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<()> {
        let request = ApiRequest::delete(path::join_all([ENTITY_PATH, "id", path::name("entity id", id)?]));
        self.client.send_unit(request).await
    }

    pub async fn batch_delete(&self, entity_ids: &[String]) -> Result<()> {
        let request = ApiRequest::post(path::join(ENTITY_PATH, "batch-delete"))
            .json(&serde_json::json!({ "entity_ids": entity_ids }))?;
        self.client.send_unit(request).await
    }

    pub async fn list_by_id(&self) -> Result<Vec<String>> {
        let request = ApiRequest::list(path::join(ENTITY_PATH, "id"));
        self.client.send_list(request).await
    }

    /// Returns the entity reference only when the call created it
    pub async fn create_or_update_by_name(
        &self,
        name: &str,
        payload: &EntityPayload,
    ) -> Result<Option<EntityRef>> {
        let request = ApiRequest::post(path::join_all([ENTITY_PATH, "name", path::name("entity", name)?])).json(payload)?;
        self.client.send_optional_data(request).await
    }

    pub async fn read_by_name(&self, name: &str) -> Result<Entity> {
        let request = ApiRequest::get(path::join_all([ENTITY_PATH, "name", path::name("entity", name)?]));
        self.client.send_data(request).await
    }

    pub async fn delete_by_name(&self, name: &str) -> Result<()> {
        let request = ApiRequest::delete(path::join_all([ENTITY_PATH, "name", path::name("entity", name)?]));
        self.client.send_unit(request).await
    }

    pub async fn list_by_name(&self) -> Result<Vec<String>> {
        let request = ApiRequest::list(path::join(ENTITY_PATH, "name"));
        self.client.send_list(request).await
    }

    pub async fn merge(&self, payload: &MergeEntitiesPayload) -> Result<()> {
        let request = ApiRequest::post(path::join(ENTITY_PATH, "merge")).json(payload)?;
        self.client.send_unit(request).await
    }
}
