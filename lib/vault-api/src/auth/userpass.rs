use super::mount_path;
use crate::client::{ApiRequest, VaultClient};
use crate::error::Result;
use crate::models::{AuthInfo, TokenParams, TokenSettings};
use crate::path;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserpassUserPayload {
    /// Required on create, optional on update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(flatten)]
    pub token: TokenParams,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserpassUser {
    #[serde(flatten)]
    pub token: TokenSettings,
}

/// Userpass auth backend
pub struct Userpass<'a> {
    client: &'a VaultClient,
    path: String,
}

impl<'a> Userpass<'a> {
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

    fn user_path(&self, username: &str, sub: &str) -> Result<String> {
        let username = path::name("user", username)?;
        Ok(path::join_all([self.path.as_str(), "users", username, sub]))
    }

    pub async fn create_or_update_user(
        &self,
        username: &str,
        payload: &UserpassUserPayload,
    ) -> Result<()> {
        let request = ApiRequest::post(self.user_path(username, "")?).json(payload)?;
        self.client.send_unit(request).await
    }

    pub async fn read_user(&self, username: &str) -> Result<UserpassUser> {
        let request = ApiRequest::get(self.user_path(username, "")?);
        self.client.send_data(request).await
    }

    pub async fn delete_user(&self, username: &str) -> Result<()> {
        let request = ApiRequest::delete(self.user_path(username, "")?);
        self.client.send_unit(request).await
    }

    pub async fn update_password(&self, username: &str, password: &str) -> Result<()> {
        let request = ApiRequest::post(self.user_path(username, "password")?)
            .json(&serde_json::json!({ "password": password }))?;
        self.client.send_unit(request).await
    }

    pub async fn update_policies(&self, username: &str, policies: &[String]) -> Result<()> {
        let request = ApiRequest::post(self.user_path(username, "policies")?)
            .json(&serde_json::json!({ "token_policies": policies }))?;
        self.client.send_unit(request).await
    }

    pub async fn list_users(&self) -> Result<Vec<String>> {
        let request = ApiRequest::list(path::join(&self.path, "users"));
        self.client.send_list(request).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthInfo> {
        let request = ApiRequest::post(path::join_all([self.path.as_str(), "login", path::name("user", username)?]))
            .json(&serde_json::json!({ "password": password }))?;
        self.client.send_login(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_paths() {
        let client = VaultClient::builder()
            .address("http://vault:8200")
            .build()
            .unwrap();
        let userpass = client.auth().userpass().with_mount("people");
        assert_eq!(
            userpass.user_path("alice", "password").unwrap(),
            "auth/people/users/alice/password"
        );
        assert_eq!(userpass.user_path("alice", "").unwrap(), "auth/people/users/alice");
        assert!(userpass.user_path("", "").is_err());
    }
}
