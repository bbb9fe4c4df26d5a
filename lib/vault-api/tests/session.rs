// lib/vault-api/tests/session.rs

use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use vault_api::session::{
    AppRoleAuth, AuthMethod, OidcAuth, OidcCache, TokenManager, TokenManagerConfig,
};
use vault_api::{VaultClient, VaultError};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn auth_response(token: &str, lease: u64, renewable: bool) -> serde_json::Value {
    serde_json::json!({
        "auth": {
            "client_token": token,
            "accessor": "acc",
            "policies": ["default"],
            "lease_duration": lease,
            "renewable": renewable
        }
    })
}

fn fast_config() -> TokenManagerConfig {
    TokenManagerConfig {
        refresh_threshold: 0.5,
        min_renewal_duration: Duration::ZERO,
        retry_interval: Duration::from_millis(50),
    }
}

#[tokio::test]
async fn test_login_sets_client_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/approle/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_response("hvs.first", 3600, true)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = VaultClient::builder().address(mock_server.uri()).build().unwrap();
    let auth = Arc::new(AppRoleAuth::new("rid".to_string(), Some("sid".to_string())));

    let manager = TokenManager::new(client.clone(), auth, TokenManagerConfig::default())
        .await
        .unwrap();

    assert_eq!(manager.get_token().await, "hvs.first");
    assert_eq!(client.token().await.as_deref(), Some("hvs.first"));
}

#[tokio::test]
async fn test_token_renewed_before_expiry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/approle/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_response("hvs.short", 1, true)))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/token/renew-self"))
        .and(header("X-Vault-Token", "hvs.short"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_response("hvs.short", 3600, true)))
        .expect(1..)
        .mount(&mock_server)
        .await;

    let client = VaultClient::builder().address(mock_server.uri()).build().unwrap();
    let auth = Arc::new(AppRoleAuth::new("rid".to_string(), None));
    let manager = TokenManager::new(client.clone(), auth, fast_config())
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(1500)).await;

    let info = manager.token_info().await;
    assert_eq!(info.lease_duration, Duration::from_secs(3600));
    assert_eq!(client.token().await.as_deref(), Some("hvs.short"));
}

#[tokio::test]
async fn test_reauthenticates_when_renewal_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/approle/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_response("hvs.one", 1, true)))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/approle/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_response("hvs.two", 3600, true)))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/token/renew-self"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "errors": ["permission denied"]
        })))
        .mount(&mock_server)
        .await;

    let client = VaultClient::builder().address(mock_server.uri()).build().unwrap();
    let auth = Arc::new(AppRoleAuth::new("rid".to_string(), Some("sid".to_string())));
    let manager = TokenManager::new(client.clone(), auth, fast_config())
        .await
        .unwrap();
    assert_eq!(manager.get_token().await, "hvs.one");

    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert_eq!(manager.get_token().await, "hvs.two");
    assert_eq!(client.token().await.as_deref(), Some("hvs.two"));
}

fn lookup_response(token: &str, ttl: u64) -> serde_json::Value {
    serde_json::json!({
        "data": {
            "accessor": "acc-oidc",
            "id": token,
            "policies": ["default", "dev"],
            "renewable": true,
            "ttl": ttl,
            "type": "service"
        }
    })
}

#[tokio::test]
async fn test_cached_oidc_token_keeps_real_lease() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let scope = format!("{}|", mock_server.uri());

    OidcCache::with_dir(dir.path().to_path_buf())
        .set(&scope, "oidc", "dev", "hvs.cached", Duration::from_secs(28800))
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/v1/auth/token/lookup-self"))
        .and(header("X-Vault-Token", "hvs.cached"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lookup_response("hvs.cached", 7200)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = VaultClient::builder().address(mock_server.uri()).build().unwrap();
    let auth = Arc::new(
        OidcAuth::new("oidc".to_string(), "dev".to_string())
            .with_cache(OidcCache::with_dir(dir.path().to_path_buf())),
    );
    let manager = TokenManager::new(client.clone(), auth, TokenManagerConfig::default())
        .await
        .unwrap();

    let info = manager.token_info().await;
    assert_eq!(info.token, "hvs.cached");
    assert_eq!(info.lease_duration, Duration::from_secs(7200));
    assert!(info.renewable);
    assert_eq!(client.token().await.as_deref(), Some("hvs.cached"));
}

#[tokio::test]
async fn test_rejected_cached_oidc_token_is_cleared() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let scope = format!("{}|", mock_server.uri());

    OidcCache::with_dir(dir.path().to_path_buf())
        .set(&scope, "oidc", "dev", "hvs.revoked", Duration::from_secs(28800))
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/v1/auth/token/lookup-self"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "errors": ["permission denied"]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Browser flow starts; an empty auth URL stops it before any listener
    Mock::given(method("POST"))
        .and(path("/v1/auth/oidc/oidc/auth_url"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"auth_url": ""}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = VaultClient::builder().address(mock_server.uri()).build().unwrap();
    let auth = OidcAuth::new("oidc".to_string(), "dev".to_string())
        .with_cache(OidcCache::with_dir(dir.path().to_path_buf()));

    let err = auth.authenticate(&client).await.unwrap_err();
    assert!(matches!(err, VaultError::OidcError(_)));

    let cache = OidcCache::with_dir(dir.path().to_path_buf());
    assert!(cache.get(&scope, "oidc", "dev").is_none());
    assert!(client.token().await.is_none());
}

#[tokio::test]
async fn test_cached_oidc_token_close_to_expiry_is_dropped() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let scope = format!("{}|", mock_server.uri());

    OidcCache::with_dir(dir.path().to_path_buf())
        .set(&scope, "oidc", "dev", "hvs.old", Duration::from_secs(28800))
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/v1/auth/token/lookup-self"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lookup_response("hvs.old", 120)))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/oidc/oidc/auth_url"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"auth_url": ""}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = VaultClient::builder().address(mock_server.uri()).build().unwrap();
    let auth = OidcAuth::new("oidc".to_string(), "dev".to_string())
        .with_cache(OidcCache::with_dir(dir.path().to_path_buf()));

    assert!(auth.authenticate(&client).await.is_err());
    assert!(
        OidcCache::with_dir(dir.path().to_path_buf())
            .get(&scope, "oidc", "dev")
            .is_none()
    );
}
