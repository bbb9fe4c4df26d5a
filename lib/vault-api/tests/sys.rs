// lib/vault-api/tests/sys.rs

use std::collections::HashMap;
use vault_api::sys::{
    AuthMountConfigPayload, EnableAuditPayload, EnableAuthMethodPayload, TuneAuthMethodPayload,
};
use vault_api::{AuditDeviceType, ListingVisibility, TokenType, VaultClient};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> VaultClient {
    VaultClient::builder()
        .address(server.uri())
        .token("root")
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_audit_devices() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/sys/audit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "file/": {"type": "file", "description": "", "options": {"file_path": "/tmp/a.log"}, "local": false, "path": "file/"},
            "data": {
                "file/": {"type": "file", "description": "", "options": {"file_path": "/tmp/a.log"}, "local": false, "path": "file/"}
            }
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/sys/audit/net"))
        .and(body_json(serde_json::json!({
            "type": "socket",
            "description": "SIEM feed",
            "options": {"address": "127.0.0.1:9090", "socket_type": "tcp"}
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/sys/audit-hash/file"))
        .and(body_json(serde_json::json!({"input": "my-secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"hash": "hmac-sha256:08ba35"}
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/v1/sys/audit/net"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let audit = client.sys().audit();

    let devices = audit.list().await.unwrap();
    assert_eq!(devices["file/"].device_type, AuditDeviceType::File);
    assert_eq!(devices["file/"].options["file_path"], "/tmp/a.log");

    let mut payload = EnableAuditPayload::new(AuditDeviceType::Socket);
    payload.description = Some("SIEM feed".to_string());
    payload
        .options
        .insert("address".to_string(), "127.0.0.1:9090".to_string());
    payload
        .options
        .insert("socket_type".to_string(), "tcp".to_string());
    audit.enable("net", &payload).await.unwrap();

    let hash = audit.calculate_hash("file", "my-secret").await.unwrap();
    assert_eq!(hash, "hmac-sha256:08ba35");

    audit.disable("net").await.unwrap();
}

#[tokio::test]
async fn test_auth_method_management() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/sys/auth/ci-approle"))
        .and(header("X-Vault-Token", "root"))
        .and(body_json(serde_json::json!({
            "type": "approle",
            "config": {"listing_visibility": "hidden", "default_lease_ttl": "1h"}
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/sys/auth/ci-approle/tune"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "description": "",
                "default_lease_ttl": 3600,
                "max_lease_ttl": 2764800,
                "force_no_cache": false,
                "token_type": "default-service",
                "listing_visibility": "hidden"
            }
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/sys/auth/ci-approle/tune"))
        .and(body_json(serde_json::json!({"token_type": "batch"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/sys/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "token/": {"type": "token", "description": "token based credentials", "accessor": "auth_token_1", "config": {"default_lease_ttl": 0, "max_lease_ttl": 0}, "local": false, "seal_wrap": false},
                "ci-approle/": {"type": "approle", "description": "", "accessor": "auth_approle_2", "config": {"default_lease_ttl": 3600, "max_lease_ttl": 0}, "local": false, "seal_wrap": false}
            }
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let methods = client.sys().auth_methods();

    methods
        .enable(
            "ci-approle",
            &EnableAuthMethodPayload {
                config: Some(AuthMountConfigPayload {
                    default_lease_ttl: Some("1h".to_string()),
                    listing_visibility: Some(ListingVisibility::Hidden),
                    ..Default::default()
                }),
                ..EnableAuthMethodPayload::new("approle")
            },
        )
        .await
        .unwrap();

    let tuning = methods.read_tuning("ci-approle").await.unwrap();
    assert_eq!(tuning.default_lease_ttl, 3600);
    assert_eq!(tuning.token_type, Some(TokenType::DefaultService));
    assert_eq!(tuning.listing_visibility, Some(ListingVisibility::Hidden));

    methods
        .tune(
            "ci-approle",
            &TuneAuthMethodPayload {
                token_type: Some(TokenType::Batch),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let all = methods.list().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all["ci-approle/"].accessor, "auth_approle_2");
}

#[tokio::test]
async fn test_namespaces() {
    let mock_server = MockServer::start().await;

    Mock::given(method("LIST"))
        .and(path("/v1/sys/namespaces"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "keys": ["bar/", "foo/"],
                "key_info": {
                    "bar/": {"custom_metadata": {}, "id": "HWmNL", "path": "bar/"},
                    "foo/": {"custom_metadata": {"owner": "ops"}, "id": "5q39x", "path": "foo/"}
                }
            }
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/sys/namespaces/baz"))
        .and(body_json(serde_json::json!({"custom_metadata": {"owner": "dev"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"custom_metadata": {"owner": "dev"}, "id": "gsudj", "path": "baz/"}
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/sys/namespaces/api-lock/lock/baz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"unlock_key": "Hr5ZG"}
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/sys/namespaces/api-lock/unlock/baz"))
        .and(body_json(serde_json::json!({"unlock_key": "Hr5ZG"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let namespaces = client.sys().namespaces();

    let listed = namespaces.list().await.unwrap();
    let paths: Vec<&str> = listed.iter().map(|ns| ns.path.as_str()).collect();
    assert_eq!(paths, vec!["bar/", "foo/"]);
    assert_eq!(listed[1].custom_metadata["owner"], "ops");

    let mut metadata = HashMap::new();
    metadata.insert("owner".to_string(), "dev".to_string());
    let created = namespaces.create("baz", &metadata).await.unwrap();
    assert_eq!(created.id, "gsudj");

    let key = namespaces.lock(Some("baz")).await.unwrap();
    namespaces.unlock(Some("baz"), Some(&key)).await.unwrap();
}
