// lib/vault-api/tests/identity.rs

use vault_api::VaultClient;
use vault_api::identity::{
    EntityPayload, OidcAssignment, OidcClientPayload, OidcClientType, OidcKeyPayload,
    OidcProviderPayload,
};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> VaultClient {
    VaultClient::builder()
        .address(server.uri())
        .token("root")
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_entity_create_then_update() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/identity/entity/name/alice"))
        .and(body_json(serde_json::json!({"policies": ["dev"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"id": "8d6a45e5", "name": "alice", "aliases": null}
        })))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/identity/entity/name/alice"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let entities = client.identity().entity();
    let payload = EntityPayload {
        policies: Some(vec!["dev".to_string()]),
        ..Default::default()
    };

    let created = entities
        .create_or_update_by_name("alice", &payload)
        .await
        .unwrap()
        .expect("created entity reference");
    assert_eq!(created.id, "8d6a45e5");

    let updated = entities
        .create_or_update_by_name("alice", &payload)
        .await
        .unwrap();
    assert!(updated.is_none());
}

#[tokio::test]
async fn test_entity_read_list_merge() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/identity/entity/id/8d6a45e5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "id": "8d6a45e5",
                "name": "alice",
                "aliases": [],
                "metadata": {"team": "platform"},
                "policies": ["dev"],
                "disabled": false,
                "creation_time": "2024-01-01T00:00:00Z",
                "last_update_time": "2024-01-01T00:00:00Z",
                "direct_group_ids": [],
                "group_ids": [],
                "inherited_group_ids": [],
                "namespace_id": "root"
            }
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("LIST"))
        .and(path("/v1/identity/entity/name"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"keys": ["alice", "bob"]}
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/identity/entity/batch-delete"))
        .and(body_json(serde_json::json!({"entity_ids": ["x", "y"]})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let entities = client.identity().entity();

    let entity = entities.read_by_id("8d6a45e5").await.unwrap();
    assert_eq!(entity.name, "alice");
    assert_eq!(entity.metadata.unwrap()["team"], "platform");

    assert_eq!(entities.list_by_name().await.unwrap(), vec!["alice", "bob"]);

    entities
        .batch_delete(&["x".to_string(), "y".to_string()])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_oidc_provider_objects() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/identity/oidc/key/signing"))
        .and(body_json(serde_json::json!({"algorithm": "RS256", "allowed_client_ids": ["*"]})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/identity/oidc/key/signing/rotate"))
        .and(body_json(serde_json::json!({"verification_ttl": "1h"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/identity/oidc/assignment/devs"))
        .and(body_json(serde_json::json!({"entity_ids": ["8d6a45e5"], "group_ids": []})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/identity/oidc/client/portal"))
        .and(body_json(serde_json::json!({
            "key": "signing",
            "assignments": ["devs"],
            "client_type": "public"
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/identity/oidc/provider/main"))
        .and(body_json(serde_json::json!({"allowed_client_ids": ["*"]})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("LIST"))
        .and(path("/v1/identity/oidc/provider"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"keys": ["default", "main"]}
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/identity/oidc/provider/main/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "issuer": "http://127.0.0.1:8200/v1/identity/oidc/provider/main",
            "jwks_uri": "http://127.0.0.1:8200/v1/identity/oidc/provider/main/.well-known/keys",
            "authorization_endpoint": "http://127.0.0.1:8200/ui/vault/identity/oidc/provider/main/authorize",
            "token_endpoint": "http://127.0.0.1:8200/v1/identity/oidc/provider/main/token",
            "userinfo_endpoint": "http://127.0.0.1:8200/v1/identity/oidc/provider/main/userinfo",
            "request_parameter_supported": false,
            "request_uri_parameter_supported": false,
            "id_token_signing_alg_values_supported": ["RS256"],
            "response_types_supported": ["code"],
            "scopes_supported": ["openid"],
            "subject_types_supported": ["public"],
            "grant_types_supported": ["authorization_code"],
            "token_endpoint_auth_methods_supported": ["none", "client_secret_basic", "client_secret_post"]
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let oidc = client.identity().oidc();

    oidc.create_or_update_key(
        "signing",
        &OidcKeyPayload {
            algorithm: Some("RS256".to_string()),
            allowed_client_ids: Some(vec!["*".to_string()]),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    oidc.rotate_key("signing", Some("1h")).await.unwrap();

    oidc.create_or_update_assignment(
        "devs",
        &OidcAssignment {
            entity_ids: vec!["8d6a45e5".to_string()],
            group_ids: vec![],
        },
    )
    .await
    .unwrap();

    oidc.create_or_update_client(
        "portal",
        &OidcClientPayload {
            key: Some("signing".to_string()),
            assignments: Some(vec!["devs".to_string()]),
            client_type: Some(OidcClientType::Public),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    oidc.create_or_update_provider(
        "main",
        &OidcProviderPayload {
            allowed_client_ids: Some(vec!["*".to_string()]),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(oidc.list_providers().await.unwrap(), vec!["default", "main"]);

    let discovery = oidc.read_provider_discovery("main").await.unwrap();
    assert!(discovery.issuer.ends_with("/provider/main"));
    assert_eq!(discovery.response_types_supported, vec!["code"]);
}
