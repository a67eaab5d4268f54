#![allow(clippy::unwrap_used)]
// Integration tests for `ManagementClient` using wiremock.

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nbgitops_api::types::{
    DnsSettingsBody, GroupRequest, PolicyRequest, PolicyRuleRequest, RouteRequest, UserRequest,
};
use nbgitops_api::{Error, ManagementClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ManagementClient) {
    let server = MockServer::start().await;
    let client = ManagementClient::from_token(
        &server.uri(),
        &SecretString::from("nbp_secret"),
        &TransportConfig::default(),
    )
    .unwrap();
    (server, client)
}

fn route_request() -> RouteRequest {
    RouteRequest {
        description: "office lan".into(),
        network_id: "office".into(),
        enabled: true,
        peer: None,
        peer_groups: Some(vec!["g-routers".into()]),
        network: Some("10.0.0.0/24".into()),
        domains: None,
        metric: 9999,
        masquerade: true,
        groups: vec!["g-all".into()],
        keep_route: false,
    }
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_sends_token_header() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .and(header("authorization", "Token nbp_secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "g1", "name": "All", "peers": [{ "id": "p1", "name": "laptop" }] }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let groups = client.list_groups().await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "All");
    assert_eq!(groups[0].peers[0].id, "p1");
}

#[tokio::test]
async fn test_unauthorized_maps_to_invalid_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.list_users().await;
    assert!(
        matches!(result, Err(Error::InvalidToken)),
        "expected InvalidToken, got: {result:?}"
    );
}

// ── Error handling ──────────────────────────────────────────────────

#[tokio::test]
async fn test_api_error_carries_status_and_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/groups"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({ "message": "group name exists", "code": 422 })),
        )
        .mount(&server)
        .await;

    let err = client
        .create_group(&GroupRequest {
            name: "dup".into(),
            peers: None,
        })
        .await
        .unwrap_err();

    match err {
        Error::Api {
            operation,
            status,
            message,
        } => {
            assert_eq!(operation, "groups");
            assert_eq!(status, 422);
            assert_eq!(message, "group name exists");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_404_keeps_status() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/routes/r1"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let err = client.delete_route("r1").await.unwrap_err();
    assert!(matches!(
        err,
        Error::Api {
            operation: "routes",
            status: 404,
            ..
        }
    ));
}

#[tokio::test]
async fn test_bad_json_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/peers"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let result = client.list_peers().await;
    assert!(matches!(result, Err(Error::Deserialization { .. })));
}

// ── Writes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_user_puts_body() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/users/u1"))
        .and(body_json(json!({
            "role": "admin",
            "auto_groups": ["g1"],
            "is_blocked": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1",
            "email": "a@example.com",
            "role": "admin",
            "auto_groups": ["g1"],
            "is_blocked": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let user = client
        .update_user(
            "u1",
            &UserRequest {
                role: "admin".into(),
                auto_groups: vec!["g1".into()],
                is_blocked: false,
            },
        )
        .await
        .unwrap();
    assert_eq!(user.email, "a@example.com");
}

#[tokio::test]
async fn test_create_route_omits_unset_targets() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/routes"))
        .and(body_json(json!({
            "description": "office lan",
            "network_id": "office",
            "enabled": true,
            "peer_groups": ["g-routers"],
            "network": "10.0.0.0/24",
            "metric": 9999,
            "masquerade": true,
            "groups": ["g-all"],
            "keep_route": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "r1",
            "network_id": "office",
            "network_type": "IPv4",
            "peer_groups": ["g-routers"],
            "network": "10.0.0.0/24",
            "metric": 9999,
            "groups": ["g-all"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let route = client.create_route(&route_request()).await.unwrap();
    assert_eq!(route.id, "r1");
    assert!(route.peer.is_none());
}

#[tokio::test]
async fn test_dns_settings_accepts_wrapped_shape() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/dns/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": { "disabled_management_groups": ["g1"] }
        })))
        .mount(&server)
        .await;

    let settings = client.get_dns_settings().await.unwrap();
    assert_eq!(settings.disabled_management_groups, vec!["g1".to_string()]);
}

#[tokio::test]
async fn test_dns_settings_accepts_flat_shape() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/dns/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "disabled_management_groups": []
        })))
        .mount(&server)
        .await;

    let settings = client.get_dns_settings().await.unwrap();
    assert!(settings.disabled_management_groups.is_empty());
}

// ── Null lists ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_null_lists_read_as_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "u1", "email": "a@example.com", "role": "user", "auto_groups": null }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "g1", "name": "eng", "peers": null }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/peers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "p1", "name": "laptop", "groups": null }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/policies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "pol1",
            "name": "eng",
            "source_posture_checks": null,
            "rules": [{
                "name": "eng",
                "ports": null,
                "sources": null,
                "destinations": null
            }]
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/dns/nameservers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "ns1",
            "name": "corp",
            "nameservers": null,
            "groups": null,
            "domains": null
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/dns/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "disabled_management_groups": null
        })))
        .mount(&server)
        .await;

    let users = client.list_users().await.unwrap();
    assert!(users[0].auto_groups.is_empty());

    let groups = client.list_groups().await.unwrap();
    assert!(groups[0].peers.is_empty());

    let peers = client.list_peers().await.unwrap();
    assert!(peers[0].groups.is_empty());

    let policies = client.list_policies().await.unwrap();
    assert!(policies[0].source_posture_checks.is_empty());
    let rule = &policies[0].rules[0];
    assert!(rule.ports.is_empty());
    assert!(rule.sources.is_empty());
    assert!(rule.destinations.is_empty());

    let nameservers = client.list_nameserver_groups().await.unwrap();
    assert!(nameservers[0].nameservers.is_empty());
    assert!(nameservers[0].groups.is_empty());
    assert!(nameservers[0].domains.is_empty());

    let dns = client.get_dns_settings().await.unwrap();
    assert!(dns.disabled_management_groups.is_empty());
}

// ── Dry-run ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_dry_run_skips_mutations() {
    let (server, client) = setup().await;
    client.set_dry_run(true);

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let group = client
        .create_group(&GroupRequest {
            name: "engineering".into(),
            peers: None,
        })
        .await
        .unwrap();
    assert_eq!(group.id, "engineering");

    let policy = client
        .create_policy(&PolicyRequest {
            name: "eng-to-prod".into(),
            description: String::new(),
            enabled: true,
            source_posture_checks: vec![],
            rules: vec![PolicyRuleRequest {
                name: "eng-to-prod".into(),
                description: String::new(),
                enabled: true,
                action: "accept".into(),
                bidirectional: true,
                protocol: "tcp".into(),
                ports: vec!["22".into()],
                sources: vec![group.id.clone()],
                destinations: vec!["prod".into()],
            }],
        })
        .await
        .unwrap();
    assert_eq!(policy.id, "eng-to-prod");
    assert_eq!(policy.rules[0].sources[0].id, "engineering");

    let route = client.create_route(&route_request()).await.unwrap();
    assert_eq!(route.id, "office");

    let dns = client
        .update_dns_settings(&DnsSettingsBody {
            disabled_management_groups: vec!["g1".into()],
        })
        .await
        .unwrap();
    assert_eq!(dns.disabled_management_groups, vec!["g1".to_string()]);

    client.delete_group("old").await.unwrap();
}

#[tokio::test]
async fn test_dry_run_still_reads() {
    let (server, client) = setup().await;
    client.set_dry_run(true);

    Mock::given(method("GET"))
        .and(path("/api/policies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.list_policies().await.unwrap().is_empty());
}
