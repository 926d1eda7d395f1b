use crate::{
    ClientConfig, NetworkError, VirtualNetworksApi, VirtualNetworksClient,
    core::infrastructure::api_client::ApiClient,
    tests::support::{TEST_SUBSCRIPTION_ID, create_test_auth, create_test_connection},
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path, query_param},
};

fn vnet_path(name: &str) -> String {
    format!(
        "/subscriptions/{}/resourceGroups/rg1/providers/Microsoft.Network/virtualNetworks/{}",
        TEST_SUBSCRIPTION_ID, name
    )
}

async fn create_authenticated_client(mock_server: &MockServer) -> VirtualNetworksClient {
    let connection = create_test_connection(&mock_server.uri());
    let config = ClientConfig {
        poll_interval: Duration::from_millis(10),
        ..Default::default()
    };
    let api_client = ApiClient::new(connection, config).unwrap();
    api_client.set_auth(create_test_auth()).await;
    VirtualNetworksClient::new(Arc::new(api_client))
}

#[tokio::test]
async fn test_get_virtual_network() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(vnet_path("vnet1")))
        .and(query_param("api-version", "2020-05-01"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": vnet_path("vnet1"),
            "name": "vnet1",
            "location": "northeurope",
            "tags": {"owner": "network-team"},
            "properties": {
                "provisioningState": "Succeeded",
                "addressSpace": {"addressPrefixes": ["10.0.0.0/16"]},
                "dhcpOptions": {"dnsServers": ["10.0.0.4", "10.0.0.5"]},
                "enableDdosProtection": false
            }
        })))
        .mount(&mock_server)
        .await;

    let vnet = client.get("rg1", "vnet1").await.unwrap();
    assert_eq!(vnet.name.as_deref(), Some("vnet1"));
    assert_eq!(vnet.location.as_deref(), Some("northeurope"));
    assert_eq!(vnet.dns_servers(), vec!["10.0.0.4", "10.0.0.5"]);
    assert_eq!(vnet.extra["tags"]["owner"], "network-team");

    let properties = vnet.properties.unwrap();
    assert_eq!(properties.provisioning_state.as_deref(), Some("Succeeded"));
    assert_eq!(properties.extra["enableDdosProtection"], false);
}

#[tokio::test]
async fn test_get_missing_virtual_network() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(vnet_path("gone")))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": {"code": "ResourceNotFound", "message": "gone"}
        })))
        .mount(&mock_server)
        .await;

    let result = client.get("rg1", "gone").await;
    assert!(matches!(result, Err(NetworkError::NotFound { .. })));
}

#[tokio::test]
async fn test_update_waits_for_provisioning_state() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    let body = serde_json::json!({
        "location": "northeurope",
        "properties": {
            "provisioningState": "Updating",
            "dhcpOptions": {"dnsServers": ["10.0.0.4"]}
        }
    });

    Mock::given(method("PUT"))
        .and(path(vnet_path("vnet1")))
        .and(body_partial_json(serde_json::json!({
            "properties": {"dhcpOptions": {"dnsServers": ["10.0.0.4"]}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(vnet_path("vnet1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(vnet_path("vnet1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "location": "northeurope",
            "properties": {"provisioningState": "Succeeded"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let parameters = serde_json::from_value(body).unwrap();
    let operation = client
        .create_or_update("rg1", "vnet1", &parameters)
        .await
        .unwrap();
    operation.wait_for_completion().await.unwrap();
}

#[tokio::test]
async fn test_update_rejected_by_service() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("PUT"))
        .and(path(vnet_path("vnet1")))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {
                "code": "InvalidRequestFormat",
                "message": "Cannot parse the request."
            }
        })))
        .mount(&mock_server)
        .await;

    let parameters = serde_json::from_value(serde_json::json!({"location": "northeurope"})).unwrap();
    let result = client.create_or_update("rg1", "vnet1", &parameters).await;
    match result {
        Err(NetworkError::Api { status, code, .. }) => {
            assert_eq!(status, 400);
            assert_eq!(code, "InvalidRequestFormat");
        }
        Err(other) => panic!("unexpected error: {:?}", other),
        Ok(_) => panic!("the update must be rejected"),
    }
}

#[tokio::test]
async fn test_names_are_percent_encoded() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(format!(
            "/subscriptions/{}/resourceGroups/rg%201/providers/Microsoft.Network/virtualNetworks/a%23b",
            TEST_SUBSCRIPTION_ID
        )))
        .and(query_param("api-version", "2020-05-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "a#b",
            "properties": {"provisioningState": "Succeeded"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let vnet = client.get("rg 1", "a#b").await.unwrap();
    assert_eq!(vnet.name.as_deref(), Some("a#b"));
}
