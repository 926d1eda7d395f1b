use crate::{
    AzureNetworkClient, ClientConfig, DeleteOutcome, DnsServersConfig, DnsServersResource,
    LongRunningOperation, NamedLocks, NetworkError, NetworkResult, ReadOutcome, ResourceTimeouts,
    VirtualNetwork, VirtualNetworksApi,
    core::infrastructure::api_client::ApiClient,
    tests::support::{TEST_SUBSCRIPTION_ID, create_test_auth, create_test_connection},
};
use async_trait::async_trait;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method, path, query_param},
};

fn vnet_path() -> String {
    format!(
        "/subscriptions/{}/resourceGroups/rg1/providers/Microsoft.Network/virtualNetworks/vnet1",
        TEST_SUBSCRIPTION_ID
    )
}

fn dns_servers_id() -> String {
    format!("{}/dnsServers/default", vnet_path())
}

fn vnet_body(dns_servers: Option<&[&str]>) -> serde_json::Value {
    let mut properties = serde_json::json!({
        "provisioningState": "Succeeded",
        "addressSpace": {"addressPrefixes": ["10.0.0.0/16"]},
        "subnets": [{"name": "default", "properties": {"addressPrefix": "10.0.1.0/24"}}]
    });
    if let Some(servers) = dns_servers {
        properties["dhcpOptions"] = serde_json::json!({"dnsServers": servers});
    }
    serde_json::json!({
        "id": vnet_path(),
        "name": "vnet1",
        "type": "Microsoft.Network/virtualNetworks",
        "location": "westeurope",
        "etag": "W/\"00000000-0000-0000-0000-000000000001\"",
        "tags": {"env": "test"},
        "properties": properties
    })
}

async fn create_authenticated_client(mock_server: &MockServer) -> AzureNetworkClient {
    let connection = create_test_connection(&mock_server.uri());
    let config = ClientConfig {
        poll_interval: Duration::from_millis(10),
        ..Default::default()
    };
    let api_client = ApiClient::new(connection, config).unwrap();
    api_client.set_auth(create_test_auth()).await;

    AzureNetworkClient {
        api_client: Arc::new(api_client),
        locks: Arc::new(NamedLocks::new()),
    }
}

#[tokio::test]
async fn test_create_follows_async_operation() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(vnet_path()))
        .and(query_param("api-version", "2020-05-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vnet_body(None)))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .and(path(vnet_path()))
        .and(body_partial_json(serde_json::json!({
            "location": "westeurope",
            "tags": {"env": "test"},
            "properties": {
                "addressSpace": {"addressPrefixes": ["10.0.0.0/16"]},
                "dhcpOptions": {"dnsServers": ["10.0.0.5", "10.0.0.4"]}
            }
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header(
                    "Azure-AsyncOperation",
                    format!("{}/operations/op1", mock_server.uri()).as_str(),
                )
                .insert_header("Retry-After", "0")
                .set_body_json(vnet_body(Some(&["10.0.0.5", "10.0.0.4"]))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/operations/op1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "InProgress"})),
        )
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/operations/op1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "Succeeded"})),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(vnet_path()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(vnet_body(Some(&["10.0.0.5", "10.0.0.4"]))),
        )
        .mount(&mock_server)
        .await;

    let vnet_id = vnet_path();
    let state = client
        .dns_servers()
        .create(&DnsServersConfig::new(vnet_id.clone(), ["10.0.0.5", "10.0.0.4"]))
        .await
        .unwrap();

    assert_eq!(state.id.to_string(), dns_servers_id());
    assert_eq!(state.virtual_network_id.to_string(), vnet_id);
    assert_eq!(state.dns_servers, vec!["10.0.0.5", "10.0.0.4"]);
}

#[tokio::test]
async fn test_create_without_parent_is_rejected() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(vnet_path()))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": {"code": "ResourceNotFound", "message": "vnet1 was not found"}
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = client
        .dns_servers()
        .create(&DnsServersConfig::new(vnet_path(), ["10.0.0.4"]))
        .await;
    match result {
        Err(NetworkError::ParentMissing { id }) => assert_eq!(id, vnet_path()),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_operation_is_reported() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(vnet_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(vnet_body(None)))
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .and(path(vnet_path()))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header(
                    "Azure-AsyncOperation",
                    format!("{}/operations/op2", mock_server.uri()).as_str(),
                )
                .insert_header("Retry-After", "0"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/operations/op2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "Failed",
            "error": {"code": "InvalidRequestFormat", "message": "bad DNS server"}
        })))
        .mount(&mock_server)
        .await;

    let result = client
        .dns_servers()
        .create(&DnsServersConfig::new(vnet_path(), ["10.0.0.4"]))
        .await;
    match result {
        Err(e @ NetworkError::RemoteWrite { .. }) => {
            let message = e.to_string();
            assert!(message.starts_with("waiting for update of"), "{}", message);
            assert!(message.contains("bad DNS server"), "{}", message);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_rejected_update_without_headers_is_reported() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(vnet_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(vnet_body(None)))
        .mount(&mock_server)
        .await;

    let mut failed = vnet_body(Some(&["10.0.0.4"]));
    failed["properties"]["provisioningState"] = serde_json::json!("Failed");
    Mock::given(method("PUT"))
        .and(path(vnet_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(failed))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = client
        .dns_servers()
        .create(&DnsServersConfig::new(vnet_path(), ["10.0.0.4"]))
        .await;
    match result {
        Err(e @ NetworkError::RemoteWrite { .. }) => {
            let message = e.to_string();
            assert!(message.starts_with("waiting for update of"), "{}", message);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_read_reports_servers() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(vnet_path()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(vnet_body(Some(&["10.1.0.4", "10.1.0.5"]))),
        )
        .mount(&mock_server)
        .await;

    let state = client
        .dns_servers()
        .read(&dns_servers_id())
        .await
        .unwrap()
        .into_state()
        .unwrap();
    assert_eq!(state.dns_servers, vec!["10.1.0.4", "10.1.0.5"]);
    assert_eq!(state.virtual_network_id.to_string(), vnet_path());
}

#[tokio::test]
async fn test_read_of_deleted_vnet_signals_removal() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(vnet_path()))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let outcome = client.dns_servers().read(&dns_servers_id()).await.unwrap();
    assert_eq!(outcome, ReadOutcome::Removed);
}

#[tokio::test]
async fn test_read_server_error_is_wrapped() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(vnet_path()))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": {"code": "InternalServerError", "message": "boom"}
        })))
        .mount(&mock_server)
        .await;

    let result = client.dns_servers().read(&dns_servers_id()).await;
    match result {
        Err(e @ NetworkError::RemoteRead { .. }) => {
            assert!(e.to_string().starts_with(&format!("reading {}", dns_servers_id())));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_delete_follows_location() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(vnet_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(vnet_body(Some(&["10.0.0.4"]))))
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .and(path(vnet_path()))
        .and(body_partial_json(serde_json::json!({
            "properties": {"dhcpOptions": {"dnsServers": []}}
        })))
        .respond_with(
            ResponseTemplate::new(202)
                .insert_header(
                    "Location",
                    format!("{}/operationResults/op3", mock_server.uri()).as_str(),
                )
                .insert_header("Retry-After", "0"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/operationResults/op3"))
        .respond_with(ResponseTemplate::new(202).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/operationResults/op3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let outcome = client.dns_servers().delete(&dns_servers_id()).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted);
}

#[tokio::test]
async fn test_delete_of_deleted_vnet_succeeds() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(vnet_path()))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let outcome = client.dns_servers().delete(&dns_servers_id()).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::AlreadyRemoved);
}

#[tokio::test]
async fn test_import_rejects_bare_vnet_id() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    let result = client.dns_servers().import(&vnet_path()).await;
    assert!(matches!(result, Err(NetworkError::InvalidIdentity { .. })));
}

#[tokio::test]
async fn test_id_with_url_delimiters_sends_no_request() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vnet_body(Some(&["10.0.0.4"]))))
        .expect(0)
        .mount(&mock_server)
        .await;

    let id = format!(
        "/subscriptions/{}/resourceGroups/rg#x/providers/Microsoft.Network/virtualNetworks/vnet1/dnsServers/default",
        TEST_SUBSCRIPTION_ID
    );
    let result = client.dns_servers().read(&id).await;
    assert!(matches!(result, Err(NetworkError::InvalidIdentity { .. })));

    let config = DnsServersConfig::new(
        format!(
            "/subscriptions/{}/resourceGroups/rg1/providers/Microsoft.Network/virtualNetworks/vnet1?x=1",
            TEST_SUBSCRIPTION_ID
        ),
        ["10.0.0.4"],
    );
    let result = client.dns_servers().create(&config).await;
    assert!(matches!(result, Err(NetworkError::InvalidIdentity { .. })));
}

/// Shared in-memory virtual network that stamps every read with a version and
/// counts writes that were based on a stale read or overlap another write.
#[derive(Clone, Default)]
struct RecordingVirtualNetworks {
    vnet: Arc<Mutex<VirtualNetwork>>,
    version: Arc<AtomicUsize>,
    writes_in_flight: Arc<AtomicUsize>,
    conflicts: Arc<AtomicUsize>,
}

impl RecordingVirtualNetworks {
    fn new(vnet: VirtualNetwork) -> Self {
        Self {
            vnet: Arc::new(Mutex::new(vnet)),
            ..Default::default()
        }
    }

    fn etag(&self) -> String {
        format!("v{}", self.version.load(Ordering::SeqCst))
    }
}

struct RecordedWrite {
    target: RecordingVirtualNetworks,
    snapshot: VirtualNetwork,
}

#[async_trait]
impl LongRunningOperation for RecordedWrite {
    async fn wait_for_completion(&self) -> NetworkResult<()> {
        tokio::time::sleep(Duration::from_millis(10)).await;
        *self.target.vnet.lock().unwrap() = self.snapshot.clone();
        self.target.version.fetch_add(1, Ordering::SeqCst);
        self.target.writes_in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl VirtualNetworksApi for RecordingVirtualNetworks {
    async fn get(&self, _resource_group: &str, _name: &str) -> NetworkResult<VirtualNetwork> {
        tokio::time::sleep(Duration::from_millis(2)).await;
        let mut vnet = self.vnet.lock().unwrap().clone();
        vnet.etag = Some(self.etag());
        Ok(vnet)
    }

    async fn create_or_update(
        &self,
        _resource_group: &str,
        _name: &str,
        parameters: &VirtualNetwork,
    ) -> NetworkResult<Box<dyn LongRunningOperation>> {
        let stale = parameters.etag.as_deref() != Some(self.etag().as_str());
        if stale || self.writes_in_flight.load(Ordering::SeqCst) > 0 {
            self.conflicts.fetch_add(1, Ordering::SeqCst);
        }
        self.writes_in_flight.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(RecordedWrite {
            target: self.clone(),
            snapshot: parameters.clone(),
        }))
    }
}

#[tokio::test]
async fn test_concurrent_mutations_are_serialized() {
    let vnet: VirtualNetwork = serde_json::from_value(vnet_body(Some(&["10.0.0.1"]))).unwrap();
    let remote = RecordingVirtualNetworks::new(vnet);
    let locks = Arc::new(NamedLocks::new());

    let resources: Vec<_> = (0..4)
        .map(|_| {
            DnsServersResource::new(
                remote.clone(),
                Arc::clone(&locks),
                ResourceTimeouts::default(),
            )
        })
        .collect();

    let first = DnsServersConfig::new(vnet_path(), ["10.0.0.2"]);
    let second = DnsServersConfig::new(vnet_path(), ["10.0.0.3", "10.0.0.4"]);
    let id = dns_servers_id();

    let (a, b, c, d) = tokio::join!(
        resources[0].create(&first),
        resources[1].update(&second),
        resources[2].delete(&id),
        resources[3].update(&first),
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();
    d.unwrap();

    assert_eq!(remote.conflicts.load(Ordering::SeqCst), 0);
    assert_eq!(remote.writes_in_flight.load(Ordering::SeqCst), 0);

    let vnet = remote.vnet.lock().unwrap().clone();
    assert_eq!(
        vnet.properties.unwrap().extra["addressSpace"],
        serde_json::json!({"addressPrefixes": ["10.0.0.0/16"]})
    );
}
