//! Client for the `Microsoft.Network/virtualNetworks` Resource Manager API.
//!
//! [`VirtualNetworksApi`] is the seam the DNS servers resource is written
//! against; [`VirtualNetworksClient`] implements it over HTTP and returns an
//! [`ArmPoller`] for every update, which follows the Resource Manager
//! long-running operation protocol until the update settles.

use crate::core::{
    domain::{
        error::{NetworkError, NetworkResult},
        model::{
            operation_status::{OperationState, OperationStatus},
            virtual_network::{VirtualNetwork, is_terminal_provisioning_state},
        },
    },
    infrastructure::api_client::{ApiClient, ApiResponse},
};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const AZURE_ASYNC_OPERATION: &str = "azure-asyncoperation";
const LOCATION: &str = "location";
const RETRY_AFTER: &str = "retry-after";

/// A remote mutation that completes asynchronously.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LongRunningOperation: Send + Sync {
    /// Suspends until the operation has finished.
    ///
    /// # Errors
    /// Returns `NetworkError::OperationFailed` if the operation ends as
    /// `Failed`/`Canceled`, or any error raised while polling.
    async fn wait_for_completion(&self) -> NetworkResult<()>;
}

/// The operations on virtual networks the DNS servers resource relies on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VirtualNetworksApi: Send + Sync {
    /// Fetches a virtual network.
    ///
    /// # Errors
    /// Returns `NetworkError::NotFound` if the virtual network does not exist.
    async fn get(&self, resource_group: &str, name: &str) -> NetworkResult<VirtualNetwork>;

    /// Submits a full update of a virtual network.
    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        parameters: &VirtualNetwork,
    ) -> NetworkResult<Box<dyn LongRunningOperation>>;
}

/// HTTP implementation of [`VirtualNetworksApi`] scoped to one subscription.
#[derive(Debug, Clone)]
pub struct VirtualNetworksClient {
    api_client: Arc<ApiClient>,
}

impl VirtualNetworksClient {
    pub fn new(api_client: Arc<ApiClient>) -> Self {
        Self { api_client }
    }

    fn resource_path(&self, resource_group: &str, name: &str) -> String {
        let connection = self.api_client.connection();
        connection.management_endpoint().resource_url(
            &[
                "subscriptions",
                connection.subscription_id().as_str(),
                "resourceGroups",
                resource_group,
                "providers",
                "Microsoft.Network",
                "virtualNetworks",
                name,
            ],
            &[("api-version", self.api_client.config().api_version.as_str())],
        )
    }
}

#[async_trait]
impl VirtualNetworksApi for VirtualNetworksClient {
    async fn get(&self, resource_group: &str, name: &str) -> NetworkResult<VirtualNetwork> {
        self.api_client
            .get(&self.resource_path(resource_group, name))
            .await
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        parameters: &VirtualNetwork,
    ) -> NetworkResult<Box<dyn LongRunningOperation>> {
        let path = self.resource_path(resource_group, name);
        let response = self.api_client.put(&path, parameters).await?;
        Ok(Box::new(ArmPoller::from_response(
            Arc::clone(&self.api_client),
            path,
            &response,
        )))
    }
}

/// How an [`ArmPoller`] learns that an operation has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PollTarget {
    /// Poll the status document behind `Azure-AsyncOperation`.
    AsyncOperation(String),
    /// Poll the `Location` URL until it stops answering `202 Accepted`.
    Location(String),
    /// Poll the resource until its provisioning state is terminal.
    ProvisioningState(String),
    /// The initial response already reported `Failed` or `Canceled`.
    Failed(String),
    /// The initial response already reported success.
    Done,
}

/// Follows a Resource Manager long-running operation to completion.
#[derive(Debug)]
pub struct ArmPoller {
    api_client: Arc<ApiClient>,
    target: PollTarget,
    initial_delay: Option<Duration>,
}

impl ArmPoller {
    /// Picks the polling strategy from the response that started the operation.
    pub fn from_response(api_client: Arc<ApiClient>, resource_path: String, response: &ApiResponse) -> Self {
        let target = if let Some(url) = response.header(AZURE_ASYNC_OPERATION) {
            PollTarget::AsyncOperation(url.to_string())
        } else if let Some(url) = response.header(LOCATION) {
            PollTarget::Location(url.to_string())
        } else if response.status == StatusCode::ACCEPTED {
            PollTarget::ProvisioningState(resource_path)
        } else {
            match response.json::<VirtualNetwork>() {
                Ok(vnet) => match vnet.properties.and_then(|p| p.provisioning_state) {
                    None => PollTarget::Done,
                    Some(state) if state.eq_ignore_ascii_case("succeeded") => PollTarget::Done,
                    Some(state) if is_terminal_provisioning_state(&state) => {
                        PollTarget::Failed(state)
                    }
                    Some(_) => PollTarget::ProvisioningState(resource_path),
                },
                Err(_) => PollTarget::ProvisioningState(resource_path),
            }
        };

        Self {
            initial_delay: retry_after(response),
            api_client,
            target,
        }
    }

    fn delay(&self, response: Option<&ApiResponse>) -> Duration {
        response
            .and_then(retry_after)
            .unwrap_or(self.api_client.config().poll_interval)
    }

    async fn poll_async_operation(&self, url: &str) -> NetworkResult<()> {
        let mut delay = self.initial_delay.unwrap_or(self.delay(None));
        loop {
            tokio::time::sleep(delay).await;
            let response = self.api_client.poll(url).await?;
            let status: OperationStatus = response.json()?;
            debug!(%url, status = %status.status, "polled long-running operation");
            match status.state() {
                OperationState::Succeeded => return Ok(()),
                OperationState::Failed | OperationState::Canceled => {
                    let message = status
                        .error
                        .map(|e| format!("{}: {}", e.code, e.message))
                        .unwrap_or_else(|| "no error details were returned".to_string());
                    return Err(NetworkError::OperationFailed {
                        status: status.status,
                        message,
                    });
                }
                OperationState::InProgress => delay = self.delay(Some(&response)),
            }
        }
    }

    async fn poll_location(&self, url: &str) -> NetworkResult<()> {
        let mut delay = self.initial_delay.unwrap_or(self.delay(None));
        loop {
            tokio::time::sleep(delay).await;
            let response = self.api_client.poll(url).await?;
            debug!(%url, status = response.status.as_u16(), "polled operation location");
            if response.status != StatusCode::ACCEPTED {
                return Ok(());
            }
            delay = self.delay(Some(&response));
        }
    }

    async fn poll_provisioning_state(&self, path: &str) -> NetworkResult<()> {
        let mut delay = self.initial_delay.unwrap_or(self.delay(None));
        loop {
            tokio::time::sleep(delay).await;
            let vnet: VirtualNetwork = self.api_client.get(path).await?;
            let state = vnet.properties.and_then(|p| p.provisioning_state);
            debug!(%path, state = ?state, "polled provisioning state");
            match state {
                None => return Ok(()),
                Some(state) if state.eq_ignore_ascii_case("succeeded") => return Ok(()),
                Some(state) if is_terminal_provisioning_state(&state) => {
                    return Err(NetworkError::OperationFailed {
                        status: state,
                        message: "the resource reached a terminal provisioning state".to_string(),
                    });
                }
                Some(_) => delay = self.delay(None),
            }
        }
    }
}

#[async_trait]
impl LongRunningOperation for ArmPoller {
    async fn wait_for_completion(&self) -> NetworkResult<()> {
        match &self.target {
            PollTarget::AsyncOperation(url) => self.poll_async_operation(url).await,
            PollTarget::Location(url) => self.poll_location(url).await,
            PollTarget::ProvisioningState(path) => self.poll_provisioning_state(path).await,
            PollTarget::Failed(state) => Err(NetworkError::OperationFailed {
                status: state.clone(),
                message: "the service rejected the update".to_string(),
            }),
            PollTarget::Done => Ok(()),
        }
    }
}

fn retry_after(response: &ApiResponse) -> Option<Duration> {
    response
        .header(RETRY_AFTER)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
