//! CRUD controller for the DNS servers of a virtual network.
//!
//! The DNS servers are not a remote object of their own: they live in
//! `properties.dhcpOptions.dnsServers` of the parent virtual network. Creating,
//! updating and deleting them is therefore a read-modify-write of the parent,
//! serialised through the named lock every virtual network mutation takes.

use crate::{
    core::{
        domain::{
            error::{NetworkError, NetworkResult},
            model::{
                client_config::ResourceTimeouts,
                virtual_network::{DhcpOptions, VirtualNetwork},
            },
            value_object::{DNS_SERVERS_NAME, VirtualNetworkDnsServersId, VirtualNetworkId},
        },
        infrastructure::{named_locks::NamedLocks, virtual_networks_client::VirtualNetworksApi},
    },
    dns_servers::application::{
        request::dns_servers_config::DnsServersConfig,
        response::dns_servers_state::{DeleteOutcome, DnsServersState, ReadOutcome},
    },
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lock category shared with every other resource that rewrites a virtual network.
pub const VIRTUAL_NETWORK_RESOURCE_NAME: &str = "azurerm_virtual_network";

/// Manages the DNS servers of a virtual network.
///
/// # Examples
///
/// ```no_run
/// use vnet_dns::{AzureNetworkClient, DnsServersConfig, NetworkResult};
///
/// #[tokio::main]
/// async fn main() -> NetworkResult<()> {
///     let client = AzureNetworkClient::builder()
///         .subscription_id("00000000-0000-0000-0000-000000000000")
///         .tenant_id("contoso.onmicrosoft.com")
///         .client_credentials("11111111-1111-1111-1111-111111111111", "secret")
///         .build()
///         .await?;
///
///     let resource = client.dns_servers();
///     let config = DnsServersConfig::new(
///         "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vnet",
///         ["10.0.0.4", "10.0.0.5"],
///     );
///     let state = resource.create(&config).await?;
///     println!("managing {}", state.id);
///     Ok(())
/// }
/// ```
pub struct DnsServersResource<A> {
    api: A,
    locks: Arc<NamedLocks>,
    timeouts: ResourceTimeouts,
}

impl<A: VirtualNetworksApi> DnsServersResource<A> {
    pub fn new(api: A, locks: Arc<NamedLocks>, timeouts: ResourceTimeouts) -> Self {
        Self {
            api,
            locks,
            timeouts,
        }
    }

    /// Starts managing the DNS servers described by `config`.
    ///
    /// # Errors
    /// See [`DnsServersResource::create_or_update`].
    pub async fn create(&self, config: &DnsServersConfig) -> NetworkResult<DnsServersState> {
        self.create_or_update(config, self.timeouts.create).await
    }

    /// Applies a changed DNS server list.
    ///
    /// # Errors
    /// See [`DnsServersResource::create_or_update`].
    pub async fn update(&self, config: &DnsServersConfig) -> NetworkResult<DnsServersState> {
        self.create_or_update(config, self.timeouts.update).await
    }

    /// Writes the configured DNS servers to the parent virtual network and
    /// returns the state read back afterwards.
    ///
    /// The write must finish within `deadline`; the read-back gets the read deadline.
    ///
    /// # Errors
    /// * `InvalidIdentity` / `Validation` if the configuration is invalid
    /// * `ParentMissing` if the virtual network does not exist
    /// * `RemoteRead` if fetching the virtual network fails
    /// * `MalformedRemoteObject` if the virtual network has no properties
    /// * `RemoteWrite` if the update cannot be submitted or does not succeed
    /// * `OperationTimeout` if `deadline` elapses first
    pub async fn create_or_update(
        &self,
        config: &DnsServersConfig,
        deadline: Duration,
    ) -> NetworkResult<DnsServersState> {
        let vnet_id = config.validate()?;
        let id = VirtualNetworkDnsServersId::for_virtual_network(&vnet_id);

        with_deadline(&id, "updating", deadline, async {
            let _lock = self
                .locks
                .acquire(id.virtual_network_name(), VIRTUAL_NETWORK_RESOURCE_NAME)
                .await;

            let mut vnet = match self.fetch(&vnet_id).await {
                Ok(vnet) => vnet,
                Err(e) if e.is_not_found() => {
                    return Err(NetworkError::ParentMissing {
                        id: vnet_id.to_string(),
                    });
                }
                Err(e) => return Err(NetworkError::remote_read(&vnet_id, e)),
            };

            let properties = vnet
                .properties
                .as_mut()
                .ok_or_else(|| without_properties(&vnet_id))?;
            properties
                .dhcp_options
                .get_or_insert_with(DhcpOptions::default)
                .dns_servers = Some(config.dns_servers.clone());

            self.submit(&id, &vnet, "updating", "waiting for update of")
                .await
        })
        .await?;

        info!(%id, dns_servers = ?config.dns_servers, "updated DNS servers");

        match self.read_id(&id).await? {
            ReadOutcome::Present(state) => Ok(state),
            ReadOutcome::Removed => Err(NetworkError::ParentMissing {
                id: vnet_id.to_string(),
            }),
        }
    }

    /// Refreshes the state tracked under `id` from the remote service.
    ///
    /// Returns [`ReadOutcome::Removed`] when the virtual network no longer exists.
    ///
    /// # Errors
    /// * `InvalidIdentity` if `id` is not a DNS servers ID
    /// * `RemoteRead` if fetching the virtual network fails
    /// * `OperationTimeout` if the read deadline elapses
    pub async fn read(&self, id: &str) -> NetworkResult<ReadOutcome> {
        let id = VirtualNetworkDnsServersId::parse(id)?;
        self.read_id(&id).await
    }

    /// Brings existing DNS servers under management.
    ///
    /// Unlike [`DnsServersResource::read`], a bare virtual network ID or a name
    /// other than `default` is rejected with a hint.
    ///
    /// # Errors
    /// Same as [`DnsServersResource::read`].
    pub async fn import(&self, id: &str) -> NetworkResult<ReadOutcome> {
        let parsed = match VirtualNetworkDnsServersId::parse(id) {
            Ok(parsed) => parsed,
            Err(e) => {
                return Err(match VirtualNetworkId::parse(id) {
                    Ok(vnet_id) => NetworkError::InvalidIdentity {
                        input: id.to_string(),
                        reason: format!(
                            "expected a DNS servers ID, got a virtual network ID; import {} instead",
                            VirtualNetworkDnsServersId::for_virtual_network(&vnet_id)
                        ),
                    },
                    Err(_) => e,
                });
            }
        };
        if parsed.name() != DNS_SERVERS_NAME {
            return Err(NetworkError::InvalidIdentity {
                input: id.to_string(),
                reason: format!(
                    "the DNS servers name must be {:?}, got {:?}",
                    DNS_SERVERS_NAME,
                    parsed.name()
                ),
            });
        }

        info!(id = %parsed, "importing DNS servers");
        self.read_id(&parsed).await
    }

    /// Clears the DNS servers of the virtual network tracked under `id`.
    ///
    /// Deleting twice is harmless: a missing virtual network, missing DHCP
    /// options or an already empty list yield [`DeleteOutcome::AlreadyRemoved`].
    ///
    /// # Errors
    /// * `InvalidIdentity` if `id` is not a DNS servers ID
    /// * `RemoteRead` if fetching the virtual network fails
    /// * `MalformedRemoteObject` if the virtual network has no properties
    /// * `RemoteWrite` if the update cannot be submitted or does not succeed
    /// * `OperationTimeout` if the delete deadline elapses
    pub async fn delete(&self, id: &str) -> NetworkResult<DeleteOutcome> {
        let id = VirtualNetworkDnsServersId::parse(id)?;
        let vnet_id = id.virtual_network_id();

        with_deadline(&id, "deleting", self.timeouts.delete, async {
            let _lock = self
                .locks
                .acquire(id.virtual_network_name(), VIRTUAL_NETWORK_RESOURCE_NAME)
                .await;

            let mut vnet = match self.fetch(&vnet_id).await {
                Ok(vnet) => vnet,
                Err(e) if e.is_not_found() => {
                    info!(
                        "Virtual Network {} does not exist - removing {} from state",
                        vnet_id, id
                    );
                    return Ok(DeleteOutcome::AlreadyRemoved);
                }
                Err(e) => return Err(NetworkError::remote_read(&vnet_id, e)),
            };

            let properties = vnet
                .properties
                .as_mut()
                .ok_or_else(|| without_properties(&vnet_id))?;
            let Some(dhcp_options) = properties.dhcp_options.as_mut() else {
                info!(
                    "dhcpOptions for {} was nil, dnsServers already deleted - removing {} from state",
                    vnet_id, id
                );
                return Ok(DeleteOutcome::AlreadyRemoved);
            };
            if dhcp_options.dns_servers.as_ref().is_none_or(Vec::is_empty) {
                info!(%id, "no DNS servers configured, nothing to delete");
                return Ok(DeleteOutcome::AlreadyRemoved);
            }
            dhcp_options.dns_servers = Some(Vec::new());

            self.submit(&id, &vnet, "deleting", "waiting to delete")
                .await?;
            info!(%id, "cleared DNS servers");
            Ok(DeleteOutcome::Deleted)
        })
        .await
    }

    async fn read_id(&self, id: &VirtualNetworkDnsServersId) -> NetworkResult<ReadOutcome> {
        let vnet_id = id.virtual_network_id();

        with_deadline(id, "reading", self.timeouts.read, async {
            let vnet = match self.fetch(&vnet_id).await {
                Ok(vnet) => vnet,
                Err(e) if e.is_not_found() => {
                    warn!(%id, "virtual network {} was not found, removing from state", vnet_id);
                    return Ok(ReadOutcome::Removed);
                }
                Err(e) => return Err(NetworkError::remote_read(id, e)),
            };

            Ok(ReadOutcome::Present(DnsServersState {
                id: id.clone(),
                dns_servers: vnet.dns_servers(),
                virtual_network_id: vnet_id.clone(),
            }))
        })
        .await
    }

    async fn fetch(&self, vnet_id: &VirtualNetworkId) -> NetworkResult<VirtualNetwork> {
        debug!(%vnet_id, "fetching virtual network");
        self.api
            .get(vnet_id.resource_group(), vnet_id.name())
            .await
    }

    async fn submit(
        &self,
        id: &VirtualNetworkDnsServersId,
        vnet: &VirtualNetwork,
        action: &'static str,
        wait_action: &'static str,
    ) -> NetworkResult<()> {
        let operation = self
            .api
            .create_or_update(id.resource_group(), id.virtual_network_name(), vnet)
            .await
            .map_err(|e| NetworkError::remote_write(id, action, e))?;

        debug!(%id, "waiting for virtual network update to complete");
        operation
            .wait_for_completion()
            .await
            .map_err(|e| NetworkError::remote_write(id, wait_action, e))
    }
}

fn without_properties(vnet_id: &VirtualNetworkId) -> NetworkError {
    NetworkError::MalformedRemoteObject {
        id: vnet_id.to_string(),
        message: "without any properties".to_string(),
    }
}

/// Runs `operation`, giving up with `OperationTimeout` once `deadline` elapses.
///
/// Giving up drops the operation, which releases any lock it holds. The remote
/// side is not cancelled.
async fn with_deadline<T>(
    id: &VirtualNetworkDnsServersId,
    operation: &'static str,
    deadline: Duration,
    fut: impl Future<Output = NetworkResult<T>>,
) -> NetworkResult<T> {
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(NetworkError::OperationTimeout {
            id: id.to_string(),
            operation,
            timeout: deadline,
        }),
    }
}
