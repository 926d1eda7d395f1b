use crate::{
    core::domain::{
        error::{NetworkResult, ValidationError},
        value_object::VirtualNetworkId,
    },
    dns_servers::application::response::dns_servers_state::DnsServersState,
};
use serde::{Deserialize, Serialize};

/// Desired configuration of the DNS servers of a virtual network.
///
/// # Examples
///
/// ```
/// use vnet_dns::DnsServersConfig;
///
/// let config: DnsServersConfig = serde_json::from_str(r#"{
///     "virtual_network_id": "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vnet",
///     "dns_servers": ["10.0.0.4", "10.0.0.5"]
/// }"#).unwrap();
/// assert_eq!(config.validate().unwrap().name(), "vnet");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DnsServersConfig {
    /// ID of the virtual network whose DNS servers are managed. Cannot change
    /// once the resource exists.
    pub virtual_network_id: String,
    /// DNS server addresses in priority order. Empty means "use the platform default".
    #[serde(default)]
    pub dns_servers: Vec<String>,
}

impl DnsServersConfig {
    pub fn new<I, S>(virtual_network_id: impl Into<String>, dns_servers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            virtual_network_id: virtual_network_id.into(),
            dns_servers: dns_servers.into_iter().map(Into::into).collect(),
        }
    }

    /// Validates the configuration and returns the parsed virtual network ID.
    ///
    /// # Errors
    /// * `NetworkError::InvalidIdentity` if `virtual_network_id` is not a virtual network ID
    /// * `NetworkError::Validation` if any DNS server entry is empty
    pub fn validate(&self) -> NetworkResult<VirtualNetworkId> {
        let id = VirtualNetworkId::parse(&self.virtual_network_id)?;
        for (index, server) in self.dns_servers.iter().enumerate() {
            if server.is_empty() {
                return Err(ValidationError::Field {
                    field: format!("dns_servers.{}", index),
                    message: "DNS server cannot be empty".to_string(),
                }
                .into());
            }
        }
        Ok(id)
    }

    /// Returns `true` if moving from `state` to this configuration needs the
    /// resource to be destroyed and created again, which is the case when the
    /// virtual network changes.
    ///
    /// # Errors
    /// Returns `InvalidIdentity` if the configured virtual network ID is malformed.
    pub fn requires_replacement(&self, state: &DnsServersState) -> NetworkResult<bool> {
        let configured = VirtualNetworkId::parse(&self.virtual_network_id)?;
        Ok(configured != state.virtual_network_id)
    }
}
