use crate::core::domain::{
    error::{NetworkError, NetworkResult},
    value_object::{
        resource_id::{NETWORK_PROVIDER, ResourceIdSegments},
        virtual_network_id::VirtualNetworkId,
    },
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The name segment every DNS servers ID carries. The sub-resource has no
/// remote identity of its own.
pub const DNS_SERVERS_NAME: &str = "default";

/// The ID of the DNS servers of a virtual network.
///
/// This is a synthetic ID: it is the parent virtual network ID with a
/// `/dnsServers/default` suffix and never refers to a remote object itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VirtualNetworkDnsServersId {
    subscription_id: String,
    resource_group: String,
    virtual_network_name: String,
    name: String,
}

impl VirtualNetworkDnsServersId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        virtual_network_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            virtual_network_name: virtual_network_name.into(),
            name: name.into(),
        }
    }

    /// Derives the DNS servers ID of the given virtual network.
    #[must_use]
    pub fn for_virtual_network(vnet: &VirtualNetworkId) -> Self {
        Self::new(
            vnet.subscription_id(),
            vnet.resource_group(),
            vnet.name(),
            DNS_SERVERS_NAME,
        )
    }

    /// Parses a DNS servers ID.
    ///
    /// # Errors
    /// Returns `NetworkError::InvalidIdentity` if the input is not a DNS servers ID.
    pub fn parse(input: &str) -> NetworkResult<Self> {
        let mut segments = ResourceIdSegments::parse(input)?;
        segments.expect_provider(NETWORK_PROVIDER)?;
        let virtual_network_name = segments.pop("virtualNetworks")?;
        let name = segments.pop("dnsServers")?;
        let id = Self::new(
            segments.subscription_id(),
            segments.resource_group(),
            virtual_network_name,
            name,
        );
        segments.finish()?;
        Ok(id)
    }

    /// Reduces this ID to the ID of the virtual network it belongs to.
    #[must_use]
    pub fn virtual_network_id(&self) -> VirtualNetworkId {
        VirtualNetworkId::new(
            &self.subscription_id,
            &self.resource_group,
            &self.virtual_network_name,
        )
    }

    #[must_use]
    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    #[must_use]
    pub fn resource_group(&self) -> &str {
        &self.resource_group
    }

    #[must_use]
    pub fn virtual_network_name(&self) -> &str {
        &self.virtual_network_name
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for VirtualNetworkDnsServersId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/dnsServers/{}", self.virtual_network_id(), self.name)
    }
}

impl FromStr for VirtualNetworkDnsServersId {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VirtualNetworkDnsServersId {
    type Error = NetworkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VirtualNetworkDnsServersId> for String {
    fn from(id: VirtualNetworkDnsServersId) -> Self {
        id.to_string()
    }
}
