//! Domain models for the Azure virtual network resource.
//!
//! Only the fields this crate reads or writes are modelled. Every other member
//! of the JSON document is captured in an `extra` map and written back
//! unchanged, so a read-modify-write never drops address spaces, subnets,
//! peerings or anything else the service returns.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A virtual network as returned by
/// `GET /subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.Network/virtualNetworks/{name}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct VirtualNetwork {
    /// Resource ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Resource name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Azure region (e.g., "westeurope").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Concurrency token, changes on every update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Properties of the virtual network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<VirtualNetworkProperties>,
    /// Members not modelled above (type, tags, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `properties` object of a virtual network.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNetworkProperties {
    /// DHCP options, including the DNS servers handed to attached VMs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dhcp_options: Option<DhcpOptions>,
    /// Provisioning state (e.g., "Succeeded", "Updating").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    /// Members not modelled above (addressSpace, subnets, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `dhcpOptions` object of a virtual network.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DhcpOptions {
    /// DNS server IP addresses, in priority order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_servers: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VirtualNetwork {
    /// Returns the configured DNS servers, empty when the options are absent.
    #[must_use]
    pub fn dns_servers(&self) -> Vec<String> {
        self.properties
            .as_ref()
            .and_then(|p| p.dhcp_options.as_ref())
            .and_then(|d| d.dns_servers.clone())
            .unwrap_or_default()
    }
}

/// Provisioning states after which a resource is no longer changing.
pub(crate) fn is_terminal_provisioning_state(state: &str) -> bool {
    matches!(
        state.to_ascii_lowercase().as_str(),
        "succeeded" | "failed" | "canceled"
    )
}
