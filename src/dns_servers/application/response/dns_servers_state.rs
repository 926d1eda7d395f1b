use crate::core::domain::value_object::{VirtualNetworkDnsServersId, VirtualNetworkId};
use serde::{Deserialize, Serialize};

/// Locally tracked state of a DNS servers resource.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DnsServersState {
    /// Key under which the state is tracked.
    pub id: VirtualNetworkDnsServersId,
    /// Parent virtual network, reconstructed from `id`.
    pub virtual_network_id: VirtualNetworkId,
    /// DNS servers as currently configured on the virtual network.
    pub dns_servers: Vec<String>,
}

/// Result of refreshing a resource from the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The resource exists; here is its state.
    Present(DnsServersState),
    /// The parent virtual network is gone; stop tracking the resource.
    Removed,
}

impl ReadOutcome {
    /// Returns the state if the resource is still present.
    #[must_use]
    pub fn into_state(self) -> Option<DnsServersState> {
        match self {
            ReadOutcome::Present(state) => Some(state),
            ReadOutcome::Removed => None,
        }
    }

    #[must_use]
    pub fn is_removed(&self) -> bool {
        matches!(self, ReadOutcome::Removed)
    }
}

/// Result of deleting a resource. Either way the resource is no longer tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The DNS servers were cleared on the virtual network.
    Deleted,
    /// Nothing to clear: the virtual network or its DNS servers were already gone.
    AlreadyRemoved,
}
