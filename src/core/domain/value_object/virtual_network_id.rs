use crate::core::domain::{
    error::{NetworkError, NetworkResult},
    value_object::resource_id::{NETWORK_PROVIDER, ResourceIdSegments},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The ID of an Azure virtual network.
///
/// Formats as
/// `/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.Network/virtualNetworks/{name}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VirtualNetworkId {
    subscription_id: String,
    resource_group: String,
    name: String,
}

impl VirtualNetworkId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            name: name.into(),
        }
    }

    /// Parses a virtual network ID.
    ///
    /// # Errors
    /// Returns `NetworkError::InvalidIdentity` if the input is not exactly a
    /// virtual network ID (child resource IDs are rejected too).
    pub fn parse(input: &str) -> NetworkResult<Self> {
        let mut segments = ResourceIdSegments::parse(input)?;
        segments.expect_provider(NETWORK_PROVIDER)?;
        let name = segments.pop("virtualNetworks")?;
        let id = Self::new(segments.subscription_id(), segments.resource_group(), name);
        segments.finish()?;
        Ok(id)
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
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for VirtualNetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourceGroups/{}/providers/{}/virtualNetworks/{}",
            self.subscription_id, self.resource_group, NETWORK_PROVIDER, self.name
        )
    }
}

impl FromStr for VirtualNetworkId {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VirtualNetworkId {
    type Error = NetworkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VirtualNetworkId> for String {
    fn from(id: VirtualNetworkId) -> Self {
        id.to_string()
    }
}
