mod access_token;
mod client_credentials;
mod dns_servers_id;
mod endpoint_url;
mod resource_id;
mod subscription_id;
mod tenant_id;
mod virtual_network_id;

pub use access_token::AccessToken;
pub use client_credentials::{ClientId, ClientSecret};
pub use dns_servers_id::{DNS_SERVERS_NAME, VirtualNetworkDnsServersId};
pub use endpoint_url::{DEFAULT_AUTHORITY_ENDPOINT, DEFAULT_MANAGEMENT_ENDPOINT, EndpointUrl};
pub use subscription_id::SubscriptionId;
pub use tenant_id::TenantId;
pub use virtual_network_id::VirtualNetworkId;

// Re-export validation functions for internal use
pub(crate) use access_token::validate_access_token;
pub(crate) use client_credentials::{validate_client_id, validate_client_secret};
pub(crate) use subscription_id::validate_subscription_id;
pub(crate) use tenant_id::validate_tenant_id;
