mod auth;
mod core;
mod dns_servers;


pub use crate::core::domain::error::{NetworkError, NetworkResult, ValidationError};
pub use crate::core::domain::model::client_config::{
    ClientConfig, DEFAULT_API_VERSION, RateLimitConfig, ResourceTimeouts,
};
pub use crate::core::domain::model::virtual_network::{
    DhcpOptions, VirtualNetwork, VirtualNetworkProperties,
};
pub use crate::core::domain::value_object::{
    AccessToken, DEFAULT_AUTHORITY_ENDPOINT, DEFAULT_MANAGEMENT_ENDPOINT, DNS_SERVERS_NAME,
    VirtualNetworkDnsServersId, VirtualNetworkId,
};
pub use crate::core::infrastructure::named_locks::{NamedLockGuard, NamedLocks};
pub use crate::core::infrastructure::virtual_networks_client::{
    LongRunningOperation, VirtualNetworksApi, VirtualNetworksClient,
};
pub use crate::dns_servers::application::{
    request::dns_servers_config::DnsServersConfig,
    response::dns_servers_state::{DeleteOutcome, DnsServersState, ReadOutcome},
    service::dns_servers_resource::{DnsServersResource, VIRTUAL_NETWORK_RESOURCE_NAME},
};

use crate::core::{
    domain::{
        model::azure_connection::AzureConnection,
        value_object::{
            ClientId, ClientSecret, EndpointUrl, SubscriptionId, TenantId, validate_client_id,
            validate_client_secret, validate_subscription_id, validate_tenant_id,
        },
    },
    infrastructure::api_client::ApiClient,
};
use std::sync::Arc;
use tracing::info;

/// A client for the Azure virtual network API that manages DNS servers.
///
/// The client authenticates with a service principal (client credentials) and
/// refreshes its token transparently. All resources created from one client share
/// its HTTP connection pool, rate limiter and lock registry.
///
/// # Examples
///
/// ```no_run
/// use vnet_dns::{AzureNetworkClient, NetworkResult, ReadOutcome};
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
///     client.login().await?;
///
///     let outcome = client
///         .dns_servers()
///         .read("/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vnet/dnsServers/default")
///         .await?;
///     if let ReadOutcome::Present(state) = outcome {
///         println!("{:?}", state.dns_servers);
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AzureNetworkClient {
    api_client: Arc<ApiClient>,
    locks: Arc<NamedLocks>,
}

/// Builder for [`AzureNetworkClient`] configuration
#[derive(Debug, Default)]
pub struct AzureNetworkClientBuilder {
    subscription_id: Option<String>,
    tenant_id: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    management_endpoint: Option<String>,
    authority_endpoint: Option<String>,
    allow_http: bool,
    accept_invalid_certs: bool,
    config: Option<ClientConfig>,
    locks: Option<Arc<NamedLocks>>,
}

impl AzureNetworkClientBuilder {
    pub fn subscription_id(mut self, subscription_id: impl Into<String>) -> Self {
        self.subscription_id = Some(subscription_id.into());
        self
    }

    /// Tenant ID (GUID) or domain of the service principal.
    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn client_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Overrides the Resource Manager endpoint, e.g. for a sovereign cloud.
    pub fn management_endpoint(mut self, url: impl Into<String>) -> Self {
        self.management_endpoint = Some(url.into());
        self
    }

    /// Overrides the login authority endpoint.
    pub fn authority_endpoint(mut self, url: impl Into<String>) -> Self {
        self.authority_endpoint = Some(url.into());
        self
    }

    /// Accept `http://` endpoints. Only meant for local emulators and tests.
    pub fn allow_http(mut self, allow_http: bool) -> Self {
        self.allow_http = allow_http;
        self
    }

    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Uses `locks` instead of the process-wide registry.
    pub fn locks(mut self, locks: Arc<NamedLocks>) -> Self {
        self.locks = Some(locks);
        self
    }

    /// Validates the configuration and creates the client.
    ///
    /// No request is sent; the first call (or [`AzureNetworkClient::login`])
    /// obtains a token.
    ///
    /// # Errors
    /// Returns `NetworkError::Validation` if a required field is missing or invalid.
    pub async fn build(self) -> NetworkResult<AzureNetworkClient> {
        let subscription_id = required("subscription_id", self.subscription_id)?;
        validate_subscription_id(&subscription_id)?;

        let tenant_id = required("tenant_id", self.tenant_id)?;
        validate_tenant_id(&tenant_id)?;

        let client_id = required("client_id", self.client_id)?;
        validate_client_id(&client_id)?;

        let client_secret = required("client_secret", self.client_secret)?;
        validate_client_secret(&client_secret)?;

        let management_endpoint = EndpointUrl::parse(
            self.management_endpoint
                .as_deref()
                .unwrap_or(DEFAULT_MANAGEMENT_ENDPOINT),
            self.allow_http,
        )?;
        let authority_endpoint = EndpointUrl::parse(
            self.authority_endpoint
                .as_deref()
                .unwrap_or(DEFAULT_AUTHORITY_ENDPOINT),
            self.allow_http,
        )?;

        let connection = AzureConnection::new(
            SubscriptionId::new_unchecked(subscription_id),
            TenantId::new_unchecked(tenant_id),
            ClientId::new_unchecked(client_id),
            ClientSecret::new_unchecked(client_secret),
            management_endpoint,
            authority_endpoint,
            self.accept_invalid_certs,
        );
        let api_client = ApiClient::new(connection, self.config.unwrap_or_default())?;

        Ok(AzureNetworkClient {
            api_client: Arc::new(api_client),
            locks: self.locks.unwrap_or_else(NamedLocks::shared),
        })
    }
}

fn required(field: &str, value: Option<String>) -> NetworkResult<String> {
    value.ok_or_else(|| {
        ValidationError::Field {
            field: field.to_string(),
            message: format!("{} is required", field),
        }
        .into()
    })
}

impl AzureNetworkClient {
    /// Creates a new builder for AzureNetworkClient configuration
    pub fn builder() -> AzureNetworkClientBuilder {
        AzureNetworkClientBuilder::default()
    }

    /// Requests an access token for the configured service principal.
    ///
    /// Calling this is optional: requests authenticate on demand and refresh
    /// the token when it is about to expire or gets rejected.
    ///
    /// # Errors
    ///
    /// This method will return an error if:
    /// - The credentials are rejected (`NetworkError::Authentication`)
    /// - The authority is unreachable or answers unexpectedly (`NetworkError::Connection`)
    pub async fn login(&self) -> NetworkResult<()> {
        self.api_client.refresh_auth().await?;
        info!(
            subscription_id = %self.api_client.connection().subscription_id().as_str(),
            "authenticated against Azure Resource Manager"
        );
        Ok(())
    }

    /// Returns true if the client holds a token that is not about to expire
    pub async fn is_authenticated(&self) -> bool {
        self.api_client.is_authenticated().await
    }

    /// Returns the current access token, if any
    pub async fn access_token(&self) -> Option<AccessToken> {
        self.api_client
            .auth()
            .await
            .map(|auth| auth.token().clone())
    }

    /// Returns the configuration the client was built with.
    pub fn config(&self) -> &ClientConfig {
        self.api_client.config()
    }

    /// Returns the virtual networks API of the configured subscription.
    pub fn virtual_networks(&self) -> VirtualNetworksClient {
        VirtualNetworksClient::new(Arc::clone(&self.api_client))
    }

    /// Returns the DNS servers resource, sharing this client's lock registry.
    pub fn dns_servers(&self) -> DnsServersResource<VirtualNetworksClient> {
        DnsServersResource::new(
            self.virtual_networks(),
            Arc::clone(&self.locks),
            self.api_client.config().timeouts,
        )
    }
}
