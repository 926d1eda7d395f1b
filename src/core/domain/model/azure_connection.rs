use crate::core::domain::value_object::{
    ClientId, ClientSecret, EndpointUrl, SubscriptionId, TenantId,
};

/// Everything needed to reach and authenticate against a Resource Manager endpoint.
#[derive(Debug, Clone)]
pub struct AzureConnection {
    subscription_id: SubscriptionId,
    tenant_id: TenantId,
    client_id: ClientId,
    client_secret: ClientSecret,
    management_endpoint: EndpointUrl,
    authority_endpoint: EndpointUrl,
    accept_invalid_certs: bool,
}

impl AzureConnection {
    pub fn new(
        subscription_id: SubscriptionId,
        tenant_id: TenantId,
        client_id: ClientId,
        client_secret: ClientSecret,
        management_endpoint: EndpointUrl,
        authority_endpoint: EndpointUrl,
        accept_invalid_certs: bool,
    ) -> Self {
        Self {
            subscription_id,
            tenant_id,
            client_id,
            client_secret,
            management_endpoint,
            authority_endpoint,
            accept_invalid_certs,
        }
    }

    pub fn subscription_id(&self) -> &SubscriptionId {
        &self.subscription_id
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn client_secret(&self) -> &ClientSecret {
        &self.client_secret
    }

    pub fn management_endpoint(&self) -> &EndpointUrl {
        &self.management_endpoint
    }

    pub fn authority_endpoint(&self) -> &EndpointUrl {
        &self.authority_endpoint
    }

    pub fn accept_invalid_certs(&self) -> bool {
        self.accept_invalid_certs
    }

    /// URL of the OAuth2 token endpoint of the configured tenant.
    pub fn token_url(&self) -> String {
        self.authority_endpoint
            .join(&format!("{}/oauth2/v2.0/token", self.tenant_id.as_str()))
    }
}
