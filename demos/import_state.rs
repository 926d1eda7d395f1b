//! Import DNS servers configured outside of this crate.
//!
//! Takes a DNS servers ID on the command line, e.g.
//! `/subscriptions/.../virtualNetworks/vnet1/dnsServers/default`, and prints
//! the state that would be tracked for it as JSON.

use std::env;
use tracing_subscriber::EnvFilter;
use vnet_dns::{AzureNetworkClient, NetworkResult, ReadOutcome};

#[tokio::main]
async fn main() -> NetworkResult<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let id = env::args()
        .nth(1)
        .expect("usage: import_state <dns servers id>");

    let client = AzureNetworkClient::builder()
        .subscription_id(env::var("AZURE_SUBSCRIPTION_ID").expect("AZURE_SUBSCRIPTION_ID not set"))
        .tenant_id(env::var("AZURE_TENANT_ID").expect("AZURE_TENANT_ID not set"))
        .client_credentials(
            env::var("AZURE_CLIENT_ID").expect("AZURE_CLIENT_ID not set"),
            env::var("AZURE_CLIENT_SECRET").expect("AZURE_CLIENT_SECRET not set"),
        )
        .build()
        .await?;

    match client.dns_servers().import(&id).await? {
        ReadOutcome::Present(state) => {
            let json = serde_json::to_string_pretty(&state)
                .expect("state serializes to JSON");
            println!("{}", json);
        }
        ReadOutcome::Removed => println!("{} no longer exists, nothing to import", id),
    }

    Ok(())
}
