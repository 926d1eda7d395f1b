//! Manage the DNS servers of an existing virtual network.
//!
//! Reads the service principal from `AZURE_*` environment variables (a `.env`
//! file is honoured), points the virtual network named by `VNET_ID` at two
//! custom DNS servers, reads them back and finally clears them again.
//!
//! Run with `RUST_LOG=vnet_dns=debug` to see every request and lock transition.

use std::env;
use tracing_subscriber::EnvFilter;
use vnet_dns::{AzureNetworkClient, DeleteOutcome, DnsServersConfig, NetworkResult, ReadOutcome};

#[tokio::main]
async fn main() -> NetworkResult<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let vnet_id = env::var("VNET_ID").expect("VNET_ID not set");

    let client = AzureNetworkClient::builder()
        .subscription_id(env::var("AZURE_SUBSCRIPTION_ID").expect("AZURE_SUBSCRIPTION_ID not set"))
        .tenant_id(env::var("AZURE_TENANT_ID").expect("AZURE_TENANT_ID not set"))
        .client_credentials(
            env::var("AZURE_CLIENT_ID").expect("AZURE_CLIENT_ID not set"),
            env::var("AZURE_CLIENT_SECRET").expect("AZURE_CLIENT_SECRET not set"),
        )
        .build()
        .await?;

    client.login().await?;
    println!("Authenticated: {}", client.is_authenticated().await);

    let resource = client.dns_servers();

    // Order matters: the first server is queried first.
    let state = resource
        .create(&DnsServersConfig::new(&vnet_id, ["10.0.0.4", "10.0.0.5"]))
        .await?;
    println!("Managing {}", state.id);
    println!("DNS servers: {:?}", state.dns_servers);

    match resource.read(&state.id.to_string()).await? {
        ReadOutcome::Present(current) => println!("Read back: {:?}", current.dns_servers),
        ReadOutcome::Removed => println!("The virtual network disappeared"),
    }

    match resource.delete(&state.id.to_string()).await? {
        DeleteOutcome::Deleted => println!("DNS servers cleared, Azure-provided DNS is back"),
        DeleteOutcome::AlreadyRemoved => println!("Nothing left to clear"),
    }

    Ok(())
}
