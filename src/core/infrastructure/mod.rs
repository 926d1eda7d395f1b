pub mod api_client;
pub mod named_locks;
pub mod virtual_networks_client;
