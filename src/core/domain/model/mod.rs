pub mod azure_auth;
pub mod azure_connection;
pub mod client_config;
pub mod operation_status;
pub mod virtual_network;
