pub mod dns_servers_config;
