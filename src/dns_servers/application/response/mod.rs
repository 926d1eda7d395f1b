pub mod dns_servers_state;
