pub mod dns_servers_resource;
