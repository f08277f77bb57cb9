//! Infrastructure layer: Cisco API clients and caching

pub mod api_clients;
pub mod cache;
