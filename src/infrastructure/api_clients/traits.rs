//! Trait for support API clients

use async_trait::async_trait;
use serde_json::Value;

use super::endpoints::Endpoint;
use crate::application::errors::SupportError;

/// Authenticated access to the Cisco Support endpoint families.
#[async_trait]
pub trait SupportApi: Send + Sync {
    /// Issue one authenticated GET for the given endpoint family and return
    /// the raw JSON body.
    async fn get(&self, endpoint: &Endpoint) -> Result<Value, SupportError>;

    /// Check that a bearer token can be obtained with the configured
    /// credentials, without touching any data endpoint.
    async fn verify_credentials(&self) -> Result<(), SupportError>;
}
