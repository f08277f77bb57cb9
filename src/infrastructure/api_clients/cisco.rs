//! Authenticated client for the Cisco Support APIs

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use super::classify_send_error;
use super::endpoints::Endpoint;
use super::token::TokenManager;
use super::traits::SupportApi;
use crate::application::errors::{ApiError, SupportError};
use crate::config::ApiConfig;

/// Client for the Cisco Support APIs using OAuth2 bearer authentication.
///
/// Non-2xx responses surface as typed errors; there are no retries beyond a
/// single token-refresh-and-retry on 401, since callers treat each data
/// section independently and must not block a whole page on one upstream.
pub struct CiscoApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenManager>,
    timeout_seconds: u64,
}

impl CiscoApiClient {
    pub fn new(config: &ApiConfig, tokens: Arc<TokenManager>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("cisco-support/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens,
            timeout_seconds: config.timeout_seconds,
        }
    }

    /// Construct a client with its own token manager from configuration.
    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(config, Arc::new(TokenManager::new(config)))
    }

    async fn send(&self, endpoint: &Endpoint, token: &str) -> Result<reqwest::Response, SupportError> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        let mut request = self
            .http
            .get(&url)
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json");

        let query = endpoint.query();
        if !query.is_empty() {
            request = request.query(&query);
        }

        request
            .send()
            .await
            .map_err(|e| classify_send_error(e, self.timeout_seconds))
    }
}

#[async_trait]
impl SupportApi for CiscoApiClient {
    async fn get(&self, endpoint: &Endpoint) -> Result<Value, SupportError> {
        let token = self.tokens.get_token().await?;
        let mut response = self.send(endpoint, &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            // Stale or revoked token: refresh once, retry once.
            debug!(family = endpoint.family(), "401 from upstream, refreshing token");
            self.tokens.invalidate().await;
            let token = self.tokens.get_token().await?;
            response = self.send(endpoint, &token).await?;

            if response.status() == StatusCode::UNAUTHORIZED {
                return Err(SupportError::Api(ApiError::Authentication));
            }
        }

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                family = endpoint.family(),
                "upstream request failed"
            );
            return Err(SupportError::Api(ApiError::Http {
                status: status.as_u16(),
                message,
            }));
        }

        response.json().await.map_err(SupportError::Network)
    }

    async fn verify_credentials(&self) -> Result<(), SupportError> {
        self.tokens.get_token().await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use serde_json::json;

    fn test_config(base_url: String, token_url: String) -> ApiConfig {
        ApiConfig {
            client_id: "test-client".to_string(),
            client_secret: "test-secret".to_string(),
            base_url,
            token_url,
            timeout_seconds: 5,
        }
    }

    fn client_for(server: &Server) -> (CiscoApiClient, Arc<TokenManager>) {
        let config = test_config(server.url(), format!("{}/token", server.url()));
        let tokens = Arc::new(TokenManager::new(&config));
        (CiscoApiClient::new(&config, tokens.clone()), tokens)
    }

    fn grant_body(token: &str) -> String {
        json!({
            "access_token": token,
            "token_type": "Bearer",
            "expires_in": 3600
        })
        .to_string()
    }

    #[tokio::test]
    async fn get_attaches_bearer_token() {
        let mut server = Server::new_async().await;
        let _token_mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(grant_body("tok-1"))
            .create_async()
            .await;
        let api_mock = server
            .mock("GET", "/product/v1/information/serial_numbers/ABC123")
            .match_header("authorization", "Bearer tok-1")
            .match_header("accept", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"product_list": []}"#)
            .expect(1)
            .create_async()
            .await;

        let (client, _) = client_for(&server);
        let body = client
            .get(&Endpoint::ProductInfo {
                serial: "ABC123".into(),
            })
            .await
            .unwrap();

        api_mock.assert_async().await;
        assert!(body["product_list"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn psirt_query_parameter_is_sent() {
        let mut server = Server::new_async().await;
        let _token_mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(grant_body("tok-1"))
            .create_async()
            .await;
        let api_mock = server
            .mock("GET", "/security/advisories/v2/product")
            .match_query(mockito::Matcher::UrlEncoded(
                "product".into(),
                "C9300-48P".into(),
            ))
            .with_status(200)
            .with_body(r#"{"advisories": []}"#)
            .expect(1)
            .create_async()
            .await;

        let (client, _) = client_for(&server);
        client
            .get(&Endpoint::PsirtByProduct {
                product_id: "C9300-48P".into(),
            })
            .await
            .unwrap();

        api_mock.assert_async().await;
    }

    #[tokio::test]
    async fn upstream_error_carries_status_and_body() {
        let mut server = Server::new_async().await;
        let _token_mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(grant_body("tok-1"))
            .create_async()
            .await;
        let _api_mock = server
            .mock("GET", "/supporttools/eox/rest/5/EOXBySerialNumber/1/ABC123")
            .with_status(500)
            .with_body("Internal Server Error")
            .create_async()
            .await;

        let (client, _) = client_for(&server);
        let result = client
            .get(&Endpoint::EoxBySerial {
                serial: "ABC123".into(),
            })
            .await;

        match result {
            Err(SupportError::Api(ApiError::Http { status, message })) => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("expected HTTP error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn stale_token_is_refreshed_once_and_request_retried() {
        let mut server = Server::new_async().await;
        // Only the refresh grant should hit the token endpoint; the stale
        // token is seeded directly.
        let token_mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(grant_body("fresh"))
            .expect(1)
            .create_async()
            .await;
        let stale_mock = server
            .mock("GET", "/sn2info/v2/coverage/status/serial_numbers/ABC123")
            .match_header("authorization", "Bearer stale")
            .with_status(401)
            .expect(1)
            .create_async()
            .await;
        let fresh_mock = server
            .mock("GET", "/sn2info/v2/coverage/status/serial_numbers/ABC123")
            .match_header("authorization", "Bearer fresh")
            .with_status(200)
            .with_body(r#"{"serial_numbers": []}"#)
            .expect(1)
            .create_async()
            .await;

        let (client, tokens) = client_for(&server);
        tokens.seed("stale").await;

        let result = client
            .get(&Endpoint::CoverageStatus {
                serial: "ABC123".into(),
            })
            .await;

        assert!(result.is_ok());
        token_mock.assert_async().await;
        stale_mock.assert_async().await;
        fresh_mock.assert_async().await;
    }

    #[tokio::test]
    async fn persistent_401_surfaces_as_auth_error_without_looping() {
        let mut server = Server::new_async().await;
        let token_mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(grant_body("tok-1"))
            .expect(2)
            .create_async()
            .await;
        let api_mock = server
            .mock("GET", "/product/v1/information/serial_numbers/ABC123")
            .with_status(401)
            .expect(2)
            .create_async()
            .await;

        let (client, _) = client_for(&server);
        let result = client
            .get(&Endpoint::ProductInfo {
                serial: "ABC123".into(),
            })
            .await;

        match result {
            Err(SupportError::Api(ApiError::Authentication)) => {}
            other => panic!("expected authentication error, got {:?}", other.map(|_| ())),
        }
        // Exactly one refresh and one retry: two token grants, two calls.
        token_mock.assert_async().await;
        api_mock.assert_async().await;
    }
}
