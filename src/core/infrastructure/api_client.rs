//! Internal HTTP client that handles authentication and automatic token refresh.

use crate::{
    auth::application::service::token_service::TokenService,
    core::domain::{
        error::{NetworkError, NetworkResult, ValidationError},
        model::{
            azure_auth::AzureAuth, azure_connection::AzureConnection,
            client_config::ClientConfig, operation_status::ErrorResponse,
        },
    },
};
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{
    Client, Method, StatusCode,
    header::{AUTHORIZATION, HeaderMap},
};
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// A response that passed the status checks of [`ApiClient`].
#[derive(Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl ApiResponse {
    /// Parses the body as JSON.
    ///
    /// # Errors
    /// Returns `NetworkError::Connection` if the body is not valid JSON for `T`.
    pub fn json<T>(&self) -> NetworkResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_json::from_str(&self.body)
            .map_err(|e| NetworkError::Connection(format!("Failed to parse response: {}", e)))
    }

    /// Returns a header value as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Internal HTTP client that manages authentication and provides methods to call
/// the Resource Manager API.
///
/// Every request carries an `Authorization: Bearer` header. If a request receives a
/// `401 Unauthorized` response, the token is refreshed once using the stored
/// client credentials and the request is retried.
#[derive(Debug)]
pub struct ApiClient {
    http_client: Client,
    connection: Arc<AzureConnection>,
    auth: Arc<RwLock<Option<AzureAuth>>>,
    config: Arc<ClientConfig>,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl ApiClient {
    /// Creates a new `ApiClient`. The client starts unauthenticated.
    ///
    /// # Errors
    /// Returns `NetworkError::Connection` if the HTTP client cannot be built and
    /// `NetworkError::Validation` if the rate limit is configured with zeroes.
    pub fn new(connection: AzureConnection, config: ClientConfig) -> NetworkResult<Self> {
        let http_client = Client::builder()
            .danger_accept_invalid_certs(connection.accept_invalid_certs())
            .build()
            .map_err(|e| NetworkError::Connection(e.to_string()))?;

        let rate_limiter = match config.rate_limit {
            Some(rl) => {
                let per_second = non_zero("rate_limit.requests_per_second", rl.requests_per_second)?;
                let burst = non_zero("rate_limit.burst_size", rl.burst_size)?;
                let quota = Quota::per_second(per_second).allow_burst(burst);
                Some(Arc::new(DefaultDirectRateLimiter::direct(quota)))
            }
            None => None,
        };

        Ok(Self {
            http_client,
            connection: Arc::new(connection),
            auth: Arc::new(RwLock::new(None)),
            config: Arc::new(config),
            rate_limiter,
        })
    }

    /// Returns a reference to the underlying connection details.
    pub fn connection(&self) -> &AzureConnection {
        &self.connection
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sets the authentication state (used after a successful token request).
    pub async fn set_auth(&self, auth: AzureAuth) {
        let mut lock = self.auth.write().await;
        *lock = Some(auth);
    }

    /// Returns the current authentication state, if any.
    pub async fn auth(&self) -> Option<AzureAuth> {
        self.auth.read().await.clone()
    }

    /// Returns `true` if there is a token that is not about to expire.
    pub async fn is_authenticated(&self) -> bool {
        let lock = self.auth.read().await;
        lock.as_ref()
            .map(|a| !a.token().is_expired(self.config.token_refresh_margin))
            .unwrap_or(false)
    }

    /// Performs an authenticated GET request and parses the JSON body.
    ///
    /// `path` is relative to the management endpoint unless it is an absolute URL.
    ///
    /// # Errors
    /// Returns `NetworkError::NotFound` on `404`, `NetworkError::Api` on other
    /// non-success statuses, and `NetworkError::Connection` on transport or parse failures.
    pub async fn get<T>(&self, path: &str) -> NetworkResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.execute_request(Method::GET, path, None::<&()>)
            .await?
            .json()
    }

    /// Performs an authenticated PUT request with a JSON body.
    ///
    /// The raw response is returned so callers can inspect long-running
    /// operation headers.
    ///
    /// # Errors
    /// Same as [`ApiClient::get`].
    pub async fn put<B>(&self, path: &str, body: &B) -> NetworkResult<ApiResponse>
    where
        B: serde::Serialize,
    {
        self.execute_request(Method::PUT, path, Some(body)).await
    }

    /// Performs an authenticated GET request and returns the raw response.
    ///
    /// Used to poll long-running operation URLs, where `202 Accepted` is a valid answer.
    ///
    /// # Errors
    /// Same as [`ApiClient::get`].
    pub async fn poll(&self, url: &str) -> NetworkResult<ApiResponse> {
        self.execute_request(Method::GET, url, None::<&()>).await
    }

    /// Core request execution method. It ensures authentication, sends the request,
    /// handles 401 by refreshing once, and checks the response status.
    async fn execute_request<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> NetworkResult<ApiResponse>
    where
        B: serde::Serialize,
    {
        self.ensure_authenticated().await?;

        let url = self.resolve_url(path);
        let response = self.send(method.clone(), &url, body).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(%url, "request was rejected as unauthorized, refreshing token");
            self.refresh_auth().await?;
            // Retry exactly once
            let response = self.send(method, &url, body).await?;
            return Self::check_response(&url, response).await;
        }

        Self::check_response(&url, response).await
    }

    async fn send<B>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> NetworkResult<reqwest::Response>
    where
        B: serde::Serialize,
    {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        debug!(%method, %url, "sending request");
        let mut req_builder = self.http_client.request(method, url);

        {
            let auth_guard = self.auth.read().await;
            if let Some(auth) = auth_guard.as_ref() {
                req_builder = req_builder.header(AUTHORIZATION, auth.token().as_bearer_header());
            }
        }

        if let Some(body) = body {
            req_builder = req_builder.json(body);
        }

        req_builder
            .send()
            .await
            .map_err(|e| NetworkError::Connection(format!("HTTP request failed: {}", e)))
    }

    async fn check_response(url: &str, response: reqwest::Response) -> NetworkResult<ApiResponse> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| NetworkError::Connection(format!("Failed to read response: {}", e)))?;
        debug!(%url, status = status.as_u16(), "received response");

        if status == StatusCode::NOT_FOUND {
            return Err(NetworkError::NotFound {
                resource: url.to_string(),
            });
        }

        if !status.is_success() {
            let (code, message) = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(err) => (err.error.code, err.error.message),
                Err(_) => (
                    status.canonical_reason().unwrap_or("unknown").to_string(),
                    body,
                ),
            };
            return Err(NetworkError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }

    fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("https://") || path.starts_with("http://") {
            path.to_string()
        } else {
            self.connection.management_endpoint().join(path)
        }
    }

    /// Ensures that we have a token that is not about to expire. If not, attempts to refresh.
    async fn ensure_authenticated(&self) -> NetworkResult<()> {
        if !self.is_authenticated().await {
            self.refresh_auth().await?;
        }
        Ok(())
    }

    /// Requests a fresh token using the stored client credentials.
    pub(crate) async fn refresh_auth(&self) -> NetworkResult<()> {
        let service = TokenService::new();
        let auth = service.execute(&self.http_client, &self.connection).await?;
        self.set_auth(auth).await;
        Ok(())
    }
}

fn non_zero(field: &str, value: u32) -> NetworkResult<NonZeroU32> {
    NonZeroU32::new(value).ok_or_else(|| {
        ValidationError::Field {
            field: field.to_string(),
            message: "must be greater than zero".to_string(),
        }
        .into()
    })
}
