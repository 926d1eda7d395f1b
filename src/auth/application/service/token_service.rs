use crate::{
    auth::application::{
        request::token_request::TokenRequest,
        response::token_response::{TokenErrorResponse, TokenResponse},
    },
    core::domain::{
        error::{NetworkError, NetworkResult},
        model::{azure_auth::AzureAuth, azure_connection::AzureConnection},
        value_object::{AccessToken, validate_access_token},
    },
};

use reqwest::{
    Client, StatusCode,
    header::{ACCEPT, HeaderMap, HeaderValue},
};
use std::time::Duration;
use tracing::{debug, info};

/// Obtains access tokens with the OAuth2 client-credentials flow.
pub struct TokenService {
    default_headers: HeaderMap,
}

impl TokenService {
    pub fn new() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Self { default_headers }
    }

    pub async fn execute(
        &self,
        http_client: &Client,
        connection: &AzureConnection,
    ) -> NetworkResult<AzureAuth> {
        let url = connection.token_url();
        let request = self.build_token_request(connection);
        debug!(%url, client_id = %request.client_id, "requesting access token");
        let response = self.send_request(http_client, &url, &request).await?;

        match response.status() {
            StatusCode::OK => self.handle_successful_response(response).await,
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(NetworkError::Authentication(
                    self.describe_failure(response).await,
                ))
            }
            StatusCode::NOT_FOUND => Err(NetworkError::Connection(
                "Token endpoint not found".to_string(),
            )),
            StatusCode::SERVICE_UNAVAILABLE => Err(NetworkError::Connection(
                "Token service is currently unavailable".to_string(),
            )),
            status => Err(NetworkError::Connection(format!(
                "Unexpected response status: {}",
                status
            ))),
        }
    }

    fn build_token_request(&self, connection: &AzureConnection) -> TokenRequest {
        TokenRequest {
            grant_type: "client_credentials",
            client_id: connection.client_id().as_str().to_string(),
            client_secret: connection.client_secret().as_str().to_string(),
            scope: connection.management_endpoint().default_scope(),
        }
    }

    async fn send_request(
        &self,
        client: &Client,
        url: &str,
        request: &TokenRequest,
    ) -> NetworkResult<reqwest::Response> {
        client
            .post(url)
            .headers(self.default_headers.clone())
            .form(request)
            .send()
            .await
            .map_err(|e| NetworkError::Connection(e.to_string()))
    }

    async fn describe_failure(&self, response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<TokenErrorResponse>().await {
            Ok(err) => match err.error_description {
                Some(description) => format!("{}: {}", err.error, description),
                None => err.error,
            },
            Err(_) => format!("Token request rejected with status {}", status),
        }
    }

    async fn handle_successful_response(
        &self,
        response: reqwest::Response,
    ) -> NetworkResult<AzureAuth> {
        let token_response = response.json::<TokenResponse>().await.map_err(|e| {
            NetworkError::Connection(format!("Failed to parse token response: {}", e))
        })?;

        validate_access_token(&token_response.access_token)?;
        info!(
            token_type = token_response.token_type.as_deref().unwrap_or("Bearer"),
            expires_in = token_response.expires_in,
            "obtained access token"
        );

        let token = AccessToken::new_unchecked(
            token_response.access_token,
            Duration::from_secs(token_response.expires_in),
        );
        Ok(AzureAuth::new(token))
    }
}

impl Default for TokenService {
    fn default() -> Self {
        Self::new()
    }
}
