use serde::Serialize;

/// Form body of an OAuth2 client-credentials token request.
#[derive(Serialize)]
pub struct TokenRequest {
    pub grant_type: &'static str,
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
}
