use serde::{Deserialize, Deserializer};

/// Successful answer of the token endpoint.
#[derive(Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds. The v1 endpoint sends it as a string.
    #[serde(deserialize_with = "seconds_from_number_or_string")]
    pub expires_in: u64,
}

/// Error answer of the token endpoint.
#[derive(Deserialize)]
pub struct TokenErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

fn seconds_from_number_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Number(u64),
        Text(String),
    }

    match Seconds::deserialize(deserializer)? {
        Seconds::Number(n) => Ok(n),
        Seconds::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}
