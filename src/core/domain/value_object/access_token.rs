use crate::core::domain::error::ValidationError;
use std::fmt;
use std::time::{Duration, SystemTime};

/// Upper bound on the lifetime accepted from the token endpoint.
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// An OAuth2 bearer token for the Resource Manager API.
#[derive(Clone)]
pub struct AccessToken {
    value: String,
    expires_at: SystemTime,
}

impl AccessToken {
    /// Creates a new token without validation, valid for `expires_in` from now.
    ///
    /// Lifetimes above one day are capped.
    pub(crate) fn new_unchecked(value: String, expires_in: Duration) -> Self {
        let now = SystemTime::now();
        Self {
            value,
            expires_at: now
                .checked_add(expires_in.min(MAX_TOKEN_LIFETIME))
                .unwrap_or(now),
        }
    }

    /// Returns the token value as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns the expiry time.
    #[must_use]
    pub fn expires_at(&self) -> SystemTime {
        self.expires_at
    }

    /// Checks if the token expires within the given margin.
    #[must_use]
    pub fn is_expired(&self, margin: Duration) -> bool {
        self.expires_at
            .duration_since(SystemTime::now())
            .map(|remaining| remaining <= margin)
            .unwrap_or(true)
    }

    /// Formats the token as an `Authorization` header value.
    #[must_use]
    pub fn as_bearer_header(&self) -> String {
        format!("Bearer {}", self.value)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"******")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Validates the format of an access token string.
pub(crate) fn validate_access_token(token: &str) -> Result<(), ValidationError> {
    if token.is_empty() {
        return Err(ValidationError::Field {
            field: "access_token".to_string(),
            message: "Access token cannot be empty".to_string(),
        });
    }
    if token.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ValidationError::Format(
            "Access token cannot contain whitespace".to_string(),
        ));
    }
    Ok(())
}
