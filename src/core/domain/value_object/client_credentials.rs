use crate::core::domain::error::ValidationError;
use std::fmt;
use uuid::Uuid;

/// The application (client) ID of a service principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientId(String);

impl ClientId {
    /// Creates a new client ID without validation.
    pub(crate) fn new_unchecked(client_id: String) -> Self {
        Self(client_id)
    }

    /// Returns the client ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A service principal client secret (plaintext, kept in memory only).
#[derive(Clone)]
pub struct ClientSecret(String);

impl ClientSecret {
    /// Creates a new client secret without validation.
    pub(crate) fn new_unchecked(secret: String) -> Self {
        Self(secret)
    }

    /// Returns the secret as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClientSecret(******)")
    }
}

/// Validates a client ID.
pub(crate) fn validate_client_id(client_id: &str) -> Result<(), ValidationError> {
    if client_id.is_empty() {
        return Err(ValidationError::Field {
            field: "client_id".to_string(),
            message: "Client ID cannot be empty".to_string(),
        });
    }
    Uuid::parse_str(client_id)
        .map_err(|e| ValidationError::Format(format!("Client ID must be a GUID: {}", e)))?;
    Ok(())
}

/// Validates a client secret.
pub(crate) fn validate_client_secret(secret: &str) -> Result<(), ValidationError> {
    if secret.is_empty() {
        return Err(ValidationError::Field {
            field: "client_secret".to_string(),
            message: "Client secret cannot be empty".to_string(),
        });
    }
    if secret.chars().any(char::is_control) {
        return Err(ValidationError::Format(
            "Client secret cannot contain control characters".to_string(),
        ));
    }
    Ok(())
}
