use crate::core::domain::error::ValidationError;
use uuid::Uuid;

/// A validated Azure subscription ID (a GUID).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    /// Creates a new subscription ID without validation.
    pub(crate) fn new_unchecked(subscription_id: String) -> Self {
        Self(subscription_id)
    }

    /// Returns the subscription ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validates a subscription ID.
pub(crate) fn validate_subscription_id(subscription_id: &str) -> Result<(), ValidationError> {
    if subscription_id.is_empty() {
        return Err(ValidationError::Field {
            field: "subscription_id".to_string(),
            message: "Subscription ID cannot be empty".to_string(),
        });
    }
    Uuid::parse_str(subscription_id).map_err(|e| {
        ValidationError::Format(format!("Subscription ID must be a GUID: {}", e))
    })?;
    Ok(())
}
