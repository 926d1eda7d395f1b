use crate::core::domain::error::ValidationError;
use uuid::Uuid;

/// A validated Entra ID tenant, either a GUID or a verified domain name
/// such as `contoso.onmicrosoft.com`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantId(String);

impl TenantId {
    /// Creates a new tenant ID without validation.
    pub(crate) fn new_unchecked(tenant_id: String) -> Self {
        Self(tenant_id)
    }

    /// Returns the tenant ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validates a tenant ID.
pub(crate) fn validate_tenant_id(tenant_id: &str) -> Result<(), ValidationError> {
    if tenant_id.is_empty() {
        return Err(ValidationError::Field {
            field: "tenant_id".to_string(),
            message: "Tenant ID cannot be empty".to_string(),
        });
    }
    if Uuid::parse_str(tenant_id).is_ok() {
        return Ok(());
    }
    let labels: Vec<&str> = tenant_id.split('.').collect();
    if labels.len() < 2 {
        return Err(ValidationError::Format(
            "Tenant ID must be a GUID or a domain name".to_string(),
        ));
    }
    for label in labels {
        if label.is_empty() || label.len() > 63 {
            return Err(ValidationError::Format(
                "Tenant domain labels must be between 1 and 63 characters".to_string(),
            ));
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            || label.starts_with('-')
            || label.ends_with('-')
        {
            return Err(ValidationError::Format(format!(
                "Invalid tenant domain label '{}'",
                label
            )));
        }
    }
    Ok(())
}
