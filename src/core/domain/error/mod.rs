use std::time::Duration;
use thiserror::Error;

/// The main error type for virtual network DNS operations.
///
/// This enum represents all possible errors that can occur while managing
/// the DNS servers of a virtual network, from configuration validation up to
/// the completion of long-running remote operations.
#[derive(Error, Debug)]
pub enum NetworkError {
    /// Represents errors that occur while talking to the remote service
    ///
    /// # Fields
    /// * `0` - A description of what went wrong on the wire
    #[error("Connection error: {0}")]
    Connection(String),

    /// Represents failures to obtain or refresh an access token
    ///
    /// # Fields
    /// * `0` - A description of the authentication failure
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Represents validation failures with detailed context
    ///
    /// # Fields
    /// * `source` - The underlying validation error
    #[error("Validation error: {source}")]
    Validation { source: ValidationError },

    /// A configured or persisted resource ID could not be parsed
    ///
    /// # Fields
    /// * `input` - The offending ID string
    /// * `reason` - Why the ID was rejected
    #[error("Invalid resource ID {input:?}: {reason}")]
    InvalidIdentity { input: String, reason: String },

    /// The remote service answered `404 Not Found`
    ///
    /// # Fields
    /// * `resource` - The path that was requested
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// The remote service answered with a non-success status
    ///
    /// # Fields
    /// * `status` - HTTP status code
    /// * `code` - Error code reported by the service (if any)
    /// * `message` - Error message reported by the service
    #[error("API error ({status}): {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// A long-running operation finished in a non-successful terminal state
    ///
    /// # Fields
    /// * `status` - Terminal status (`Failed` or `Canceled`)
    /// * `message` - Details reported by the service
    #[error("Long-running operation ended with status {status}: {message}")]
    OperationFailed { status: String, message: String },

    /// The parent virtual network does not exist, so its DNS servers cannot be managed
    #[error("{id} could not be found")]
    ParentMissing { id: String },

    /// Reading the parent virtual network failed
    #[error("reading {id}: {source}")]
    RemoteRead {
        id: String,
        source: Box<NetworkError>,
    },

    /// Submitting or awaiting an update of the parent virtual network failed
    #[error("{action} {id}: {source}")]
    RemoteWrite {
        id: String,
        action: &'static str,
        source: Box<NetworkError>,
    },

    /// The remote service returned an object without its expected shape
    #[error("{id} was returned {message}")]
    MalformedRemoteObject { id: String, message: String },

    /// The operation did not complete within its deadline
    #[error("timed out after {timeout:?} while {operation} {id}")]
    OperationTimeout {
        id: String,
        operation: &'static str,
        timeout: Duration,
    },
}

impl NetworkError {
    /// Returns `true` when the error represents a `404 Not Found` response.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, NetworkError::NotFound { .. })
    }

    pub(crate) fn remote_read(id: impl ToString, source: NetworkError) -> Self {
        NetworkError::RemoteRead {
            id: id.to_string(),
            source: Box::new(source),
        }
    }

    pub(crate) fn remote_write(
        id: impl ToString,
        action: &'static str,
        source: NetworkError,
    ) -> Self {
        NetworkError::RemoteWrite {
            id: id.to_string(),
            action,
            source: Box::new(source),
        }
    }
}

impl From<ValidationError> for NetworkError {
    fn from(error: ValidationError) -> Self {
        NetworkError::Validation { source: error }
    }
}

/// Specialized error type for validation failures.
///
/// This enum provides detailed context about why a validation
/// failed, including field-specific errors and format violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Represents a validation failure for a specific field
    ///
    /// # Fields
    /// * `field` - The name of the field that failed validation
    /// * `message` - A detailed message about why validation failed
    #[error("Field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// Represents format/syntax validation failures
    ///
    /// # Fields
    /// * `0` - Description of the format violation
    #[error("Format error: {0}")]
    Format(String),

    /// Represents violations of domain constraints
    ///
    /// # Fields
    /// * `0` - Description of the constraint violation
    #[error("Domain constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Type alias for Results that may fail with a NetworkError
pub type NetworkResult<T> = Result<T, NetworkError>;
