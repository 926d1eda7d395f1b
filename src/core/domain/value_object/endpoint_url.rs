use crate::core::domain::error::ValidationError;
use url::Url;

/// The public-cloud Resource Manager endpoint.
pub const DEFAULT_MANAGEMENT_ENDPOINT: &str = "https://management.azure.com/";

/// The public-cloud Entra ID authority.
pub const DEFAULT_AUTHORITY_ENDPOINT: &str = "https://login.microsoftonline.com/";

const MAX_URL_LENGTH: usize = 2083;

/// A validated base URL of an Azure service endpoint (Resource Manager or
/// the login authority).
///
/// The URL always ends with `/`, so [`EndpointUrl::join`] appends paths below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointUrl(Url);

impl EndpointUrl {
    /// Creates a new endpoint URL without validation.
    ///
    /// Falls back to a `/`-terminated copy of the input when it already parses.
    pub(crate) fn new_unchecked(url: Url) -> Self {
        let mut url = url;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Self(url)
    }

    /// Parses and validates an endpoint URL.
    pub(crate) fn parse(value: &str, allow_http: bool) -> Result<Self, ValidationError> {
        let url = validate_endpoint_url(value, allow_http)?;
        Ok(Self::new_unchecked(url))
    }

    /// Returns the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the underlying URL.
    #[must_use]
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Appends a path (and optional query) below this endpoint.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.0.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Builds a URL below this endpoint from raw path segments.
    ///
    /// Every segment is percent-encoded, so `/`, `?` or `#` inside a name stay
    /// part of that name.
    #[must_use]
    pub fn resource_url(&self, segments: &[&str], query: &[(&str, &str)]) -> String {
        let mut url = self.0.clone();
        // http(s) URLs always have a hierarchical path.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url.into()
    }

    /// Returns the OAuth2 scope requesting access to this endpoint.
    #[must_use]
    pub fn default_scope(&self) -> String {
        format!("{}/.default", self.0.as_str().trim_end_matches('/'))
    }
}

/// Validates an endpoint URL string and returns the parsed URL.
pub(crate) fn validate_endpoint_url(value: &str, allow_http: bool) -> Result<Url, ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Field {
            field: "endpoint".to_string(),
            message: "Endpoint URL cannot be empty".to_string(),
        });
    }
    if value.len() > MAX_URL_LENGTH {
        return Err(ValidationError::Format(format!(
            "Endpoint URL exceeds maximum length of {} characters",
            MAX_URL_LENGTH
        )));
    }

    let url = Url::parse(value)
        .map_err(|e| ValidationError::Format(format!("Invalid URL format: {}", e)))?;

    match url.scheme() {
        "https" => {}
        "http" if allow_http => {}
        scheme => {
            return Err(ValidationError::ConstraintViolation(format!(
                "Unsupported scheme '{}'. Endpoints must use https",
                scheme
            )));
        }
    }
    if url.host_str().is_none() {
        return Err(ValidationError::Format(
            "Endpoint URL must contain a host".to_string(),
        ));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ValidationError::ConstraintViolation(
            "Endpoint URL cannot contain a query or fragment".to_string(),
        ));
    }

    Ok(url)
}
