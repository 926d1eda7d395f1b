use crate::core::domain::value_object::AccessToken;

/// Authentication state held by the HTTP client.
#[derive(Debug, Clone)]
pub struct AzureAuth {
    token: AccessToken,
}

impl AzureAuth {
    pub fn new(token: AccessToken) -> Self {
        Self { token }
    }

    pub fn token(&self) -> &AccessToken {
        &self.token
    }
}
