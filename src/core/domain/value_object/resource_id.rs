//! Generic parsing of Azure Resource Manager IDs.
//!
//! An ARM ID is a `/`-separated list of `key/value` pairs, e.g.
//! `/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.Network/virtualNetworks/{name}`.
//! Typed IDs pop the keys they expect and then call [`ResourceIdSegments::finish`]
//! to reject anything left over.

use crate::core::domain::error::{NetworkError, NetworkResult};

/// The resource provider namespace every network ID lives under.
pub(crate) const NETWORK_PROVIDER: &str = "Microsoft.Network";

/// The `key/value` segments of an ARM ID, in order of appearance.
#[derive(Debug)]
pub(crate) struct ResourceIdSegments {
    input: String,
    subscription_id: String,
    resource_group: String,
    provider: Option<String>,
    path: Vec<(String, String)>,
}

impl ResourceIdSegments {
    /// Splits an ARM ID into its segments.
    ///
    /// # Errors
    /// Returns `NetworkError::InvalidIdentity` if the ID is empty, has an odd
    /// number of segments, contains an empty segment, contains a URL delimiter
    /// (`?`, `#`, `%`, `\`) or control character, or lacks the
    /// `subscriptions` / `resourceGroups` keys.
    pub(crate) fn parse(input: &str) -> NetworkResult<Self> {
        let trimmed = input.trim_matches('/');
        if trimmed.is_empty() {
            return Err(invalid(input, "ID cannot be empty"));
        }

        let components: Vec<&str> = trimmed.split('/').collect();
        if components.len() % 2 != 0 {
            return Err(invalid(
                input,
                "the number of path segments is not divisible by 2",
            ));
        }

        let mut subscription_id = None;
        let mut resource_group = None;
        let mut provider = None;
        let mut path = Vec::with_capacity(components.len() / 2);

        for pair in components.chunks(2) {
            let (key, value) = (pair[0], pair[1]);
            if key.is_empty() || value.is_empty() {
                return Err(invalid(input, "ID contains an empty segment"));
            }
            if let Some(c) = key.chars().chain(value.chars()).find(|c| is_forbidden(*c)) {
                return Err(invalid(
                    input,
                    format!("ID contains the forbidden character {c:?}"),
                ));
            }
            match key {
                "subscriptions" if subscription_id.is_none() => {
                    subscription_id = Some(value.to_string())
                }
                "resourceGroups" if resource_group.is_none() => {
                    resource_group = Some(value.to_string())
                }
                "providers" if provider.is_none() => provider = Some(value.to_string()),
                _ => path.push((key.to_string(), value.to_string())),
            }
        }

        let subscription_id =
            subscription_id.ok_or_else(|| invalid(input, "no subscription ID found"))?;
        let resource_group =
            resource_group.ok_or_else(|| invalid(input, "no resource group name found"))?;

        Ok(Self {
            input: input.to_string(),
            subscription_id,
            resource_group,
            provider,
            path,
        })
    }

    pub(crate) fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    pub(crate) fn resource_group(&self) -> &str {
        &self.resource_group
    }

    /// Ensures the ID lives under the expected resource provider namespace.
    pub(crate) fn expect_provider(&self, namespace: &str) -> NetworkResult<()> {
        match self.provider.as_deref() {
            Some(p) if p == namespace => Ok(()),
            Some(p) => Err(self.invalid(format!(
                "expected provider {namespace:?} but got {p:?}"
            ))),
            None => Err(self.invalid(format!("no provider segment found, expected {namespace:?}"))),
        }
    }

    /// Removes the segment with the given key and returns its value.
    ///
    /// Segments must be popped in the order they appear in the ID.
    pub(crate) fn pop(&mut self, key: &str) -> NetworkResult<String> {
        if self.path.first().map(|(k, _)| k.as_str()) != Some(key) {
            return Err(self.invalid(format!("ID was missing the `{key}` element")));
        }
        let (_, value) = self.path.remove(0);
        Ok(value)
    }

    /// Fails if any segment has not been consumed by [`ResourceIdSegments::pop`].
    pub(crate) fn finish(self) -> NetworkResult<()> {
        if let Some((key, _)) = self.path.first() {
            return Err(self.invalid(format!("ID contains unexpected segment `{key}`")));
        }
        Ok(())
    }

    fn invalid(&self, reason: impl Into<String>) -> NetworkError {
        invalid(&self.input, reason)
    }
}

// Resource names never contain these; they would change the request URL.
fn is_forbidden(c: char) -> bool {
    matches!(c, '?' | '#' | '%' | '\\') || c.is_control()
}

fn invalid(input: &str, reason: impl Into<String>) -> NetworkError {
    NetworkError::InvalidIdentity {
        input: input.to_string(),
        reason: reason.into(),
    }
}
