//! Receive-endpoint registry double.

use crate::document::PropertyStore;
use crate::errors::ConfigurationError;
use std::collections::BTreeMap;
use tracing::debug;

/// Configuration registered for one receive endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReceiveEndpoint {
    /// Adapter-specific settings.
    pub adapter_config: PropertyStore,
    /// Runtime settings for the receive location.
    pub runtime_config: PropertyStore,
}

/// Receive endpoints keyed by URL.
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    endpoints: BTreeMap<String, ReceiveEndpoint>,
}

impl TransportConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is empty or already registered.
    pub fn add_receive_endpoint(
        &mut self,
        url: &str,
        adapter_config: PropertyStore,
        runtime_config: PropertyStore,
    ) -> Result<(), ConfigurationError> {
        if url.is_empty() {
            return Err(ConfigurationError::missing("url"));
        }
        if self.endpoints.contains_key(url) {
            return Err(ConfigurationError::duplicate(
                url,
                "receive endpoint is already registered",
            ));
        }

        debug!(url, "Added receive endpoint");
        self.endpoints.insert(
            url.to_string(),
            ReceiveEndpoint {
                adapter_config,
                runtime_config,
            },
        );
        Ok(())
    }

    /// Replaces the configuration of an endpoint, adding it if absent.
    pub fn update_endpoint_config(
        &mut self,
        url: &str,
        adapter_config: PropertyStore,
        runtime_config: PropertyStore,
    ) {
        debug!(url, "Updated receive endpoint");
        self.endpoints.insert(
            url.to_string(),
            ReceiveEndpoint {
                adapter_config,
                runtime_config,
            },
        );
    }

    /// Removes an endpoint. Removing an unknown URL does nothing.
    pub fn remove_receive_endpoint(&mut self, url: &str) -> Option<ReceiveEndpoint> {
        let removed = self.endpoints.remove(url);
        if removed.is_some() {
            debug!(url, "Removed receive endpoint");
        }
        removed
    }

    /// Looks up the endpoint registered under `url`.
    #[must_use]
    pub fn endpoint(&self, url: &str) -> Option<&ReceiveEndpoint> {
        self.endpoints.get(url)
    }

    /// Returns registered URLs in sorted order.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(String::as_str)
    }

    /// Returns the number of registered endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Returns true if no endpoint is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn adapter(path: &str) -> PropertyStore {
        let mut store = PropertyStore::new();
        store.write_unqualified("path", json!(path));
        store
    }

    #[test]
    fn test_add_and_lookup() {
        let mut config = TransportConfig::new();
        config
            .add_receive_endpoint("file://in", adapter("/in"), PropertyStore::new())
            .unwrap();

        let endpoint = config.endpoint("file://in").unwrap();
        assert_eq!(endpoint.adapter_config.read_unqualified("path"), Some(&json!("/in")));
        assert_eq!(config.len(), 1);
    }

    #[test]
    fn test_duplicate_url_is_rejected() {
        let mut config = TransportConfig::new();
        config
            .add_receive_endpoint("file://in", adapter("/a"), PropertyStore::new())
            .unwrap();

        let err = config
            .add_receive_endpoint("file://in", adapter("/b"), PropertyStore::new())
            .unwrap_err();

        assert!(matches!(err, ConfigurationError::DuplicateRegistration { .. }));
        assert_eq!(
            config.endpoint("file://in").unwrap().adapter_config.read_unqualified("path"),
            Some(&json!("/a"))
        );
    }

    #[test]
    fn test_empty_url_is_rejected() {
        let mut config = TransportConfig::new();
        let err = config
            .add_receive_endpoint("", PropertyStore::new(), PropertyStore::new())
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingArgument { .. }));
    }

    #[test]
    fn test_update_upserts_and_remove() {
        let mut config = TransportConfig::new();
        config.update_endpoint_config("file://in", adapter("/a"), PropertyStore::new());
        config.update_endpoint_config("file://in", adapter("/b"), PropertyStore::new());

        assert_eq!(config.len(), 1);
        assert_eq!(
            config.endpoint("file://in").unwrap().adapter_config.read_unqualified("path"),
            Some(&json!("/b"))
        );

        assert!(config.remove_receive_endpoint("file://in").is_some());
        assert!(config.remove_receive_endpoint("file://in").is_none());
        assert!(config.is_empty());
    }
}
