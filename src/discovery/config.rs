//! Configuration for model discovery

use serde::{Deserialize, Serialize};

/// Default namespace URI base for discovered models
pub const DEFAULT_NS_URI_BASE: &str = "http://jsonDiscoverer/discovered/";

/// Default namespace prefix base for discovered models
pub const DEFAULT_NS_PREFIX_BASE: &str = "disco";

/// Configuration for model discovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryConfig {
    /// Base of the model namespace URI; the source name is appended
    pub ns_uri_base: String,

    /// Base of the model namespace prefix; the first character of the
    /// source name is appended
    pub ns_prefix_base: String,

    /// Maximum nesting depth for objects and arrays (None = unlimited)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            ns_uri_base: DEFAULT_NS_URI_BASE.to_string(),
            ns_prefix_base: DEFAULT_NS_PREFIX_BASE.to_string(),
            max_depth: None,
        }
    }
}

impl DiscoveryConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for custom configuration
    pub fn builder() -> DiscoveryConfigBuilder {
        DiscoveryConfigBuilder::default()
    }

    /// Namespace URI for a model discovered from `source_name`
    pub fn ns_uri_for(&self, source_name: &str) -> String {
        format!("{}{}", self.ns_uri_base, source_name)
    }

    /// Namespace prefix for a model discovered from `source_name`
    pub fn ns_prefix_for(&self, source_name: &str) -> String {
        let mut prefix = self.ns_prefix_base.clone();
        if let Some(first) = source_name.chars().next() {
            prefix.push(first);
        }
        prefix
    }
}

/// Builder for DiscoveryConfig
#[derive(Debug, Default)]
pub struct DiscoveryConfigBuilder {
    config: DiscoveryConfig,
}

impl DiscoveryConfigBuilder {
    /// Set the namespace URI base
    pub fn ns_uri_base(mut self, base: impl Into<String>) -> Self {
        self.config.ns_uri_base = base.into();
        self
    }

    /// Set the namespace prefix base
    pub fn ns_prefix_base(mut self, base: impl Into<String>) -> Self {
        self.config.ns_prefix_base = base.into();
        self
    }

    /// Limit the nesting depth followed during type resolution
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = Some(depth);
        self
    }

    /// Build the configuration
    pub fn build(self) -> DiscoveryConfig {
        self.config
    }
}
