//! Server configuration.

use gardonyi_protocol::{DEFAULT_API_PREFIX, DEFAULT_PAGE_SIZE};

/// Configuration for the resource server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path prefix of every resource.
    pub api_prefix: String,
    /// Page size used when a list request names none.
    pub default_page_size: u32,
    /// Upper bound for requested page sizes.
    pub max_page_size: u32,
    /// Application name reported in alerts.
    pub application_name: String,
}

impl ServerConfig {
    /// Creates a configuration with the default prefix and page sizes.
    pub fn new() -> Self {
        Self {
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: 100,
            application_name: "gardonyiCmsApp".to_string(),
        }
    }

    /// Sets the path prefix.
    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    /// Sets the default page size.
    pub fn with_default_page_size(mut self, size: u32) -> Self {
        self.default_page_size = size;
        self
    }

    /// Sets the maximum page size.
    pub fn with_max_page_size(mut self, size: u32) -> Self {
        self.max_page_size = size;
        self
    }

    /// Sets the application name.
    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = name.into();
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}
