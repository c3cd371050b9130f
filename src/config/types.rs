// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Provisioning region
    pub region: String,
    /// Shared bucket holding every website, partitioned by primary domain
    pub bucket: String,
    pub paths: PathsConfig,
    pub edge: EdgeConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub websites: Vec<WebsiteSpec>,
}

/// One static website
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct WebsiteSpec {
    /// Unique identifier, used to name provisioned sub-resources
    pub name: String,
    /// Canonical domain, also the object prefix in the bucket
    pub primary_domain: String,
    /// Whether `<assets_root>/<primary_domain>` is uploaded on deploy
    #[serde(default)]
    pub deploy_assets: bool,
    #[serde(default)]
    pub alternate_domains: Vec<String>,
}

/// Local directories used by deploy and serve
#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    /// Source tree: one directory per primary domain
    pub assets_root: String,
    /// Local stand-in for the shared bucket
    pub bucket_root: String,
}

/// Edge server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct EdgeConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    pub read_timeout: u64,
    /// Object served in place of a 403/404 origin response
    pub fallback_path: String,
    /// Origin statuses replaced by the fallback object with a 200
    pub error_statuses: Vec<u16>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

impl EdgeConfig {
    pub fn maps_to_fallback(&self, status: u16) -> bool {
        self.error_statuses.contains(&status)
    }
}

impl WebsiteSpec {
    /// Hostnames are case-insensitive; keep one spelling for prefixes and certificates
    pub fn lowercase_domains(&mut self) {
        self.primary_domain.make_ascii_lowercase();
        for alternate in &mut self.alternate_domains {
            alternate.make_ascii_lowercase();
        }
    }
}
