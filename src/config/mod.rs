// Configuration module entry point
// Loads the site configuration and validates it before anything is provisioned

mod state;
mod types;
mod validate;

use std::net::SocketAddr;

pub use state::EdgeState;
pub use types::{Config, EdgeConfig, LoggingConfig, PathsConfig, WebsiteSpec};
pub use validate::{validate, validate_region, REQUIRED_REGION};

use crate::error::ConfigError;

/// Default config file, looked up without extension
pub const DEFAULT_CONFIG_PATH: &str = "sitefleet";

impl Config {
    /// Load configuration from specified file path (without extension)
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let settings = Self::builder()?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SITEFLEET")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Self::finish(settings)
    }

    /// Load configuration from an in-memory TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let settings = Self::builder()?
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;

        Self::finish(settings)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(config::Config::builder()
            .set_default("region", REQUIRED_REGION)?
            .set_default("bucket", "sitefleet-websites")?
            .set_default("paths.assets_root", "sites")?
            .set_default("paths.bucket_root", "bucket")?
            .set_default("edge.host", "127.0.0.1")?
            .set_default("edge.port", 8080)?
            .set_default("edge.read_timeout", 30)?
            .set_default("edge.fallback_path", "/index.html")?
            .set_default("edge.error_statuses", vec![403_i64, 404])?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?)
    }

    fn finish(settings: config::Config) -> Result<Self, ConfigError> {
        let mut cfg: Self = settings.try_deserialize()?;
        for site in &mut cfg.websites {
            site.lowercase_domains();
        }
        validate(&cfg)?;
        Ok(cfg)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.edge.host, self.edge.port)
            .parse()
            .map_err(|e| ConfigError::InvalidAddress(format!("{e}")))
    }

    /// Look up a website by name
    pub fn website(&self, name: &str) -> Option<&WebsiteSpec> {
        self.websites.iter().find(|w| w.name == name)
    }
}
