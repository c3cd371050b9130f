//! Error types
//!
//! Configuration problems are detected before anything is provisioned and abort
//! the whole run. Provisioning errors come from the provider collaborator.

use thiserror::Error;

/// Problems found while loading or validating the site configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("no websites configured")]
    NoWebsites,

    #[error("duplicate website name '{0}'")]
    DuplicateName(String),

    #[error("primary domain '{domain}' is used by both '{first}' and '{second}'")]
    DuplicatePrimaryDomain {
        domain: String,
        first: String,
        second: String,
    },

    #[error("hostname '{domain}' is served by both '{first}' and '{second}'")]
    DomainClaimedTwice {
        domain: String,
        first: String,
        second: String,
    },

    #[error("website '{site}' deploys assets but '{path}' is not a directory")]
    MissingAssets { site: String, path: String },

    #[error("malformed domain '{domain}': {reason}")]
    MalformedDomain { domain: String, reason: &'static str },

    #[error("region '{found}' is not supported, deployments must use '{required}'")]
    UnsupportedRegion {
        found: String,
        required: &'static str,
    },

    #[error("invalid edge address: {0}")]
    InvalidAddress(String),
}

/// Failures while applying a deployment plan
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize deployment record: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to read deployment record: {0}")]
    Deserialize(#[from] toml::de::Error),

    #[error("failed to render plan: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProvisionError {
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}
