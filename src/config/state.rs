// Edge state module
// Immutable state shared by every request task of the edge server

use std::path::PathBuf;

use super::types::Config;
use crate::routing::Site;

/// Edge server state
///
/// Built once at startup; request tasks only read it, so no locks are needed.
pub struct EdgeState {
    pub config: Config,
    pub sites: Vec<Site>,
    pub bucket_root: PathBuf,
}

impl EdgeState {
    pub fn new(config: Config) -> Self {
        let sites = config.websites.iter().cloned().map(Site::new).collect();
        let bucket_root = PathBuf::from(&config.paths.bucket_root);
        Self {
            config,
            sites,
            bucket_root,
        }
    }
}
