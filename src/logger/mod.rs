//! Logger module
//!
//! Thin facade over `tracing` used across the crate:
//! - Subscriber setup from the `[logging]` section
//! - Edge lifecycle and rewrite diagnostics
//! - Access logging with multiple formats

mod format;

pub use format::AccessLogEntry;

use crate::config::{Config, LoggingConfig};
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber
///
/// `RUST_LOG` takes precedence over `logging.level`. Calling this more than
/// once is harmless; later calls are ignored.
pub fn init(logging: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,sitefleet={}", logging.level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn log_edge_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("======================================");
    tracing::info!("Edge server listening on: http://{addr}");
    tracing::info!("Bucket root: {}", config.paths.bucket_root);
    tracing::info!("Fallback: {} for {:?}", config.edge.fallback_path, config.edge.error_statuses);
    if let Some(workers) = config.edge.workers {
        tracing::info!("Worker threads: {workers}");
    }
    for site in &config.websites {
        tracing::info!("Site '{}' -> {}", site.name, site.primary_domain);
    }
    tracing::info!("======================================");
}

/// Diagnostic record for a path rewrite; purely observational
pub fn log_rewrite(before: &str, after: &str) {
    tracing::debug!(before, after, "path rewritten");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::trace!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

pub fn log_info(message: &str) {
    tracing::info!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: "sitefleet::access", "{}", entry.format(format));
}
