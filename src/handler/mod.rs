//! Request handler module
//!
//! Edge request dispatch and bucket object serving.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
