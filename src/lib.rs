//! Multi-site static hosting
//!
//! Provisions several static websites behind one content-delivery layer and
//! emulates that layer locally. The decision logic lives in [`domains`]
//! (which hostnames a site answers to) and [`edge`] (request path
//! canonicalization); the rest is plumbing around them.

pub mod config;
pub mod domains;
pub mod edge;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod provision;
pub mod routing;
pub mod server;
