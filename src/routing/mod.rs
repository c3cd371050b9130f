//! Routing module
//!
//! Maps the `Host` header of an edge request to the website whose domain set
//! contains it.

mod vhost;

pub use vhost::{resolve_site, Site};
