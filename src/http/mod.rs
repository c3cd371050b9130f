//! HTTP protocol layer module
//!
//! Protocol helpers shared by the edge handler: caching, MIME types and
//! response builders.

pub mod cache;
pub mod mime;
pub mod response;

pub use response::{
    build_304_response, build_404_response, build_405_response, build_500_response,
    build_object_response, build_options_response,
};
