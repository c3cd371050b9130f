//! Edge request processing
//!
//! Everything that happens to a request at the content-delivery layer before it
//! reaches origin storage.

mod normalize;

pub use normalize::{normalize, EdgeRequest};
