//! HTTP handlers for declared resources.

pub mod resource;
pub use resource::*;
