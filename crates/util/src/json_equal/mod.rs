//! Structural equality for JSON documents.
//!
//! Used to tell whether a freshly computed query result differs from the
//! one recorded on a resource.

mod deep_equal;

pub use deep_equal::{deep_equal, first_difference};
