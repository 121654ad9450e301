//! fn-msgraph-util - helpers shared by the function-msgraph crates
//!
//! Structural equality for drift detection and "has data" checks for the
//! skip policy.

pub mod is_empty;
pub mod json_equal;

pub use is_empty::{has_data, has_data_opt};
pub use json_equal::{deep_equal, first_difference};
