//! Drift between a previously recorded target value and a fresh one.

use fn_msgraph_util::{deep_equal, first_difference};
use serde_json::Value;
use tracing::debug;

/// `observed` is the target value before this run, `None` when the target
/// did not resolve. A missing value always counts as drift.
pub fn has_drifted(observed: Option<&Value>, computed: &Value) -> bool {
    match observed {
        None => true,
        Some(observed) => !deep_equal(observed, computed),
    }
}

/// Outcome of one drift check, kept for logging and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct DriftRecord {
    pub drifted: bool,
    pub observed: Option<Value>,
    pub computed: Value,
}

impl DriftRecord {
    pub fn detect(target: &str, observed: Option<&Value>, computed: &Value) -> Self {
        let drifted = has_drifted(observed, computed);
        if drifted {
            match observed.and_then(|o| first_difference(o, computed)) {
                Some(at) => debug!(target_path = target, at = %at, "query result drifted"),
                None => debug!(target_path = target, "target was not recorded before"),
            }
        }
        Self {
            drifted,
            observed: observed.cloned(),
            computed: computed.clone(),
        }
    }

    /// The annotation value, `"true"` or `"false"`.
    pub fn as_annotation(&self) -> &'static str {
        if self.drifted {
            "true"
        } else {
            "false"
        }
    }
}
