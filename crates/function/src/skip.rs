//! Whether to bypass the directory query for a populated target.

use fn_msgraph_util::has_data_opt;
use serde_json::Value;

use crate::envelope::RunFunctionRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationMode {
    /// Composed into a pipeline with an observed composite resource.
    Pipeline,
    /// Scheduled or watch-triggered run against one watched resource.
    Operation,
}

impl InvocationMode {
    pub fn of(req: &RunFunctionRequest) -> Self {
        match req.observed_composite() {
            Some(_) => InvocationMode::Pipeline,
            None => InvocationMode::Operation,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InvocationMode::Pipeline => "pipeline",
            InvocationMode::Operation => "operation",
        }
    }
}

/// `existing` is the value currently at the target, `None` if the target
/// does not resolve.
///
/// Operation runs never skip. Otherwise the query is skipped only when
/// `skip_flag` is set and the target holds data: a non-null scalar or a
/// non-empty list or object.
pub fn should_skip(existing: Option<&Value>, skip_flag: bool, mode: InvocationMode) -> bool {
    match mode {
        InvocationMode::Operation => false,
        InvocationMode::Pipeline => skip_flag && has_data_opt(existing),
    }
}
