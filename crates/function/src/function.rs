//! The runner: one request in, one response out.

use std::sync::Arc;

use fn_msgraph_path::{get, Document, Path, Root};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::FunctionConfig;
use crate::directory::{CredentialSet, DirectoryQuery};
use crate::drift::DriftRecord;
use crate::envelope::{RunFunctionRequest, RunFunctionResponse};
use crate::error::FunctionError;
use crate::input::Input;
use crate::operation::{self, OPERATION_OUTPUT_NAME};
use crate::query::{QueryKind, QueryRequest};
use crate::skip::{should_skip, InvocationMode};

pub const SKIP_MESSAGE: &str = "Target already has data, skipped query to avoid throttling";

/// What running the query step produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Execution {
    /// The target already held data; nothing was queried.
    Skipped,
    Completed { kind: QueryKind, records: Value },
}

pub struct Function {
    directory: Arc<dyn DirectoryQuery>,
    clock: Arc<dyn Clock>,
    config: FunctionConfig,
}

impl Function {
    pub fn new(directory: Arc<dyn DirectoryQuery>) -> Self {
        Self {
            directory,
            clock: Arc::new(SystemClock),
            config: FunctionConfig::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: FunctionConfig) -> Self {
        self.config = config;
        self
    }

    /// Run one invocation. Failures are reported as a fatal result on the
    /// response rather than returned.
    pub async fn run_function(&self, req: &RunFunctionRequest) -> RunFunctionResponse {
        let mode = InvocationMode::of(req);
        info!(tag = %req.meta.tag, mode = mode.as_str(), "running function");

        let mut rsp = RunFunctionResponse::to(req, self.config.response_ttl());
        let outcome = match mode {
            InvocationMode::Pipeline => self.run_pipeline(req, &mut rsp).await,
            InvocationMode::Operation => self.run_operation(req, &mut rsp).await,
        };
        if let Err(err) = outcome {
            warn!(tag = %req.meta.tag, error = %err, "function failed");
            rsp.fatal(&err);
        }
        rsp
    }

    async fn run_pipeline(
        &self,
        req: &RunFunctionRequest,
        rsp: &mut RunFunctionResponse,
    ) -> Result<(), FunctionError> {
        let observed = req.observed_composite().cloned().unwrap_or_default();
        if rsp.desired_composite().is_none() {
            rsp.set_desired_composite(observed.clone());
        }

        let input = parse_input(req)?;
        let credentials = req.credentials_for(&self.config.credentials_name)?;
        let target = input.target()?;
        let doc = Document::new(observed, req.context.clone().unwrap_or_default());

        match self
            .execute(&input, &target, &doc, &credentials, InvocationMode::Pipeline)
            .await?
        {
            Execution::Skipped => rsp.skipped(SKIP_MESSAGE),
            Execution::Completed { kind, records } => {
                write(rsp, &target, records)?;
                rsp.normal(format!("QueryType: \"{kind}\""));
            }
        }
        rsp.success();
        Ok(())
    }

    async fn run_operation(
        &self,
        req: &RunFunctionRequest,
        rsp: &mut RunFunctionResponse,
    ) -> Result<(), FunctionError> {
        let input = parse_input(req)?;
        let watched = operation::watched_resource(req)?;
        let credentials = req.credentials_for(&self.config.credentials_name)?;
        let target = input.target()?;
        let doc = Document::new(watched, req.context.clone().unwrap_or_default());
        let previous = get(&doc, &target).cloned();

        let Execution::Completed { kind, records } = self
            .execute(&input, &target, &doc, &credentials, InvocationMode::Operation)
            .await?
        else {
            rsp.skipped(SKIP_MESSAGE);
            rsp.success();
            return Ok(());
        };

        // The xr output only carries annotations, but a status write must
        // still be possible against the watched document.
        if target.root() == Some(Root::Status) {
            doc.with_value(&target, records.clone())
                .map_err(FunctionError::Write)?;
        }

        let drift = DriftRecord::detect(target.raw(), previous.as_ref(), &records);
        info!(target_path = target.raw(), drifted = drift.drifted, "operation drift check");
        if target.root() == Some(Root::Context) {
            write(rsp, &target, records)?;
        }

        let annotations = [
            (
                self.config.last_execution_annotation(),
                self.clock.now_rfc3339(),
            ),
            (
                self.config.drift_annotation(),
                drift.as_annotation().to_string(),
            ),
        ];
        rsp.set_desired_resource(
            OPERATION_OUTPUT_NAME,
            operation::annotate(&doc.resource, &annotations),
        );
        rsp.normal(format!("QueryType: \"{kind}\""));
        rsp.success();
        Ok(())
    }

    /// Resolve parameters, decide whether to skip, and run the query.
    /// Nothing is written here.
    pub async fn execute(
        &self,
        input: &Input,
        target: &Path,
        doc: &Document,
        credentials: &CredentialSet,
        mode: InvocationMode,
    ) -> Result<Execution, FunctionError> {
        let params = input.resolve_parameters(doc)?;
        let kind: QueryKind = input.query_type.parse()?;
        let identity = input.identity_type()?;

        let existing = get(doc, target);
        if should_skip(existing, input.skip_query_when_target_has_data, mode) {
            info!(target_path = target.raw(), "target already has data, skipping query");
            return Ok(Execution::Skipped);
        }

        let handler = kind.handler();
        handler.validate(&params)?;
        let request = handler.build_request(params, identity);
        debug!(
            kind = %kind,
            identity = %identity,
            names = request.names().len(),
            "querying directory"
        );
        let records = self.query(credentials, &request).await?;
        Ok(Execution::Completed {
            kind,
            records: handler.shape_result(records),
        })
    }

    async fn query(
        &self,
        credentials: &CredentialSet,
        request: &QueryRequest,
    ) -> Result<Value, FunctionError> {
        let call = self.directory.query(credentials, request);
        match self.config.query_timeout() {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| FunctionError::QueryTimeout {
                    secs: limit.as_secs(),
                })?
                .map_err(FunctionError::from),
            None => Ok(call.await?),
        }
    }
}

fn parse_input(req: &RunFunctionRequest) -> Result<Input, FunctionError> {
    Input::from_value(req.input.as_ref().unwrap_or(&Value::Null))
}

/// Write `records` at `target`: `status` lands on the desired composite,
/// `context` on the response context.
fn write(rsp: &mut RunFunctionResponse, target: &Path, records: Value) -> Result<(), FunctionError> {
    let doc = Document::new(
        rsp.desired_composite().cloned().unwrap_or_default(),
        rsp.context_or_empty(),
    );
    let doc = doc.with_value(target, records).map_err(FunctionError::Write)?;
    debug!(target_path = target.raw(), "wrote query result");
    match target.root() {
        Some(Root::Context) => rsp.set_context(doc.context),
        _ => rsp.set_desired_composite(doc.resource),
    }
    Ok(())
}
