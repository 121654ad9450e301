//! Core logic behind the `function-msgraph` binary.
//!
//! The binary reads one request document from stdin and writes the
//! response document to stdout; logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, FunctionConfig};
use crate::directory::{QueryError, StaticDirectory};
use crate::envelope::RunFunctionRequest;
use crate::function::Function;

pub const USAGE: &str = "usage: function-msgraph --directory <fixture.json> [--config <config.toml>]";

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Directory(#[from] QueryError),
    #[error("invalid request: {0}")]
    Request(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub directory: PathBuf,
}

/// Parse the arguments following the program name.
pub fn parse_args<I>(args: I) -> Result<CliArgs, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut config = None;
    let mut directory = None;
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let slot = match arg.as_str() {
            "--config" => &mut config,
            "--directory" => &mut directory,
            other => return Err(CliError::Usage(format!("unexpected argument {other:?}\n{USAGE}"))),
        };
        let value = args
            .next()
            .ok_or_else(|| CliError::Usage(format!("{arg} needs a value\n{USAGE}")))?;
        *slot = Some(PathBuf::from(value));
    }
    let directory = directory.ok_or_else(|| CliError::Usage(USAGE.to_string()))?;
    Ok(CliArgs { config, directory })
}

pub fn load_config(args: &CliArgs) -> Result<FunctionConfig, CliError> {
    match &args.config {
        Some(path) => Ok(FunctionConfig::load(path)?),
        None => Ok(FunctionConfig::default()),
    }
}

/// Build a function answering from the `--directory` fixture.
pub fn build_function(args: &CliArgs, config: FunctionConfig) -> Result<Function, CliError> {
    let fixture = std::fs::read_to_string(&args.directory).map_err(|source| CliError::Read {
        path: args.directory.display().to_string(),
        source,
    })?;
    let directory = StaticDirectory::from_json_str(&fixture)?;
    Ok(Function::new(Arc::new(directory)).with_config(config))
}

/// Run one request document through `function` and render the response.
pub async fn run(function: &Function, request_json: &str) -> Result<String, CliError> {
    let req: RunFunctionRequest = serde_json::from_str(request_json)?;
    let rsp = function.run_function(&req).await;
    Ok(serde_json::to_string_pretty(&rsp)?)
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // Already installed when embedded in a test harness.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
