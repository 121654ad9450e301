//! A composition function that looks up users, groups and service
//! principals in a directory and writes the results onto the composite
//! resource or the pipeline context.
//!
//! A request names its parameters either literally or as paths into the
//! observed document (`groupsRef: status.groupNames`), and a target path
//! for the result (`status.groupObjectIDs`, `context.validatedUsers`).
//! The directory itself sits behind [`DirectoryQuery`].
//!
//! Two invocation shapes are handled:
//!
//! - **pipeline**: the observed composite is the document; results are
//!   written into the desired composite or the context, optionally
//!   skipping the query when the target is already populated;
//! - **operation**: a single watched composite resource is re-queried and
//!   annotated with the execution time and whether the result drifted
//!   from what the resource recorded.

pub mod cli;
pub mod clock;
pub mod config;
pub mod directory;
pub mod drift;
pub mod envelope;
pub mod error;
pub mod function;
pub mod input;
pub mod operation;
pub mod query;
pub mod skip;

pub use clock::{Clock, SystemClock};
pub use config::{ConfigError, FunctionConfig};
pub use directory::{CredentialSet, DirectoryQuery, QueryError, StaticDirectory};
pub use drift::{has_drifted, DriftRecord};
pub use envelope::{RunFunctionRequest, RunFunctionResponse};
pub use error::{FunctionError, OperationError};
pub use function::{Execution, Function};
pub use input::{IdentityType, Input};
pub use query::{QueryHandler, QueryKind, QueryParameters, QueryRequest};
pub use skip::{should_skip, InvocationMode};
