//! return-dispatch core library
//!
//! Dispatches a GitHub Actions workflow and identifies the run the dispatch
//! created. The dispatch API does not return a run id, so a random
//! correlation marker is passed as the `distinct_id` input; the workflow
//! echoes it into a step name and the resolver polls recent runs until one
//! carries it.
//!
//! ## Key Components
//!
//! - `CorrelationMarker`: per-dispatch token and its escaped search pattern
//! - `retry_until_non_empty`: bounded retry envelope
//! - `list_run_ids` / `list_step_names`: run enumeration and step inspection
//! - `resolve_run_id`: the polling state machine
//! - `Dispatcher`: lookup, dispatch and resolution in one call

pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod marker;
pub mod resolver;
pub mod retry;
pub mod runs;
pub mod steps;
pub mod telemetry;
pub mod workflow;

pub use config::{parse_workflow_inputs, DispatchConfig, WorkflowSelector, DEFAULT_TIMEOUT_SECS};
pub use context::{branch_from_ref, DispatchContext};
pub use dispatcher::{DispatchReport, Dispatcher};
pub use error::{DispatchError, DispatchResult, TOKEN_SCOPE_HINT};
pub use marker::{CorrelationMarker, DISTINCT_ID_INPUT};
pub use resolver::{resolve_run_id, ResolutionState, ResolvedRun};
pub use retry::retry_until_non_empty;
pub use runs::{list_run_ids, CandidateRun};
pub use steps::{list_step_names, JobStepSet};
pub use telemetry::init_tracing;
pub use workflow::{dispatch, find_workflow_id, DispatchOutcome};

pub use workflow_api::{ActionsApi, ApiError, GithubClient, GithubConfig, RepoSlug};

/// return-dispatch version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
