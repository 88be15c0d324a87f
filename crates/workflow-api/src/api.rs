//! The remote operations the dispatcher consumes.
//!
//! `ActionsApi` is backend-agnostic: [`crate::GithubClient`] talks to the
//! REST API, [`crate::fakes::MemoryActionsApi`] scripts responses for tests.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::model::{Job, RepoSlug, Workflow, WorkflowRun};

/// GitHub Actions operations used by the dispatch-then-locate cycle.
///
/// Implementations classify failures into [`crate::ApiError`] variants;
/// a 404 must surface as `ApiError::NotFound` and a dispatch against a
/// disabled workflow as `ApiError::WorkflowDisabled`.
#[async_trait]
pub trait ActionsApi: Send + Sync {
    /// List the workflows defined in a repository.
    async fn list_workflows(&self, repo: &RepoSlug) -> ApiResult<Vec<Workflow>>;

    /// Trigger a `workflow_dispatch` event. The platform returns no run id.
    async fn dispatch_workflow(
        &self,
        repo: &RepoSlug,
        workflow_id: u64,
        git_ref: &str,
        inputs: &BTreeMap<String, String>,
    ) -> ApiResult<()>;

    /// List runs of a workflow, most recent first, optionally scoped to a branch.
    async fn list_workflow_runs(
        &self,
        repo: &RepoSlug,
        workflow_id: u64,
        branch: Option<&str>,
        per_page: u8,
    ) -> ApiResult<Vec<WorkflowRun>>;

    /// List the jobs of a run's latest attempt.
    async fn list_jobs_for_run(&self, repo: &RepoSlug, run_id: u64) -> ApiResult<Vec<Job>>;

    /// Fetch a single run.
    async fn get_run(&self, repo: &RepoSlug, run_id: u64) -> ApiResult<WorkflowRun>;
}
