//! In-memory fake for [`ActionsApi`] (testing only)
//!
//! `MemoryActionsApi` answers from scripted responses and records the calls
//! made against it, so the dispatch/resolution logic can be exercised without
//! a network.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::ActionsApi;
use crate::error::{ApiError, ApiResult};
use crate::model::{Job, RepoSlug, Step, Workflow, WorkflowRun};

/// A recorded `dispatch_workflow` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchCall {
    pub workflow_id: u64,
    pub git_ref: String,
    pub inputs: BTreeMap<String, String>,
}

/// A recorded `list_workflow_runs` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunQuery {
    pub workflow_id: u64,
    pub branch: Option<String>,
    pub per_page: u8,
}

/// Build a job whose steps carry the given names.
pub fn job_with_steps(id: u64, steps: &[&str]) -> Job {
    Job {
        id,
        name: format!("job-{id}"),
        steps: steps
            .iter()
            .map(|name| Step {
                name: name.to_string(),
            })
            .collect(),
    }
}

#[derive(Debug, Default)]
struct State {
    workflows: Vec<Workflow>,
    dispatch_result: Option<ApiError>,
    run_responses: VecDeque<ApiResult<Vec<WorkflowRun>>>,
    jobs: HashMap<u64, VecDeque<ApiResult<Vec<Job>>>>,
    dispatches: Vec<DispatchCall>,
    run_queries: Vec<RunQuery>,
    inspected: Vec<u64>,
}

/// Scripted in-memory implementation of [`ActionsApi`].
///
/// Run listings are consumed one response per call; the final scripted
/// response is repeated once the script is exhausted. Job listings follow
/// the same rule per run id. Runs with no scripted jobs answer `NotFound`.
#[derive(Debug, Default)]
pub struct MemoryActionsApi {
    state: Mutex<State>,
}

impl MemoryActionsApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a workflow for `list_workflows`.
    pub fn with_workflow(self, id: u64, name: &str, path: &str) -> Self {
        self.state.lock().unwrap().workflows.push(Workflow {
            id,
            name: name.to_string(),
            path: path.to_string(),
            state: "active".to_string(),
        });
        self
    }

    /// Make every dispatch fail with `err`.
    pub fn with_dispatch_error(self, err: ApiError) -> Self {
        self.state.lock().unwrap().dispatch_result = Some(err);
        self
    }

    /// Append a run-listing response returning runs with the given ids.
    pub fn push_runs(&self, ids: &[u64]) {
        let runs = ids.iter().copied().map(WorkflowRun::with_id).collect();
        self.state.lock().unwrap().run_responses.push_back(Ok(runs));
    }

    /// Append a failing run-listing response.
    pub fn push_runs_error(&self, err: ApiError) {
        self.state.lock().unwrap().run_responses.push_back(Err(err));
    }

    /// Append a job-listing response for `run_id`.
    pub fn push_jobs(&self, run_id: u64, jobs: Vec<Job>) {
        self.state
            .lock()
            .unwrap()
            .jobs
            .entry(run_id)
            .or_default()
            .push_back(Ok(jobs));
    }

    /// Append a failing job-listing response for `run_id`.
    pub fn push_jobs_error(&self, run_id: u64, err: ApiError) {
        self.state
            .lock()
            .unwrap()
            .jobs
            .entry(run_id)
            .or_default()
            .push_back(Err(err));
    }

    /// Dispatch calls received so far.
    pub fn dispatches(&self) -> Vec<DispatchCall> {
        self.state.lock().unwrap().dispatches.clone()
    }

    /// Run-listing queries received so far.
    pub fn run_queries(&self) -> Vec<RunQuery> {
        self.state.lock().unwrap().run_queries.clone()
    }

    /// Run ids whose jobs were requested, in call order.
    pub fn inspected_runs(&self) -> Vec<u64> {
        self.state.lock().unwrap().inspected.clone()
    }
}

fn next_scripted<T: Clone>(script: &mut VecDeque<ApiResult<T>>) -> Option<ApiResult<T>> {
    if script.len() > 1 {
        script.pop_front()
    } else {
        script.front().cloned()
    }
}

#[async_trait]
impl ActionsApi for MemoryActionsApi {
    async fn list_workflows(&self, _repo: &RepoSlug) -> ApiResult<Vec<Workflow>> {
        Ok(self.state.lock().unwrap().workflows.clone())
    }

    async fn dispatch_workflow(
        &self,
        _repo: &RepoSlug,
        workflow_id: u64,
        git_ref: &str,
        inputs: &BTreeMap<String, String>,
    ) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        state.dispatches.push(DispatchCall {
            workflow_id,
            git_ref: git_ref.to_string(),
            inputs: inputs.clone(),
        });
        match &state.dispatch_result {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn list_workflow_runs(
        &self,
        _repo: &RepoSlug,
        workflow_id: u64,
        branch: Option<&str>,
        per_page: u8,
    ) -> ApiResult<Vec<WorkflowRun>> {
        let mut state = self.state.lock().unwrap();
        state.run_queries.push(RunQuery {
            workflow_id,
            branch: branch.map(str::to_string),
            per_page,
        });
        next_scripted(&mut state.run_responses).unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn list_jobs_for_run(&self, _repo: &RepoSlug, run_id: u64) -> ApiResult<Vec<Job>> {
        let mut state = self.state.lock().unwrap();
        state.inspected.push(run_id);
        state
            .jobs
            .get_mut(&run_id)
            .and_then(next_scripted)
            .unwrap_or_else(|| {
                Err(ApiError::NotFound {
                    message: format!("run {run_id} has no jobs yet"),
                })
            })
    }

    async fn get_run(&self, repo: &RepoSlug, run_id: u64) -> ApiResult<WorkflowRun> {
        Ok(WorkflowRun {
            html_url: format!("https://github.com/{repo}/actions/runs/{run_id}"),
            ..WorkflowRun::with_id(run_id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_last_run_response_is_sticky() {
        let api = MemoryActionsApi::new();
        let repo = RepoSlug::new("o", "r");
        api.push_runs(&[]);
        api.push_runs(&[1, 2]);

        let first = api.list_workflow_runs(&repo, 5, None, 10).await.unwrap();
        let second = api.list_workflow_runs(&repo, 5, None, 10).await.unwrap();
        let third = api.list_workflow_runs(&repo, 5, Some("main"), 5).await.unwrap();

        assert!(first.is_empty());
        assert_eq!(second.len(), 2);
        assert_eq!(third.len(), 2);
        assert_eq!(api.run_queries().len(), 3);
        assert_eq!(api.run_queries()[2].branch.as_deref(), Some("main"));
    }

    #[tokio::test]
    async fn test_unscripted_run_jobs_are_not_found() {
        let api = MemoryActionsApi::new();
        let repo = RepoSlug::new("o", "r");
        let err = api.list_jobs_for_run(&repo, 77).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(api.inspected_runs(), vec![77]);
    }

    #[tokio::test]
    async fn test_dispatch_is_recorded() {
        let api = MemoryActionsApi::new().with_dispatch_error(ApiError::WorkflowDisabled {
            workflow_id: 3,
        });
        let repo = RepoSlug::new("o", "r");
        let mut inputs = BTreeMap::new();
        inputs.insert("distinct_id".to_string(), "abc".to_string());

        let err = api
            .dispatch_workflow(&repo, 3, "refs/heads/main", &inputs)
            .await
            .unwrap_err();

        assert_eq!(err, ApiError::WorkflowDisabled { workflow_id: 3 });
        let calls = api.dispatches();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].inputs["distinct_id"], "abc");
    }
}
