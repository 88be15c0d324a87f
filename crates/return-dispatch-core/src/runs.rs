//! Run Enumerator: candidate runs for the dispatched workflow.

use chrono::{DateTime, Utc};
use tracing::debug;
use workflow_api::ActionsApi;

use crate::context::DispatchContext;
use crate::error::DispatchResult;

/// Page size when the query is scoped to the dispatch branch.
pub const BRANCH_PAGE_SIZE: u8 = 5;

/// Page size for unscoped queries (tag refs and other ref shapes).
pub const UNSCOPED_PAGE_SIZE: u8 = 10;

/// A run id seen in one enumeration cycle. Never carried across cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRun {
    pub run_id: u64,
    pub fetched_at: DateTime<Utc>,
}

/// List the most recent runs of the context's workflow, in the platform's
/// order (newest first).
///
/// Every call re-queries the API; new runs may appear between cycles.
pub async fn list_run_ids(
    api: &dyn ActionsApi,
    ctx: &DispatchContext,
) -> DispatchResult<Vec<CandidateRun>> {
    let branch = ctx.branch.as_deref();
    let per_page = if branch.is_some() {
        BRANCH_PAGE_SIZE
    } else {
        UNSCOPED_PAGE_SIZE
    };

    let runs = api
        .list_workflow_runs(&ctx.repo, ctx.workflow_id, branch, per_page)
        .await?;

    let fetched_at = Utc::now();
    let candidates: Vec<CandidateRun> = runs
        .into_iter()
        .map(|run| CandidateRun {
            run_id: run.id,
            fetched_at,
        })
        .collect();

    debug!(
        workflow_id = ctx.workflow_id,
        branch = branch.unwrap_or("<any>"),
        runs = ?candidates.iter().map(|c| c.run_id).collect::<Vec<_>>(),
        "fetched workflow runs"
    );

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::CorrelationMarker;
    use std::time::Duration;
    use workflow_api::fakes::MemoryActionsApi;
    use workflow_api::{ApiError, RepoSlug};

    fn ctx(git_ref: &str) -> DispatchContext {
        DispatchContext::new(
            RepoSlug::new("o", "r"),
            42,
            git_ref,
            Duration::from_secs(60),
            CorrelationMarker::generate(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_branch_ref_scopes_query() {
        let api = MemoryActionsApi::new();
        api.push_runs(&[3, 2, 1]);

        let runs = list_run_ids(&api, &ctx("refs/heads/main")).await.unwrap();

        assert_eq!(runs.iter().map(|r| r.run_id).collect::<Vec<_>>(), vec![3, 2, 1]);
        let query = &api.run_queries()[0];
        assert_eq!(query.workflow_id, 42);
        assert_eq!(query.branch.as_deref(), Some("main"));
        assert_eq!(query.per_page, BRANCH_PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_tag_ref_falls_back_to_unscoped_query() {
        let api = MemoryActionsApi::new();
        api.push_runs(&[9]);

        list_run_ids(&api, &ctx("refs/tags/v1.0")).await.unwrap();

        let query = &api.run_queries()[0];
        assert_eq!(query.branch, None);
        assert_eq!(query.per_page, UNSCOPED_PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_error_status_propagates() {
        let api = MemoryActionsApi::new();
        api.push_runs_error(ApiError::UnexpectedStatus {
            status: 502,
            message: "Bad Gateway".to_string(),
        });

        let err = list_run_ids(&api, &ctx("refs/heads/main")).await.unwrap_err();
        assert!(err.to_string().contains("502"));
    }
}
