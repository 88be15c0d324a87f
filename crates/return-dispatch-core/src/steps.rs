//! Step Inspector: step names of a run's latest attempt.

use std::collections::HashSet;

use regex::Regex;
use workflow_api::{ActionsApi, ApiResult, Job};

use crate::context::DispatchContext;

/// De-duplicated step names across all jobs of one run attempt, in first-seen
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobStepSet {
    names: Vec<String>,
}

impl JobStepSet {
    pub fn from_jobs(jobs: &[Job]) -> Self {
        let mut seen = HashSet::new();
        let names = jobs
            .iter()
            .flat_map(|job| job.steps.iter())
            .filter(|step| seen.insert(step.name.as_str()))
            .map(|step| step.name.clone())
            .collect();
        JobStepSet { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// First step whose name contains a match for `pattern`.
    pub fn find_match(&self, pattern: &Regex) -> Option<&str> {
        self.names
            .iter()
            .map(String::as_str)
            .find(|name| pattern.is_match(name))
    }
}

/// Fetch the step names for `run_id`.
///
/// Fails with `ApiError::NotFound` while the run's jobs are not yet
/// queryable; callers treat that as "try again later".
pub async fn list_step_names(
    api: &dyn ActionsApi,
    ctx: &DispatchContext,
    run_id: u64,
) -> ApiResult<JobStepSet> {
    let jobs = api.list_jobs_for_run(&ctx.repo, run_id).await?;
    Ok(JobStepSet::from_jobs(&jobs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::CorrelationMarker;
    use std::time::Duration;
    use workflow_api::fakes::{job_with_steps, MemoryActionsApi};
    use workflow_api::RepoSlug;

    #[test]
    fn test_step_names_are_deduplicated_in_order() {
        let jobs = vec![
            job_with_steps(1, &["Set up job", "checkout", "build"]),
            job_with_steps(2, &["Set up job", "checkout", "test"]),
        ];
        let set = JobStepSet::from_jobs(&jobs);
        assert_eq!(set.names(), ["Set up job", "checkout", "build", "test"]);
    }

    #[test]
    fn test_find_match_is_substring_search() {
        let set = JobStepSet::from_jobs(&[job_with_steps(1, &["checkout", "echo M1 done"])]);
        let pattern = Regex::new("M1").unwrap();
        assert_eq!(set.find_match(&pattern), Some("echo M1 done"));
        assert_eq!(set.find_match(&Regex::new("M2").unwrap()), None);
    }

    #[tokio::test]
    async fn test_list_step_names_reports_not_found() {
        let api = MemoryActionsApi::new();
        let ctx = DispatchContext::new(
            RepoSlug::new("o", "r"),
            1,
            "refs/heads/main",
            Duration::from_secs(60),
            CorrelationMarker::generate(),
        )
        .unwrap();

        let err = list_step_names(&api, &ctx, 5).await.unwrap_err();
        assert!(err.is_not_found());

        api.push_jobs(5, vec![job_with_steps(1, &["a", "a", "b"])]);
        let set = list_step_names(&api, &ctx, 5).await.unwrap();
        assert_eq!(set.names(), ["a", "b"]);
    }
}
