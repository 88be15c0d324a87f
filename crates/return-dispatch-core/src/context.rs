//! Immutable inputs of one resolution attempt.

use std::time::Duration;

use regex::Regex;
use workflow_api::RepoSlug;

use crate::error::DispatchResult;
use crate::marker::CorrelationMarker;

const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// Branch named by a dispatch ref.
///
/// Only fully-qualified branch refs (`refs/heads/<branch>`) name a branch;
/// tags, SHAs and short names yield `None`.
pub fn branch_from_ref(git_ref: &str) -> Option<&str> {
    git_ref
        .strip_prefix(BRANCH_REF_PREFIX)
        .filter(|branch| !branch.is_empty())
}

/// Everything the Resolution Engine needs, threaded explicitly through every
/// operation. Read-only for the lifetime of one resolution.
#[derive(Debug, Clone)]
pub struct DispatchContext {
    pub repo: RepoSlug,
    pub workflow_id: u64,
    pub git_ref: String,
    pub branch: Option<String>,
    pub overall_timeout: Duration,
    pub marker: CorrelationMarker,
    pattern: Regex,
}

impl DispatchContext {
    pub fn new(
        repo: RepoSlug,
        workflow_id: u64,
        git_ref: &str,
        overall_timeout: Duration,
        marker: CorrelationMarker,
    ) -> DispatchResult<Self> {
        let pattern = marker.pattern()?;
        Ok(DispatchContext {
            repo,
            workflow_id,
            git_ref: git_ref.to_string(),
            branch: branch_from_ref(git_ref).map(str::to_string),
            overall_timeout,
            marker,
            pattern,
        })
    }

    /// Escaped search pattern for the correlation marker.
    pub fn marker_pattern(&self) -> &Regex {
        &self.pattern
    }
}
