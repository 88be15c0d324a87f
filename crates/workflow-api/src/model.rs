//! Wire model for the GitHub Actions REST API.
//!
//! Only the fields the dispatcher reads are modelled; everything else in the
//! payloads is ignored during deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ApiError;

/// Repository coordinates (`owner/repo`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoSlug {
    pub owner: String,
    pub repo: String,
}

impl RepoSlug {
    pub fn new(owner: &str, repo: &str) -> Self {
        RepoSlug {
            owner: owner.to_string(),
            repo: repo.to_string(),
        }
    }
}

impl FromStr for RepoSlug {
    type Err = ApiError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = s.trim().split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty() => {
                Ok(RepoSlug::new(owner, repo))
            }
            _ => Err(ApiError::Config(format!(
                "invalid repository '{s}' (expected \"owner/repo\")"
            ))),
        }
    }
}

impl std::fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// A workflow definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: u64,
    pub name: String,
    /// Repository-relative file path, e.g. `.github/workflows/ci.yml`.
    pub path: String,
    /// `active`, `disabled_manually`, ...
    #[serde(default)]
    pub state: String,
}

/// One run of a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub head_branch: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl WorkflowRun {
    /// Minimal run carrying only an id.
    pub fn with_id(id: u64) -> Self {
        WorkflowRun {
            id,
            html_url: String::new(),
            head_branch: None,
            created_at: None,
        }
    }
}

/// A job within a run attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// A step within a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
}
