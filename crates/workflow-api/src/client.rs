//! GitHub REST client
//!
//! Implements [`ActionsApi`] over `reqwest`. Every response passes through
//! [`classify_status`], which is the only place HTTP statuses are turned
//! into [`ApiError`] variants.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::api::ActionsApi;
use crate::error::{ApiError, ApiResult};
use crate::model::{Job, RepoSlug, Workflow, WorkflowRun};

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";
const WORKFLOWS_PAGE_SIZE: u8 = 100;

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// API base URL (GitHub Enterprise Server uses `https://host/api/v3`)
    pub api_url: String,
    /// Token sent as a bearer credential
    pub token: String,
}

impl GithubConfig {
    /// Config for the public API.
    pub fn new(token: &str) -> Self {
        GithubConfig {
            api_url: std::env::var("GITHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            token: token.to_string(),
        }
    }

    /// Point the client at a different API host.
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }
}

#[derive(Deserialize)]
struct WorkflowList {
    workflows: Vec<Workflow>,
}

#[derive(Deserialize)]
struct RunList {
    workflow_runs: Vec<WorkflowRun>,
}

#[derive(Deserialize)]
struct JobList {
    jobs: Vec<Job>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Serialize)]
struct DispatchBody<'a> {
    #[serde(rename = "ref")]
    git_ref: &'a str,
    inputs: &'a BTreeMap<String, String>,
}

/// GitHub Actions REST client
pub struct GithubClient {
    config: GithubConfig,
    http_client: reqwest::Client,
}

impl GithubClient {
    /// Create a new client
    pub fn new(config: GithubConfig) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("return-dispatch/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(GithubClient {
            config,
            http_client,
        })
    }

    fn url(&self, repo: &RepoSlug, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/actions/{}",
            self.config.api_url.trim_end_matches('/'),
            repo.owner,
            repo.repo,
            path
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        debug!(%url, ?query, "GET");
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.config.token)
            .query(query)
            .send()
            .await?;
        let response = check_response(response, None).await?;
        let body = response.text().await?;
        trace!(bytes = body.len(), "response body received");
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ActionsApi for GithubClient {
    async fn list_workflows(&self, repo: &RepoSlug) -> ApiResult<Vec<Workflow>> {
        let url = self.url(repo, "workflows");
        let list: WorkflowList = self
            .get_json(&url, &[("per_page", WORKFLOWS_PAGE_SIZE.to_string())])
            .await?;
        Ok(list.workflows)
    }

    async fn dispatch_workflow(
        &self,
        repo: &RepoSlug,
        workflow_id: u64,
        git_ref: &str,
        inputs: &BTreeMap<String, String>,
    ) -> ApiResult<()> {
        let url = self.url(repo, &format!("workflows/{workflow_id}/dispatches"));
        debug!(%url, git_ref, "POST dispatch");
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.config.token)
            .json(&DispatchBody { git_ref, inputs })
            .send()
            .await?;
        check_response(response, Some(workflow_id)).await?;
        Ok(())
    }

    async fn list_workflow_runs(
        &self,
        repo: &RepoSlug,
        workflow_id: u64,
        branch: Option<&str>,
        per_page: u8,
    ) -> ApiResult<Vec<WorkflowRun>> {
        let url = self.url(repo, &format!("workflows/{workflow_id}/runs"));
        let mut query = vec![("per_page", per_page.to_string())];
        if let Some(branch) = branch {
            query.push(("branch", branch.to_string()));
        }
        let list: RunList = self.get_json(&url, &query).await?;
        Ok(list.workflow_runs)
    }

    async fn list_jobs_for_run(&self, repo: &RepoSlug, run_id: u64) -> ApiResult<Vec<Job>> {
        let url = self.url(repo, &format!("runs/{run_id}/jobs"));
        let list: JobList = self
            .get_json(&url, &[("filter", "latest".to_string())])
            .await?;
        Ok(list.jobs)
    }

    async fn get_run(&self, repo: &RepoSlug, run_id: u64) -> ApiResult<WorkflowRun> {
        let url = self.url(repo, &format!("runs/{run_id}"));
        self.get_json(&url, &[]).await
    }
}

async fn check_response(response: Response, dispatched: Option<u64>) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.message)
        .unwrap_or(body);
    Err(classify_status(status, message, dispatched))
}

/// Map a non-success status to an [`ApiError`].
///
/// `dispatched` carries the workflow id when the request was a dispatch,
/// the only call for which a 422 can mean "workflow disabled".
pub fn classify_status(status: StatusCode, message: String, dispatched: Option<u64>) -> ApiError {
    if status == StatusCode::NOT_FOUND {
        return ApiError::NotFound { message };
    }
    if let Some(workflow_id) = dispatched {
        if status == StatusCode::UNPROCESSABLE_ENTITY
            && message.to_ascii_lowercase().contains("disabled")
        {
            return ApiError::WorkflowDisabled { workflow_id };
        }
    }
    ApiError::UnexpectedStatus {
        status: status.as_u16(),
        message,
    }
}
