//! return-dispatch - dispatch a GitHub Actions workflow and print its run id
//!
//! Every option can also be given through the environment, using the
//! `INPUT_*` names GitHub Actions sets for action inputs.
//!
//! ## Outputs
//!
//! - stdout: the resolved run id
//! - `$GITHUB_OUTPUT` (when set): `run_id` and `run_url`

mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use return_dispatch_core::{
    parse_workflow_inputs, DispatchConfig, DispatchReport, Dispatcher, WorkflowSelector,
    DEFAULT_TIMEOUT_SECS, TOKEN_SCOPE_HINT,
};
use tracing::{error, info, warn, Level};
use workflow_api::{GithubClient, GithubConfig, RepoSlug, DEFAULT_API_URL};

use crate::output::{append_step_outputs, RunOutputs};

#[derive(Parser, Debug)]
#[command(name = "return-dispatch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Dispatch a GitHub Actions workflow and return the id of the run it created", long_about = None)]
struct Cli {
    /// Workflow to dispatch: numeric id, name, or file name (e.g. `release.yml`)
    #[arg(long, env = "INPUT_WORKFLOW")]
    workflow: String,

    /// Token used for all API calls
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: String,

    /// Git ref to dispatch on (e.g. `refs/heads/main`)
    #[arg(long = "ref", env = "INPUT_REF")]
    git_ref: String,

    /// Target repository as `owner/repo` (default: $GITHUB_REPOSITORY)
    #[arg(long, env = "INPUT_REPO")]
    repo: Option<String>,

    /// Workflow inputs as a flat JSON object of strings
    #[arg(long, env = "INPUT_WORKFLOW_INPUTS", default_value = "")]
    workflow_inputs: String,

    /// Seconds to wait for the dispatched run to be identified
    #[arg(long, env = "INPUT_WORKFLOW_TIMEOUT_SECONDS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    workflow_timeout_seconds: u64,

    /// Use this correlation marker instead of a generated one
    #[arg(long, env = "INPUT_DISTINCT_ID")]
    distinct_id: Option<String>,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// File that step outputs are appended to
    #[arg(long, env = "GITHUB_OUTPUT")]
    output_file: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn repo(&self) -> Result<RepoSlug> {
        let raw = match &self.repo {
            Some(repo) if !repo.trim().is_empty() => repo.clone(),
            _ => std::env::var("GITHUB_REPOSITORY")
                .context("No repository given: pass --repo or set GITHUB_REPOSITORY")?,
        };
        Ok(raw.parse()?)
    }

    fn dispatch_config(&self) -> Result<DispatchConfig> {
        let workflow: WorkflowSelector = self.workflow.parse()?;
        let inputs = parse_workflow_inputs(&self.workflow_inputs)?;

        Ok(DispatchConfig::new(self.repo()?, workflow, &self.git_ref)
            .with_inputs(inputs)
            .with_timeout_secs(self.workflow_timeout_seconds)
            .with_distinct_id(self.distinct_id.clone()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    return_dispatch_core::init_tracing(cli.json, level);

    if let Err(err) = run(&cli).await {
        error!("{err:#}");
        error!("{TOKEN_SCOPE_HINT}");
        return Err(err);
    }
    Ok(())
}

async fn run(cli: &Cli) -> Result<()> {
    let config = cli.dispatch_config()?;

    let client = GithubClient::new(GithubConfig::new(&cli.token).with_api_url(&cli.api_url))
        .context("Failed to create GitHub client")?;
    let dispatcher = Dispatcher::new(Arc::new(client));

    info!(
        repo = %config.repo,
        workflow = %config.workflow,
        git_ref = %config.git_ref,
        "dispatching workflow"
    );

    match dispatcher.run(&config).await? {
        DispatchReport::Resolved { run_id, run_url } => {
            println!("{run_id}");
            if let Some(path) = &cli.output_file {
                append_step_outputs(path, &RunOutputs { run_id, run_url })?;
            }
        }
        DispatchReport::Disabled { workflow_id } => {
            warn!(workflow_id, "workflow is disabled; no run was started");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["return-dispatch", "--token", "t", "--ref", "refs/heads/main"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("parse")
    }

    #[test]
    fn test_cli_builds_config() {
        let cli = parse(&[
            "--workflow",
            "echo-2.yaml",
            "--repo",
            "octo/hello",
            "--workflow-inputs",
            r#"{"cake": "delicious"}"#,
            "--workflow-timeout-seconds",
            "30",
        ]);
        let config = cli.dispatch_config().unwrap();

        assert_eq!(config.repo, RepoSlug::new("octo", "hello"));
        assert_eq!(config.workflow, WorkflowSelector::Name("echo-2.yaml".to_string()));
        assert_eq!(config.inputs["cake"], "delicious");
        assert_eq!(config.timeout.as_secs(), 30);
        assert_eq!(config.distinct_id, None);
    }

    #[test]
    fn test_cli_rejects_bad_inputs() {
        let cli = parse(&[
            "--workflow",
            "1",
            "--repo",
            "octo/hello",
            "--workflow-inputs",
            r#"{"n": 1}"#,
        ]);
        assert!(cli.dispatch_config().is_err());
    }

    #[test]
    fn test_cli_rejects_malformed_repo() {
        let cli = parse(&["--workflow", "1", "--repo", "octo"]);
        assert!(cli.dispatch_config().is_err());
    }
}
