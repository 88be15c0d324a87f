//! One full dispatch-then-locate cycle.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use workflow_api::ActionsApi;

use crate::config::DispatchConfig;
use crate::context::DispatchContext;
use crate::error::DispatchResult;
use crate::marker::CorrelationMarker;
use crate::resolver::resolve_run_id;
use crate::workflow::{dispatch, find_workflow_id, DispatchOutcome};

/// Result of [`Dispatcher::run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchReport {
    /// The dispatched run was identified.
    Resolved { run_id: u64, run_url: String },
    /// The workflow is disabled; nothing ran and there is no run id.
    Disabled { workflow_id: u64 },
}

/// Dispatches a workflow and identifies the run it created.
///
/// Holds no state between calls; every [`run`](Self::run) generates its own
/// marker, so concurrent invocations cannot confuse each other's runs.
pub struct Dispatcher {
    api: Arc<dyn ActionsApi>,
}

impl Dispatcher {
    pub fn new(api: Arc<dyn ActionsApi>) -> Self {
        Self { api }
    }

    /// Resolve the workflow, dispatch it, then locate the new run.
    pub async fn run(&self, config: &DispatchConfig) -> DispatchResult<DispatchReport> {
        config.validate()?;
        let api = self.api.as_ref();

        let marker = match &config.distinct_id {
            Some(raw) => CorrelationMarker::from_user(raw)?,
            None => CorrelationMarker::generate(),
        };

        let workflow_id = find_workflow_id(api, &config.repo, &config.workflow).await?;

        let outcome = dispatch(
            api,
            &config.repo,
            workflow_id,
            &config.git_ref,
            &config.inputs,
            &marker,
        )
        .await?;
        if outcome == DispatchOutcome::Disabled {
            return Ok(DispatchReport::Disabled { workflow_id });
        }

        let ctx = DispatchContext::new(
            config.repo.clone(),
            workflow_id,
            &config.git_ref,
            config.timeout,
            marker,
        )?;
        let resolved = resolve_run_id(api, &ctx).await?;

        let run = api.get_run(&ctx.repo, resolved.run_id).await?;
        info!(run_id = run.id, run_url = %run.html_url, "run identified");

        Ok(DispatchReport::Resolved {
            run_id: resolved.run_id,
            run_url: run.html_url,
        })
    }
}
