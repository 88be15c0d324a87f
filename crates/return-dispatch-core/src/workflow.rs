//! Workflow lookup and dispatch.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};
use workflow_api::{ActionsApi, ApiError, RepoSlug, Workflow};

use crate::config::WorkflowSelector;
use crate::error::{DispatchError, DispatchResult};
use crate::marker::{CorrelationMarker, DISTINCT_ID_INPUT};

/// Outcome of a dispatch call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The platform accepted the dispatch; a run will appear.
    Dispatched,
    /// The workflow is disabled; nothing was started.
    Disabled,
}

/// Resolve a selector to a workflow id.
///
/// Numeric ids are used without a lookup. Names match a workflow's display
/// name exactly, or else its file path: either the whole path or its
/// trailing file name.
pub async fn find_workflow_id(
    api: &dyn ActionsApi,
    repo: &RepoSlug,
    selector: &WorkflowSelector,
) -> DispatchResult<u64> {
    let name = match selector {
        WorkflowSelector::Id(id) => return Ok(*id),
        WorkflowSelector::Name(name) => name,
    };

    let workflows = api.list_workflows(repo).await?;
    debug!(count = workflows.len(), "fetched workflows");

    match_workflow(&workflows, name)
        .map(|workflow| {
            info!(id = workflow.id, name = %workflow.name, path = %workflow.path, "selected workflow");
            workflow.id
        })
        .ok_or_else(|| DispatchError::WorkflowNotFound {
            selector: name.clone(),
        })
}

fn match_workflow<'a>(workflows: &'a [Workflow], name: &str) -> Option<&'a Workflow> {
    let suffix = format!("/{name}");
    workflows
        .iter()
        .find(|w| w.name == name)
        .or_else(|| {
            workflows
                .iter()
                .find(|w| w.path == name || w.path.ends_with(&suffix))
        })
}

/// Build the dispatch inputs: caller inputs plus the marker.
pub fn dispatch_inputs(
    inputs: &BTreeMap<String, String>,
    marker: &CorrelationMarker,
) -> BTreeMap<String, String> {
    let mut all = inputs.clone();
    if let Some(previous) = all.insert(DISTINCT_ID_INPUT.to_string(), marker.to_string()) {
        warn!(%previous, "overriding caller-supplied '{DISTINCT_ID_INPUT}' input");
    }
    all
}

/// Dispatch `workflow_id` on `git_ref`, tagging it with `marker`.
///
/// A disabled workflow is reported as [`DispatchOutcome::Disabled`], not as
/// an error.
pub async fn dispatch(
    api: &dyn ActionsApi,
    repo: &RepoSlug,
    workflow_id: u64,
    git_ref: &str,
    inputs: &BTreeMap<String, String>,
    marker: &CorrelationMarker,
) -> DispatchResult<DispatchOutcome> {
    let inputs = dispatch_inputs(inputs, marker);

    match api.dispatch_workflow(repo, workflow_id, git_ref, &inputs).await {
        Ok(()) => {
            info!(%repo, workflow_id, git_ref, %marker, "dispatched workflow");
            Ok(DispatchOutcome::Dispatched)
        }
        Err(ApiError::WorkflowDisabled { .. }) => {
            warn!(workflow_id, "workflow is disabled, nothing was dispatched");
            Ok(DispatchOutcome::Disabled)
        }
        Err(err) => Err(DispatchError::DispatchFailed(err)),
    }
}
