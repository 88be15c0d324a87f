//! Resolution Engine: find the run created by a dispatch.
//!
//! The dispatch API returns no run id, so the engine polls. Each search
//! cycle re-enumerates the workflow's recent runs (through the retry
//! envelope) and inspects their step names for the correlation marker. The
//! first run whose steps match wins.
//!
//! ```text
//! Searching ──match──────────────▶ Resolved(run_id)
//!     │  ▲
//!     │  └── no match, 5s backoff
//!     ├──deadline elapsed────────▶ Failed(Timeout)
//!     └──API error (not 404)─────▶ Failed(Api)
//! ```
//!
//! Cancellation is cooperative: the deadline is checked at the top of each
//! cycle and after it, never in the middle of a remote call.

use std::cmp::min;
use std::time::Duration;

use serde::Serialize;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};
use workflow_api::ActionsApi;

use crate::context::DispatchContext;
use crate::error::{DispatchError, DispatchResult};
use crate::retry::retry_until_non_empty;
use crate::runs::{list_run_ids, CandidateRun};
use crate::steps::list_step_names;

/// Pause between search cycles that found no match.
pub const CYCLE_BACKOFF: Duration = Duration::from_secs(5);

/// Upper bound on the enumeration budget of one cycle.
pub const MAX_ENUMERATION_BUDGET: Duration = Duration::from_secs(60);

/// State of a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ResolutionState {
    Searching { cycle: u32 },
    Resolved { run_id: u64 },
    Failed { reason: String },
}

/// Terminal success of a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRun {
    pub run_id: u64,
    /// Step name that carried the marker.
    pub matched_step: String,
    /// Search cycles needed, starting at 1.
    pub cycles: u32,
}

/// Poll until a run of `ctx.workflow_id` whose steps contain the marker is
/// found, or `ctx.overall_timeout` has elapsed.
///
/// The deadline starts when this function is called, which should be right
/// after a successful dispatch.
pub async fn resolve_run_id(
    api: &dyn ActionsApi,
    ctx: &DispatchContext,
) -> DispatchResult<ResolvedRun> {
    let started = Instant::now();
    let deadline = started + ctx.overall_timeout;
    let mut cycle = 0u32;

    info!(
        repo = %ctx.repo,
        workflow_id = ctx.workflow_id,
        marker = %ctx.marker,
        timeout_secs = ctx.overall_timeout.as_secs(),
        "searching for dispatched run"
    );

    let result = loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break Err(timeout(started));
        }

        cycle += 1;
        let state = ResolutionState::Searching { cycle };
        debug!(?state, ?remaining, "starting search cycle");

        match search_cycle(api, ctx, min(MAX_ENUMERATION_BUDGET, remaining)).await {
            Ok(Some((run_id, matched_step))) => {
                break Ok(ResolvedRun {
                    run_id,
                    matched_step,
                    cycles: cycle,
                })
            }
            Ok(None) => {}
            Err(err) => break Err(err),
        }

        if Instant::now() >= deadline {
            break Err(timeout(started));
        }

        debug!(backoff = ?CYCLE_BACKOFF, "no run matched, waiting before next cycle");
        sleep(CYCLE_BACKOFF).await;
    };

    match &result {
        Ok(resolved) => {
            let state = ResolutionState::Resolved {
                run_id: resolved.run_id,
            };
            info!(
                ?state,
                step = %resolved.matched_step,
                cycles = resolved.cycles,
                "resolved dispatched run"
            );
        }
        Err(err) => {
            let state = ResolutionState::Failed {
                reason: err.to_string(),
            };
            warn!(?state, cycles = cycle, "could not resolve dispatched run");
        }
    }

    result
}

/// One enumerate-then-inspect pass. Returns the first matching run.
async fn search_cycle(
    api: &dyn ActionsApi,
    ctx: &DispatchContext,
    enumeration_budget: Duration,
) -> DispatchResult<Option<(u64, String)>> {
    let candidates: Vec<CandidateRun> = retry_until_non_empty(
        || list_run_ids(api, ctx),
        enumeration_budget,
        "waiting for workflow runs to appear",
    )
    .await?;

    let pattern = ctx.marker_pattern();
    for candidate in &candidates {
        let steps = match list_step_names(api, ctx, candidate.run_id).await {
            Ok(steps) => steps,
            Err(err) if err.is_not_found() => {
                debug!(run_id = candidate.run_id, "run jobs not available yet, skipping");
                continue;
            }
            Err(err) => return Err(DispatchError::Api(err)),
        };

        if let Some(step) = steps.find_match(pattern) {
            return Ok(Some((candidate.run_id, step.to_string())));
        }
        debug!(
            run_id = candidate.run_id,
            steps = steps.names().len(),
            "run does not carry the marker"
        );
    }

    Ok(None)
}

fn timeout(started: Instant) -> DispatchError {
    DispatchError::Timeout {
        during: "locating the dispatched run".to_string(),
        after: started.elapsed(),
    }
}
