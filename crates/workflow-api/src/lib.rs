//! Workflow-API: GitHub Actions integration for return-dispatch
//!
//! This crate is the platform boundary. It defines the remote operations the
//! dispatcher consumes, the subset of the REST payloads it reads, and the
//! typed error taxonomy every backend must raise.
//!
//! ## Layer 0 - Platform API
//!
//! Focus: classifying responses at the edge so callers never match on
//! message strings.
//!
//! ## Key Components
//!
//! - `ActionsApi`: async trait over the five remote operations
//! - `GithubClient`: `reqwest` implementation against the REST API
//! - `fakes::MemoryActionsApi`: scripted in-memory implementation for tests

mod api;
mod client;
mod error;
pub mod fakes;
mod model;

pub use api::ActionsApi;
pub use client::{classify_status, GithubClient, GithubConfig, DEFAULT_API_URL};
pub use error::{ApiError, ApiResult};
pub use model::{Job, RepoSlug, Step, Workflow, WorkflowRun};
