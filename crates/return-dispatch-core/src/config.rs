//! Dispatch configuration and input parsing.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use workflow_api::RepoSlug;

use crate::error::{DispatchError, DispatchResult};

/// Default overall time allowed to locate the run.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// How the target workflow is named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowSelector {
    /// Numeric workflow id, used as-is.
    Id(u64),
    /// Display name, or workflow file name (`echo.yml`, `.github/workflows/echo.yml`).
    Name(String),
}

impl FromStr for WorkflowSelector {
    type Err = DispatchError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DispatchError::InvalidInput(
                "workflow must not be empty".to_string(),
            ));
        }
        Ok(match s.parse::<u64>() {
            Ok(id) => WorkflowSelector::Id(id),
            Err(_) => WorkflowSelector::Name(s.to_string()),
        })
    }
}

impl std::fmt::Display for WorkflowSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowSelector::Id(id) => write!(f, "{id}"),
            WorkflowSelector::Name(name) => write!(f, "{name}"),
        }
    }
}

/// Parse the workflow inputs JSON. Blank input means no inputs; otherwise
/// it must be a flat object of string values.
pub fn parse_workflow_inputs(json: &str) -> DispatchResult<BTreeMap<String, String>> {
    if json.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let value: Value = serde_json::from_str(json)
        .map_err(|e| DispatchError::InvalidInput(format!("workflow inputs are not valid JSON: {e}")))?;

    let Value::Object(map) = value else {
        return Err(DispatchError::InvalidInput(
            "workflow inputs must be a JSON object".to_string(),
        ));
    };

    map.into_iter()
        .map(|(key, value)| match value {
            Value::String(s) => Ok((key, s)),
            other => Err(DispatchError::InvalidInput(format!(
                "workflow input '{key}' must be a string, got {other}"
            ))),
        })
        .collect()
}

/// Validated inputs for one dispatch-then-locate cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    pub repo: RepoSlug,
    pub workflow: WorkflowSelector,
    /// Git ref to dispatch on (`refs/heads/main`, `refs/tags/v1`, `main`, ...).
    pub git_ref: String,
    pub inputs: BTreeMap<String, String>,
    pub timeout: Duration,
    /// Caller-chosen correlation marker; generated when absent.
    pub distinct_id: Option<String>,
}

impl DispatchConfig {
    pub fn new(repo: RepoSlug, workflow: WorkflowSelector, git_ref: &str) -> Self {
        DispatchConfig {
            repo,
            workflow,
            git_ref: git_ref.trim().to_string(),
            inputs: BTreeMap::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            distinct_id: None,
        }
    }

    pub fn with_inputs(mut self, inputs: BTreeMap<String, String>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_distinct_id(mut self, distinct_id: Option<String>) -> Self {
        self.distinct_id = distinct_id.filter(|id| !id.trim().is_empty());
        self
    }

    /// Reject configurations that can never succeed.
    pub fn validate(&self) -> DispatchResult<()> {
        if self.git_ref.is_empty() {
            return Err(DispatchError::InvalidInput("ref must not be empty".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(DispatchError::InvalidInput(
                "workflow timeout must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_parsing() {
        assert_eq!("1234".parse::<WorkflowSelector>().unwrap(), WorkflowSelector::Id(1234));
        assert_eq!(
            "echo-2.yaml".parse::<WorkflowSelector>().unwrap(),
            WorkflowSelector::Name("echo-2.yaml".to_string())
        );
        assert!("  ".parse::<WorkflowSelector>().is_err());
    }

    #[test]
    fn test_parse_inputs_flat_strings() {
        let inputs = parse_workflow_inputs(r#"{"cake": "delicious", "count": "3"}"#).unwrap();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs["cake"], "delicious");
    }

    #[test]
    fn test_parse_inputs_blank_is_empty() {
        assert!(parse_workflow_inputs("").unwrap().is_empty());
        assert!(parse_workflow_inputs("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_inputs_rejects_non_strings() {
        let err = parse_workflow_inputs(r#"{"count": 3}"#).unwrap_err();
        assert!(err.to_string().contains("count"));

        assert!(parse_workflow_inputs(r#"{"nested": {"a": "b"}}"#).is_err());
        assert!(parse_workflow_inputs(r#"["a"]"#).is_err());
        assert!(parse_workflow_inputs("{not json").is_err());
    }

    #[test]
    fn test_config_validation() {
        let repo = RepoSlug::new("o", "r");
        let config = DispatchConfig::new(repo.clone(), WorkflowSelector::Id(1), "main");
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(config.validate().is_ok());

        let config = DispatchConfig::new(repo.clone(), WorkflowSelector::Id(1), " ");
        assert!(config.validate().is_err());

        let config = DispatchConfig::new(repo, WorkflowSelector::Id(1), "main").with_timeout_secs(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_distinct_id_is_ignored() {
        let config = DispatchConfig::new(RepoSlug::new("o", "r"), WorkflowSelector::Id(1), "main")
            .with_distinct_id(Some("  ".to_string()));
        assert_eq!(config.distinct_id, None);
    }
}
