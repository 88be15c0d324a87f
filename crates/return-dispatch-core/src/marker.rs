//! Correlation markers.
//!
//! A marker is injected into the dispatch as the `distinct_id` input; the
//! dispatched workflow echoes it into a step name, which is how the run is
//! recognised later.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, DispatchResult};

/// Workflow input carrying the marker.
pub const DISTINCT_ID_INPUT: &str = "distinct_id";

/// Token tagging one dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationMarker(String);

impl CorrelationMarker {
    /// Generate a fresh random marker (UUID v4, hyphenated).
    pub fn generate() -> Self {
        CorrelationMarker(uuid::Uuid::new_v4().to_string())
    }

    /// Use a caller-supplied marker. Any characters are allowed; the search
    /// pattern escapes them.
    pub fn from_user(raw: &str) -> DispatchResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(DispatchError::InvalidInput(
                "distinct id must not be empty".to_string(),
            ));
        }
        Ok(CorrelationMarker(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Pattern matching the marker literally anywhere in a step name.
    pub fn pattern(&self) -> DispatchResult<Regex> {
        Regex::new(&regex::escape(&self.0))
            .map_err(|e| DispatchError::InvalidInput(format!("distinct id: {e}")))
    }
}

impl std::fmt::Display for CorrelationMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_markers_are_unique() {
        let a = CorrelationMarker::generate();
        let b = CorrelationMarker::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_pattern_matches_embedded_marker() {
        let marker = CorrelationMarker::generate();
        let step = format!("Echo distinct ID [{marker}]");
        let pattern = marker.pattern().unwrap();
        assert!(pattern.is_match(&step));
        assert!(!pattern.is_match("Echo distinct ID [other]"));
    }

    #[test]
    fn test_special_characters_are_literal() {
        let marker = CorrelationMarker::from_user("run.1+(a|b)").unwrap();
        let pattern = marker.pattern().unwrap();
        assert!(pattern.is_match("echo run.1+(a|b)"));
        assert!(!pattern.is_match("echo runX11a"));
        assert!(!pattern.is_match("echo b"));
    }

    #[test]
    fn test_empty_user_marker_rejected() {
        assert!(CorrelationMarker::from_user("   ").is_err());
    }
}
