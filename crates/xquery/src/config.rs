use serde::{Deserialize, Serialize};

/// Tuning switches of the expression evaluator.
///
/// Missing fields take their default, so a partial JSON object is a valid
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Skip re-walking a sibling group when consecutive context nodes share
    /// a parent and request the same position. Results are identical either
    /// way.
    ///
    /// Defaults to `true`.
    pub memoize_sibling_groups: bool,

    /// Emit a debug log line with result count and elapsed time after each
    /// predicate evaluation.
    ///
    /// Defaults to `true`.
    pub log_timings: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            memoize_sibling_groups: true,
            log_timings: true,
        }
    }
}

impl EvaluatorConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
