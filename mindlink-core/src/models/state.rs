//! Vehicle state scores from the `vehicles/{id}/state` endpoint.
//!
//! The endpoint returns a list of `{scoreType, score}` pairs. The client
//! folds that list into a name→score mapping so callers can ask for a
//! metric by name.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One score entry as returned by the state endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    /// Metric name, e.g. `range_electric` or `charge_level`.
    pub score_type: String,

    /// Metric value. The backend omits it for metrics it cannot compute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// State scores folded into a mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleState {
    scores: HashMap<String, f64>,
}

impl VehicleState {
    /// Folds score entries into a state mapping. Entries without a value
    /// are dropped; on duplicate names the last entry wins.
    pub fn from_entries(entries: Vec<ScoreEntry>) -> Self {
        let scores = entries
            .into_iter()
            .filter_map(|entry| entry.score.map(|score| (entry.score_type, score)))
            .collect();
        Self { scores }
    }

    /// Returns the score for a metric name.
    pub fn score(&self, score_type: &str) -> Option<f64> {
        self.scores.get(score_type).copied()
    }

    /// Remaining electric range.
    pub fn range_electric(&self) -> Option<f64> {
        self.score("range_electric")
    }

    /// Battery charge level.
    pub fn charge_level(&self) -> Option<f64> {
        self.score("charge_level")
    }

    /// Number of known metrics.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Returns true when the server reported no usable metrics.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
