use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::state::RevisitPolicy;

/// Application configuration.
///
/// Example YAML:
/// ```yaml
/// state_path: /home/me/cofounders.json
/// bounds:
///   milestone_weight: { min: 0.1, max: 3.0 }
///   contribution_weight: { min: 0.1, max: 3.0 }
/// milestones:
///   allow_revisit_completed: true
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Where the state record lives (default: next to this config file)
    #[serde(default)]
    pub state_path: Option<PathBuf>,

    #[serde(default)]
    pub bounds: Bounds,

    #[serde(default)]
    pub milestones: MilestoneConfig,
}

/// Accepted input ranges for weights typed on the command line.
/// The engine itself takes any positive weight.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Bounds {
    #[serde(default = "WeightRange::standard")]
    pub milestone_weight: WeightRange,

    #[serde(default = "WeightRange::standard")]
    pub contribution_weight: WeightRange,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            milestone_weight: WeightRange::standard(),
            contribution_weight: WeightRange::standard(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WeightRange {
    pub min: f64,
    pub max: f64,
}

impl WeightRange {
    pub fn standard() -> Self {
        Self { min: 0.1, max: 3.0 }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MilestoneConfig {
    /// Allow selecting a milestone that was already completed
    #[serde(default = "default_true")]
    pub allow_revisit_completed: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MilestoneConfig {
    fn default() -> Self {
        Self {
            allow_revisit_completed: true,
        }
    }
}

impl MilestoneConfig {
    pub fn revisit_policy(&self) -> RevisitPolicy {
        if self.allow_revisit_completed {
            RevisitPolicy::Allow
        } else {
            RevisitPolicy::Reject
        }
    }
}
