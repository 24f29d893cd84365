use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::founder::Founder;

/// A named growth stage with its own weight multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub current: bool,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilestoneStatus {
    Completed,
    InProgress,
    Pending,
}

impl MilestoneStatus {
    pub fn label(self) -> &'static str {
        match self {
            MilestoneStatus::Completed => "Completed",
            MilestoneStatus::InProgress => "In Progress",
            MilestoneStatus::Pending => "Pending",
        }
    }
}

impl fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Milestone {
    fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            completed: false,
            current: false,
            weight: 1.0,
        }
    }

    /// Completed wins over current, matching how a revisited stage is shown.
    pub fn status(&self) -> MilestoneStatus {
        if self.completed {
            MilestoneStatus::Completed
        } else if self.current {
            MilestoneStatus::InProgress
        } else {
            MilestoneStatus::Pending
        }
    }
}

/// The seven stages every fresh state starts with, the first one current.
pub fn default_milestones() -> Vec<Milestone> {
    let mut milestones = vec![
        Milestone::new(
            "initial",
            "Initial Assessment",
            "First evaluation of co-founder contributions",
        ),
        Milestone::new("mvp", "MVP Development", "Minimum viable product creation phase"),
        Milestone::new(
            "pmf",
            "Product-Market Fit",
            "Validation that product meets market needs",
        ),
        Milestone::new("fundraising", "Fundraising Rounds", "Securing investment capital"),
        Milestone::new(
            "team-growth",
            "Team Growth & Structure",
            "Expansion of team and organizational structure",
        ),
        Milestone::new(
            "revenue",
            "Revenue Generation",
            "Beginning to generate consistent revenue",
        ),
        Milestone::new(
            "expansion",
            "International Expansion",
            "Expanding operations to new markets",
        ),
    ];
    milestones[0].current = true;
    milestones
}

/// Id of the milestone a fresh state starts on.
pub const INITIAL_MILESTONE_ID: &str = "initial";

/// Equity distribution frozen at the moment a milestone was completed.
///
/// Holds an owned copy of every founder, so later edits never reach it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub milestone_id: String,
    pub milestone_name: String,
    pub date: DateTime<Utc>,
    pub founders: Vec<Founder>,
}

impl HistoryEntry {
    pub fn snapshot(milestone: &Milestone, founders: &[Founder]) -> Self {
        Self {
            milestone_id: milestone.id.clone(),
            milestone_name: milestone.name.clone(),
            date: Utc::now(),
            founders: founders.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_milestones() {
        let milestones = default_milestones();
        assert_eq!(milestones.len(), 7);
        assert_eq!(milestones[0].id, INITIAL_MILESTONE_ID);
        assert!(milestones[0].current);
        assert_eq!(milestones.iter().filter(|m| m.current).count(), 1);
        assert!(milestones.iter().all(|m| !m.completed && m.weight == 1.0));
        assert_eq!(milestones[6].name, "International Expansion");
    }

    #[test]
    fn test_status() {
        let mut milestone = default_milestones().remove(1);
        assert_eq!(milestone.status(), MilestoneStatus::Pending);
        milestone.current = true;
        assert_eq!(milestone.status(), MilestoneStatus::InProgress);
        milestone.completed = true;
        assert_eq!(milestone.status(), MilestoneStatus::Completed);
    }

    #[test]
    fn test_weight_defaults_when_missing() {
        let json = r#"{"id":"mvp","name":"MVP Development","description":"","completed":false,"current":false}"#;
        let milestone: Milestone = serde_json::from_str(json).unwrap();
        assert_eq!(milestone.weight, 1.0);
    }
}
