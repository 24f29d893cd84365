pub mod criteria;
pub mod founder;
pub mod milestone;

pub use criteria::{Criterion, Scores, DEFAULT_SCORE, MAX_SCORE};
pub use founder::{
    color_for_index, parse_amount, sanitize_amount, Contribution, ContributionType,
    ContributionWeights, Founder, FOUNDER_COLORS,
};
pub use milestone::{
    default_milestones, HistoryEntry, Milestone, MilestoneStatus, INITIAL_MILESTONE_ID,
};

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("{criterion} score must be between 0 and 10, got {value}")]
    ScoreOutOfRange { criterion: Criterion, value: u8 },

    #[error("unknown criterion '{0}' (expected one of: role, usefulness, ideaContribution, businessPlan, expertise, commitment, operations)")]
    UnknownCriterion(String),

    #[error("unknown contribution type '{0}' (expected cash, time or skills)")]
    UnknownContributionType(String),
}
