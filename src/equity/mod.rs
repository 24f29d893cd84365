pub mod engine;

pub use engine::{
    breakdown, contribution_score, contribution_totals, criteria_score, criterion_share,
    recompute_equity, team_summary, ContributionTotals, EquityBreakdown, EquityOutcome,
    TeamSummary,
};
