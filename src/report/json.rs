use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Reporter;
use crate::equity::{breakdown, team_summary};
use crate::model::{Contribution, ContributionWeights, HistoryEntry, Milestone, Scores};
use crate::state::AppState;

/// Machine-readable report: the same content as the HTML report, as JSON.
pub struct JsonReporter;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    active_milestone_id: &'a str,
    summary: JsonSummary,
    contribution_weights: &'a ContributionWeights,
    founders: Vec<JsonFounder<'a>>,
    milestones: &'a [Milestone],
    history: &'a [HistoryEntry],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSummary {
    total_team_score: f64,
    average_founder_score: f64,
    equity_sum: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonFounder<'a> {
    id: &'a str,
    name: &'a str,
    role: &'a str,
    email: Option<&'a str>,
    equity_percentage: f64,
    criteria_score: u32,
    contribution_score: f64,
    milestone_weight: f64,
    weighted_total: f64,
    scores: &'a Scores,
    contributions: &'a [Contribution],
}

impl JsonReporter {
    pub fn generate(&self, state: &AppState) -> Result<String> {
        let milestone_weight = state.active_milestone_weight();
        let summary = team_summary(&state.founders, &state.contribution_weights);

        let founders = state
            .founders
            .iter()
            .map(|founder| {
                let detail = breakdown(founder, &state.contribution_weights, milestone_weight);
                JsonFounder {
                    id: &founder.id,
                    name: &founder.name,
                    role: &founder.role,
                    email: founder.email.as_deref(),
                    equity_percentage: founder.equity_percentage,
                    criteria_score: detail.criteria_score,
                    contribution_score: detail.contribution_score,
                    milestone_weight: detail.milestone_weight,
                    weighted_total: detail.weighted_total,
                    scores: &founder.scores,
                    contributions: &founder.contributions,
                }
            })
            .collect();

        let report = JsonReport {
            generated_at: Utc::now(),
            active_milestone_id: &state.current_milestone_id,
            summary: JsonSummary {
                total_team_score: summary.total_score,
                average_founder_score: summary.average_score,
                equity_sum: state.equity_sum(),
            },
            contribution_weights: &state.contribution_weights,
            founders,
            milestones: &state.milestones,
            history: &state.history,
        };

        serde_json::to_string_pretty(&report).context("Failed to serialize JSON report")
    }
}

impl Reporter for JsonReporter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn file_extension(&self) -> &'static str {
        "json"
    }

    fn render(&self, state: &AppState) -> Result<Vec<u8>> {
        self.generate(state).map(String::into_bytes)
    }
}
