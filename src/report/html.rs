//! HTML reporter: a single self-contained document with inline CSS.

use anyhow::Result;
use chrono::{Local, NaiveDate};

use super::Reporter;
use crate::equity::{breakdown, contribution_totals, criterion_share, team_summary};
use crate::model::{ContributionType, Founder, HistoryEntry, Milestone, MilestoneStatus};
use crate::output::format_amount;
use crate::state::AppState;

pub struct HtmlReporter {
    pub title: String,
    pub generated_on: NaiveDate,
}

impl HtmlReporter {
    pub fn new() -> Self {
        Self {
            title: "Startup Equity Distribution Report".to_string(),
            generated_on: Local::now().date_naive(),
        }
    }

    pub fn with_date(generated_on: NaiveDate) -> Self {
        Self {
            generated_on,
            ..Self::new()
        }
    }

    fn escape_html(s: &str) -> String {
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }

    fn status_class(status: MilestoneStatus) -> &'static str {
        match status {
            MilestoneStatus::Completed => "completed",
            MilestoneStatus::InProgress => "in-progress",
            MilestoneStatus::Pending => "pending",
        }
    }

    /// Colors are only ever palette hex codes, but they come from a file the
    /// user can edit, so anything else falls back to neutral grey.
    fn safe_color(color: &str) -> &str {
        let valid = color.len() == 7
            && color.starts_with('#')
            && color[1..].chars().all(|c| c.is_ascii_hexdigit());
        if valid {
            color
        } else {
            "#999999"
        }
    }

    fn equity_table(&self, html: &mut String, founders: &[Founder]) {
        html.push_str("<h2>Current Equity Distribution</h2>\n");
        html.push_str("<table>\n<thead><tr><th>Co-founder</th><th>Role</th><th>Equity</th></tr></thead>\n<tbody>\n");
        for founder in founders {
            html.push_str(&format!(
                "<tr><td><span class=\"dot\" style=\"background-color: {};\"></span>{}</td><td>{}</td><td><strong>{:.2}%</strong></td></tr>\n",
                Self::safe_color(&founder.color),
                Self::escape_html(&founder.name),
                Self::escape_html(&founder.role),
                founder.equity_percentage
            ));
        }
        html.push_str("</tbody>\n</table>\n");
    }

    fn score_summary(&self, html: &mut String, state: &AppState) {
        let summary = team_summary(&state.founders, &state.contribution_weights);
        html.push_str("<h2>Global Score Summary</h2>\n<div class=\"summary-cards\">\n");
        html.push_str(&format!(
            "<div class=\"summary-card\"><p>Total Team Score</p><div class=\"value\">{}</div></div>\n",
            trim_number(summary.total_score)
        ));
        html.push_str(&format!(
            "<div class=\"summary-card\"><p>Average Founder Score</p><div class=\"value\">{:.1}</div></div>\n",
            summary.average_score
        ));
        html.push_str("</div>\n");
    }

    fn milestone_weights(&self, html: &mut String, milestones: &[Milestone]) {
        html.push_str("<h2>Milestone Weights</h2>\n<p>How each growth stage impacts equity calculations:</p>\n");
        html.push_str("<table>\n<thead><tr><th>Milestone</th><th>Status</th><th>Weight</th></tr></thead>\n<tbody>\n");
        for milestone in milestones {
            let status = milestone.status();
            html.push_str(&format!(
                "<tr><td>{}</td><td class=\"{}\">{}</td><td><strong>{:.1}x</strong></td></tr>\n",
                Self::escape_html(&milestone.name),
                Self::status_class(status),
                status,
                milestone.weight
            ));
        }
        html.push_str("</tbody>\n</table>\n");
    }

    fn contribution_weights(&self, html: &mut String, state: &AppState) {
        html.push_str("<h2>Contribution Type Weights</h2>\n<p>How different contribution types impact equity calculations:</p>\n");
        html.push_str("<table>\n<thead><tr><th>Contribution Type</th><th>Weight Multiplier</th></tr></thead>\n<tbody>\n");
        for kind in ContributionType::ALL {
            html.push_str(&format!(
                "<tr><td>{}</td><td><strong>{:.1}x</strong></td></tr>\n",
                kind.label(),
                state.contribution_weights.get(kind)
            ));
        }
        html.push_str("</tbody>\n</table>\n");
    }

    fn founder_detail(&self, html: &mut String, founder: &Founder, state: &AppState) {
        let color = Self::safe_color(&founder.color);
        let detail = breakdown(
            founder,
            &state.contribution_weights,
            state.active_milestone_weight(),
        );

        html.push_str(&format!(
            "<h3 style=\"color: {};\">{} - {}</h3>\n",
            color,
            Self::escape_html(&founder.name),
            Self::escape_html(&founder.role)
        ));
        html.push_str("<table>\n<thead><tr><th>Criterion</th><th>Score (0-10)</th><th>Percentage</th></tr></thead>\n<tbody>\n");
        for (criterion, score) in founder.scores.iter() {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{:.1}%</td></tr>\n",
                criterion.label(),
                score,
                criterion_share(score, detail.criteria_score)
            ));
        }
        html.push_str(&format!(
            "<tr class=\"total\"><td><strong>Total Score</strong></td><td><strong>{}</strong></td><td><strong>100%</strong></td></tr>\n",
            detail.criteria_score
        ));
        html.push_str("</tbody>\n</table>\n");

        if !founder.contributions.is_empty() {
            self.contribution_ledger(html, founder);
        }

        html.push_str(&format!(
            "<table class=\"allocation\"><tr><td><strong>Equity Allocation</strong></td><td>Weighted total {:.1}</td><td><strong>{:.2}%</strong></td></tr></table>\n",
            detail.weighted_total, founder.equity_percentage
        ));
    }

    fn contribution_ledger(&self, html: &mut String, founder: &Founder) {
        html.push_str("<h4>Additional Contributions</h4>\n");
        html.push_str("<table>\n<thead><tr><th>Type</th><th>Amount</th><th>Description</th><th>Date</th></tr></thead>\n<tbody>\n");

        // Grouped by type, in ledger order within each type
        for kind in ContributionType::ALL {
            for contribution in founder.contributions.iter().filter(|c| c.kind == kind) {
                html.push_str(&format!(
                    "<tr><td><span class=\"badge {}\">{}</span></td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                    kind.id(),
                    kind.badge(),
                    format_amount(kind, contribution.amount),
                    Self::escape_html(&contribution.description),
                    contribution.date.format("%Y-%m-%d")
                ));
            }
        }
        html.push_str("</tbody>\n");

        let totals = contribution_totals(founder);
        let badges: Vec<String> = ContributionType::ALL
            .into_iter()
            .filter(|kind| totals.get(*kind) > 0.0)
            .map(|kind| {
                format!(
                    "<span class=\"badge {}\">{}</span>",
                    kind.id(),
                    format_amount(kind, totals.get(kind))
                )
            })
            .collect();
        html.push_str(&format!(
            "<tfoot><tr><td colspan=\"4\"><strong>Totals:</strong> {}</td></tr></tfoot>\n",
            badges.join(" ")
        ));
        html.push_str("</table>\n");
    }

    fn history(&self, html: &mut String, history: &[HistoryEntry]) {
        if history.is_empty() {
            return;
        }
        html.push_str("<h2>Equity Evolution History</h2>\n");
        for entry in history {
            html.push_str(&format!(
                "<h3>Milestone: {} - {}</h3>\n<div class=\"tags\">\n",
                Self::escape_html(&entry.milestone_name),
                entry.date.format("%Y-%m-%d")
            ));
            for founder in &entry.founders {
                let color = Self::safe_color(&founder.color);
                html.push_str(&format!(
                    "<div class=\"founder-tag\" style=\"background-color: {}20; color: {};\">{}: {:.2}%</div>\n",
                    color,
                    color,
                    Self::escape_html(&founder.name),
                    founder.equity_percentage
                ));
            }
            html.push_str("</div>\n");
        }
    }

    fn progress(&self, html: &mut String, milestones: &[Milestone]) {
        let started = milestones.iter().any(|m| m.completed || m.current);
        if !started {
            return;
        }
        html.push_str("<h2>Startup Progress</h2>\n");
        html.push_str("<table>\n<thead><tr><th>Milestone</th><th>Status</th></tr></thead>\n<tbody>\n");
        for milestone in milestones {
            let status = milestone.status();
            html.push_str(&format!(
                "<tr><td>{}</td><td class=\"{}\">{}</td></tr>\n",
                Self::escape_html(&milestone.name),
                Self::status_class(status),
                status
            ));
        }
        html.push_str("</tbody>\n</table>\n");
    }

    /// Render the report as an HTML document.
    pub fn generate(&self, state: &AppState) -> Result<String> {
        let mut html = String::with_capacity(16384);

        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        html.push_str("<meta charset=\"UTF-8\">\n");
        html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
        html.push_str(&format!("<title>{}</title>\n", Self::escape_html(&self.title)));
        html.push_str("<style>\n");
        html.push_str(INLINE_CSS);
        html.push_str("</style>\n</head>\n<body>\n");

        html.push_str(&format!("<h1>{}</h1>\n", Self::escape_html(&self.title)));
        html.push_str(&format!(
            "<p>Generated on {}</p>\n",
            self.generated_on.format("%Y-%m-%d")
        ));

        self.equity_table(&mut html, &state.founders);
        self.score_summary(&mut html, state);
        self.milestone_weights(&mut html, &state.milestones);
        self.contribution_weights(&mut html, state);

        html.push_str("<h2>Detailed Scoring</h2>\n");
        for founder in &state.founders {
            self.founder_detail(&mut html, founder, state);
        }

        self.history(&mut html, &state.history);
        self.progress(&mut html, &state.milestones);

        html.push_str("<footer><p>Generated by Equity Growth Compass | This document is for informational purposes only.</p></footer>\n");
        html.push_str("</body>\n</html>\n");
        Ok(html)
    }
}

impl Default for HtmlReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for HtmlReporter {
    fn name(&self) -> &'static str {
        "html"
    }

    fn file_extension(&self) -> &'static str {
        "html"
    }

    fn render(&self, state: &AppState) -> Result<Vec<u8>> {
        self.generate(state).map(String::into_bytes)
    }
}

/// Whole numbers without a trailing ".0", everything else to one decimal.
fn trim_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

const INLINE_CSS: &str = r#"
body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 1000px; margin: 0 auto; padding: 20px; }
h1 { color: #5a32a8; border-bottom: 2px solid #5a32a8; padding-bottom: 10px; }
h2 { color: #5a32a8; margin-top: 30px; }
table { width: 100%; border-collapse: collapse; margin: 20px 0; }
th { background-color: #5a32a8; color: white; text-align: left; padding: 10px; }
td { padding: 8px 10px; border-bottom: 1px solid #ddd; }
tr:nth-child(even) { background-color: #f2f2f2; }
.dot { display: inline-block; width: 12px; height: 12px; border-radius: 50%; margin-right: 8px; }
.summary-cards { display: flex; gap: 20px; margin-bottom: 20px; }
.summary-card { background: #f8f9fa; border: 1px solid #e9ecef; border-radius: 8px; padding: 15px; flex: 1; }
.summary-card p { margin: 0; font-size: 14px; color: #6c757d; }
.summary-card .value { font-size: 24px; font-weight: bold; color: #5a32a8; margin-top: 5px; }
.allocation tr { background-color: #5a32a8; color: white; }
.tags { display: flex; flex-wrap: wrap; gap: 8px; margin-bottom: 20px; }
.founder-tag { display: inline-block; padding: 4px 8px; border-radius: 16px; font-size: 14px; }
.completed { color: green; }
.in-progress { color: blue; }
.pending { color: #666; }
.badge { display: inline-block; font-size: 12px; padding: 3px 8px; border-radius: 12px; margin-right: 4px; }
.badge.cash { background-color: rgba(16, 185, 129, 0.1); color: rgb(16, 185, 129); }
.badge.time { background-color: rgba(99, 102, 241, 0.1); color: rgb(99, 102, 241); }
.badge.skills { background-color: rgba(244, 63, 94, 0.1); color: rgb(244, 63, 94); }
footer { margin-top: 40px; border-top: 1px solid #ddd; padding-top: 10px; font-size: 12px; color: #999; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Criterion;
    use crate::state::{NewContribution, NewFounder};

    fn sample_state() -> AppState {
        let mut state = AppState::new();
        let ada = state
            .add_founder(NewFounder {
                name: "Ada <script>".to_string(),
                role: "CTO & Co".to_string(),
                ..Default::default()
            })
            .unwrap()
            .id
            .clone();
        state
            .add_founder(NewFounder {
                name: "Grace".to_string(),
                role: "CEO".to_string(),
                ..Default::default()
            })
            .unwrap();
        state.set_score(&ada, Criterion::Role, 10).unwrap();
        state
            .add_contribution(
                &ada,
                NewContribution {
                    kind: ContributionType::Cash,
                    amount: 5000.0,
                    description: "Seed".to_string(),
                },
            )
            .unwrap();
        state
    }

    fn render(state: &AppState) -> String {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        HtmlReporter::with_date(date).generate(state).unwrap()
    }

    #[test]
    fn test_escapes_user_text() {
        let html = render(&sample_state());
        assert!(html.contains("Ada &lt;script&gt;"));
        assert!(html.contains("CTO &amp; Co"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_contains_all_sections() {
        let mut state = sample_state();
        state.complete_milestone("initial").unwrap();
        let html = render(&state);

        for heading in [
            "Current Equity Distribution",
            "Global Score Summary",
            "Milestone Weights",
            "Contribution Type Weights",
            "Detailed Scoring",
            "Additional Contributions",
            "Equity Evolution History",
            "Startup Progress",
        ] {
            assert!(html.contains(heading), "missing section {}", heading);
        }
        assert!(html.contains("Generated on 2024-05-01"));
        assert!(html.contains("Milestone: Initial Assessment"));
    }

    #[test]
    fn test_equity_and_weights_formatting() {
        let html = render(&sample_state());
        // Ada: 40 + 5000 = 5040, Grace: 35, total 5075
        assert!(html.contains("<strong>99.31%</strong>"));
        assert!(html.contains("<strong>0.69%</strong>"));
        assert!(html.contains("<div class=\"value\">5075</div>"));
        assert!(html.contains("<div class=\"value\">2537.5</div>"));
        assert!(html.contains("<strong>1.0x</strong>"));
        assert!(html.contains("$5,000"));
    }

    #[test]
    fn test_criterion_percentages() {
        let html = render(&sample_state());
        // Ada's role is 10 of 40
        assert!(html.contains("<td>Role in Project</td><td>10</td><td>25.0%</td>"));
    }

    #[test]
    fn test_no_history_section_without_entries() {
        let html = render(&AppState::new());
        assert!(!html.contains("Equity Evolution History"));
        assert!(html.contains("Startup Progress"));
    }

    #[test]
    fn test_safe_color() {
        assert_eq!(HtmlReporter::safe_color("#10B981"), "#10B981");
        assert_eq!(HtmlReporter::safe_color("red;}</style>"), "#999999");
    }
}
