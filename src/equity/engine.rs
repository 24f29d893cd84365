use crate::model::{Contribution, ContributionType, ContributionWeights, Founder};

/// How one founder's weighted total was put together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityBreakdown {
    pub criteria_score: u32,
    pub contribution_score: f64,
    pub milestone_weight: f64,
    pub weighted_total: f64,
}

/// Result of a recompute pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EquityOutcome {
    /// Percentages were rewritten. `grand_total` is the shared denominator.
    Updated { grand_total: f64 },
    /// Nothing to divide by (no founders, or every weighted total is zero).
    /// Existing percentages are left as they were.
    Unchanged,
}

/// Team-wide totals shown in the score summary. Milestone weight is not applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamSummary {
    pub total_score: f64,
    pub average_score: f64,
}

/// Raw (unweighted) contribution amounts per type for one founder.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContributionTotals {
    pub cash: f64,
    pub time: f64,
    pub skills: f64,
}

impl ContributionTotals {
    pub fn get(&self, kind: ContributionType) -> f64 {
        match kind {
            ContributionType::Cash => self.cash,
            ContributionType::Time => self.time,
            ContributionType::Skills => self.skills,
        }
    }
}

/// Sum of a founder's seven criterion ratings.
pub fn criteria_score(founder: &Founder) -> u32 {
    founder.scores.total()
}

/// Sum of `amount * weight[type]` over a founder's contributions.
pub fn contribution_score(founder: &Founder, weights: &ContributionWeights) -> f64 {
    founder
        .contributions
        .iter()
        .fold(0.0, |acc, c| acc + weighted_amount(c, weights))
}

fn weighted_amount(contribution: &Contribution, weights: &ContributionWeights) -> f64 {
    contribution.amount * weights.get(contribution.kind)
}

/// Criteria and contribution scores for one founder, scaled by the milestone weight.
pub fn breakdown(
    founder: &Founder,
    weights: &ContributionWeights,
    milestone_weight: f64,
) -> EquityBreakdown {
    let criteria = criteria_score(founder);
    let contributions = contribution_score(founder, weights);
    EquityBreakdown {
        criteria_score: criteria,
        contribution_score: contributions,
        milestone_weight,
        weighted_total: (criteria as f64 + contributions) * milestone_weight,
    }
}

/// Rewrite every founder's `equity_percentage` as their share of the grand total.
///
/// When the grand total is zero (or not finite) the founders are left untouched,
/// so no NaN or infinity ever lands in a percentage. Calling this twice with the
/// same inputs gives the same result.
pub fn recompute_equity(
    founders: &mut [Founder],
    weights: &ContributionWeights,
    milestone_weight: f64,
) -> EquityOutcome {
    let totals: Vec<f64> = founders
        .iter()
        .map(|f| breakdown(f, weights, milestone_weight).weighted_total)
        .collect();
    let grand_total = totals.iter().fold(0.0, |acc, t| acc + t);

    if grand_total == 0.0 || !grand_total.is_finite() {
        tracing::debug!(founders = founders.len(), "grand total is zero, equity unchanged");
        return EquityOutcome::Unchanged;
    }

    for (founder, total) in founders.iter_mut().zip(&totals) {
        founder.equity_percentage = total / grand_total * 100.0;
    }

    tracing::debug!(founders = founders.len(), grand_total, "equity recomputed");
    EquityOutcome::Updated { grand_total }
}

/// Team total and per-founder average, as shown in the score summary.
pub fn team_summary(founders: &[Founder], weights: &ContributionWeights) -> TeamSummary {
    let total_score = founders.iter().fold(0.0, |acc, f| {
        acc + criteria_score(f) as f64 + contribution_score(f, weights)
    });
    let average_score = if founders.is_empty() {
        0.0
    } else {
        total_score / founders.len() as f64
    };
    TeamSummary {
        total_score,
        average_score,
    }
}

/// A criterion's share of its founder's criteria score, as a percentage.
pub fn criterion_share(score: u8, criteria_total: u32) -> f64 {
    if criteria_total == 0 {
        0.0
    } else {
        score as f64 / criteria_total as f64 * 100.0
    }
}

/// Raw contribution amount per type, before any weighting.
pub fn contribution_totals(founder: &Founder) -> ContributionTotals {
    let mut totals = ContributionTotals::default();
    for contribution in &founder.contributions {
        match contribution.kind {
            ContributionType::Cash => totals.cash += contribution.amount,
            ContributionType::Time => totals.time += contribution.amount,
            ContributionType::Skills => totals.skills += contribution.amount,
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Criterion, Scores};
    use chrono::Utc;

    fn sample_founder(name: &str, score: u8) -> Founder {
        Founder {
            id: name.to_lowercase(),
            name: name.to_string(),
            role: "Founder".to_string(),
            email: None,
            scores: Scores::uniform(score),
            contributions: vec![],
            equity_percentage: 0.0,
            color: "#6366F1".to_string(),
        }
    }

    fn contribution(kind: ContributionType, amount: f64) -> Contribution {
        Contribution {
            id: format!("{}-{}", kind, amount),
            kind,
            amount,
            description: String::new(),
            date: Utc::now(),
        }
    }

    #[test]
    fn test_two_equal_founders_split_evenly() {
        let mut founders = vec![sample_founder("Ada", 5), sample_founder("Grace", 5)];
        let outcome = recompute_equity(&mut founders, &ContributionWeights::default(), 1.0);

        assert_eq!(outcome, EquityOutcome::Updated { grand_total: 70.0 });
        assert_eq!(founders[0].equity_percentage, 50.0);
        assert_eq!(founders[1].equity_percentage, 50.0);
    }

    #[test]
    fn test_raising_one_criterion_shifts_share() {
        let mut founders = vec![sample_founder("Ada", 5), sample_founder("Grace", 5)];
        founders[0].scores.set(Criterion::Role, 10).unwrap();
        recompute_equity(&mut founders, &ContributionWeights::default(), 1.0);

        // 40 / 75 and 35 / 75
        assert!((founders[0].equity_percentage - 53.333333).abs() < 1e-4);
        assert!((founders[1].equity_percentage - 46.666666).abs() < 1e-4);
    }

    #[test]
    fn test_zero_total_leaves_percentages_alone() {
        let mut founders = vec![sample_founder("Ada", 0), sample_founder("Grace", 0)];
        founders[0].equity_percentage = 60.0;
        founders[1].equity_percentage = 40.0;

        let outcome = recompute_equity(&mut founders, &ContributionWeights::default(), 1.0);

        assert_eq!(outcome, EquityOutcome::Unchanged);
        assert_eq!(founders[0].equity_percentage, 60.0);
        assert_eq!(founders[1].equity_percentage, 40.0);
    }

    #[test]
    fn test_empty_founder_list() {
        let mut founders: Vec<Founder> = vec![];
        let outcome = recompute_equity(&mut founders, &ContributionWeights::default(), 1.0);
        assert_eq!(outcome, EquityOutcome::Unchanged);
    }

    #[test]
    fn test_zero_scored_founder_stays_in_denominator() {
        let mut founders = vec![sample_founder("Ada", 5), sample_founder("Idle", 0)];
        recompute_equity(&mut founders, &ContributionWeights::default(), 1.0);
        assert_eq!(founders[0].equity_percentage, 100.0);
        assert_eq!(founders[1].equity_percentage, 0.0);
    }

    #[test]
    fn test_contributions_are_weighted_by_type() {
        let mut founder = sample_founder("Ada", 0);
        founder.contributions = vec![
            contribution(ContributionType::Cash, 100.0),
            contribution(ContributionType::Time, 10.0),
            contribution(ContributionType::Skills, 4.0),
        ];
        let weights = ContributionWeights {
            cash: 0.5,
            time: 2.0,
            skills: 1.5,
        };
        assert_eq!(contribution_score(&founder, &weights), 50.0 + 20.0 + 6.0);
    }

    #[test]
    fn test_cash_contribution_wins_tie() {
        let mut founders = vec![sample_founder("Ada", 5), sample_founder("Grace", 5)];
        founders[0]
            .contributions
            .push(contribution(ContributionType::Cash, 10.0));
        recompute_equity(&mut founders, &ContributionWeights::default(), 1.0);
        assert!(founders[0].equity_percentage > founders[1].equity_percentage);
    }

    #[test]
    fn test_no_contributions_scores_positive_zero() {
        let founder = sample_founder("Ada", 5);
        let score = contribution_score(&founder, &ContributionWeights::default());
        assert_eq!(score, 0.0);
        assert!(score.is_sign_positive());

        let summary = team_summary(&[], &ContributionWeights::default());
        assert!(summary.total_score.is_sign_positive());
    }

    #[test]
    fn test_breakdown_applies_milestone_weight() {
        let mut founder = sample_founder("Ada", 5);
        founder
            .contributions
            .push(contribution(ContributionType::Time, 5.0));
        let result = breakdown(&founder, &ContributionWeights::default(), 2.0);
        assert_eq!(result.criteria_score, 35);
        assert_eq!(result.contribution_score, 5.0);
        assert_eq!(result.weighted_total, 80.0);
    }

    #[test]
    fn test_team_summary() {
        let founders = vec![sample_founder("Ada", 5), sample_founder("Grace", 4)];
        let summary = team_summary(&founders, &ContributionWeights::default());
        assert_eq!(summary.total_score, 63.0);
        assert_eq!(summary.average_score, 31.5);

        let empty = team_summary(&[], &ContributionWeights::default());
        assert_eq!(empty.average_score, 0.0);
    }

    #[test]
    fn test_criterion_share() {
        assert_eq!(criterion_share(7, 35), 20.0);
        assert_eq!(criterion_share(0, 0), 0.0);
    }

    #[test]
    fn test_contribution_totals_group_by_type() {
        let mut founder = sample_founder("Ada", 5);
        founder.contributions = vec![
            contribution(ContributionType::Cash, 1000.0),
            contribution(ContributionType::Cash, 500.0),
            contribution(ContributionType::Time, 40.0),
        ];
        let totals = contribution_totals(&founder);
        assert_eq!(totals.cash, 1500.0);
        assert_eq!(totals.get(ContributionType::Time), 40.0);
        assert_eq!(totals.skills, 0.0);
    }
}
