use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ModelError;

/// Highest score a criterion can take.
pub const MAX_SCORE: u8 = 10;

/// Score every criterion starts at for a newly added founder.
pub const DEFAULT_SCORE: u8 = 5;

/// The seven qualitative criteria every founder is rated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Criterion {
    Role,
    Usefulness,
    IdeaContribution,
    BusinessPlan,
    Expertise,
    Commitment,
    Operations,
}

impl Criterion {
    /// All criteria in display order.
    pub const ALL: [Criterion; 7] = [
        Criterion::Role,
        Criterion::Usefulness,
        Criterion::IdeaContribution,
        Criterion::BusinessPlan,
        Criterion::Expertise,
        Criterion::Commitment,
        Criterion::Operations,
    ];

    /// Stable identifier, as stored on disk.
    pub fn id(self) -> &'static str {
        match self {
            Criterion::Role => "role",
            Criterion::Usefulness => "usefulness",
            Criterion::IdeaContribution => "ideaContribution",
            Criterion::BusinessPlan => "businessPlan",
            Criterion::Expertise => "expertise",
            Criterion::Commitment => "commitment",
            Criterion::Operations => "operations",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Criterion::Role => "Role in Project",
            Criterion::Usefulness => "Usefulness to Project",
            Criterion::IdeaContribution => "Idea Contribution",
            Criterion::BusinessPlan => "Business Plan Development",
            Criterion::Expertise => "Domain Expertise",
            Criterion::Commitment => "Personal Commitment & Risk",
            Criterion::Operations => "Operational Responsibilities",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Criterion::Role => {
                "Functions taken on from the beginning (e.g., tech, product, business)"
            }
            Criterion::Usefulness => "Tangible impact on project progress",
            Criterion::IdeaContribution => "Who proposed the original concept",
            Criterion::BusinessPlan => "Who structured the vision and strategy",
            Criterion::Expertise => "Industry knowledge, network, credibility",
            Criterion::Commitment => "Time invested, financial or professional risks taken",
            Criterion::Operations => "Day-to-day execution roles",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Criterion {
    type Err = ModelError;

    /// Accepts the stored id in any case, plus kebab-case and snake_case spellings
    /// ("idea-contribution", "business_plan").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();

        Criterion::ALL
            .into_iter()
            .find(|c| c.id().to_lowercase() == normalized)
            .ok_or_else(|| ModelError::UnknownCriterion(s.to_string()))
    }
}

/// A founder's ratings, one `0..=10` value per criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scores {
    #[serde(deserialize_with = "lenient_score")]
    pub role: u8,
    #[serde(deserialize_with = "lenient_score")]
    pub usefulness: u8,
    #[serde(deserialize_with = "lenient_score")]
    pub idea_contribution: u8,
    #[serde(deserialize_with = "lenient_score")]
    pub business_plan: u8,
    #[serde(deserialize_with = "lenient_score")]
    pub expertise: u8,
    #[serde(deserialize_with = "lenient_score")]
    pub commitment: u8,
    #[serde(deserialize_with = "lenient_score")]
    pub operations: u8,
}

impl Default for Scores {
    fn default() -> Self {
        Self::uniform(DEFAULT_SCORE)
    }
}

impl Scores {
    /// Every criterion set to the same value (not range-checked).
    pub fn uniform(value: u8) -> Self {
        Self {
            role: value,
            usefulness: value,
            idea_contribution: value,
            business_plan: value,
            expertise: value,
            commitment: value,
            operations: value,
        }
    }

    pub fn get(&self, criterion: Criterion) -> u8 {
        match criterion {
            Criterion::Role => self.role,
            Criterion::Usefulness => self.usefulness,
            Criterion::IdeaContribution => self.idea_contribution,
            Criterion::BusinessPlan => self.business_plan,
            Criterion::Expertise => self.expertise,
            Criterion::Commitment => self.commitment,
            Criterion::Operations => self.operations,
        }
    }

    /// Set one criterion. Values above [`MAX_SCORE`] are rejected.
    pub fn set(&mut self, criterion: Criterion, value: u8) -> Result<(), ModelError> {
        if value > MAX_SCORE {
            return Err(ModelError::ScoreOutOfRange { criterion, value });
        }
        let slot = match criterion {
            Criterion::Role => &mut self.role,
            Criterion::Usefulness => &mut self.usefulness,
            Criterion::IdeaContribution => &mut self.idea_contribution,
            Criterion::BusinessPlan => &mut self.business_plan,
            Criterion::Expertise => &mut self.expertise,
            Criterion::Commitment => &mut self.commitment,
            Criterion::Operations => &mut self.operations,
        };
        *slot = value;
        Ok(())
    }

    /// Criteria score: the sum of all seven ratings (0..=70).
    pub fn total(&self) -> u32 {
        Criterion::ALL.iter().map(|c| self.get(*c) as u32).sum()
    }

    /// Iterate `(criterion, score)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Criterion, u8)> + '_ {
        Criterion::ALL.iter().map(move |c| (*c, self.get(*c)))
    }
}

/// Stored scores come from sliders and hand edits alike: accept any JSON number,
/// round it, and clamp into `0..=10`.
fn lenient_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() {
        return Ok(0);
    }
    Ok(raw.round().clamp(0.0, MAX_SCORE as f64) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scores_are_mid_scale() {
        let scores = Scores::default();
        assert!(scores.iter().all(|(_, v)| v == 5));
        assert_eq!(scores.total(), 35);
    }

    #[test]
    fn test_set_and_get() {
        let mut scores = Scores::default();
        scores.set(Criterion::Role, 10).unwrap();
        assert_eq!(scores.get(Criterion::Role), 10);
        assert_eq!(scores.total(), 40);
    }

    #[test]
    fn test_set_rejects_out_of_range() {
        let mut scores = Scores::default();
        let err = scores.set(Criterion::Expertise, 11).unwrap_err();
        assert!(matches!(
            err,
            ModelError::ScoreOutOfRange { criterion: Criterion::Expertise, value: 11 }
        ));
        assert_eq!(scores.get(Criterion::Expertise), 5);
    }

    #[test]
    fn test_deserialize_clamps_and_rounds() {
        let json = r#"{"role":42,"usefulness":4.6,"ideaContribution":-3,"businessPlan":5,
            "expertise":5,"commitment":5,"operations":5}"#;
        let scores: Scores = serde_json::from_str(json).unwrap();
        assert_eq!(scores.role, 10);
        assert_eq!(scores.usefulness, 5);
        assert_eq!(scores.idea_contribution, 0);
    }

    #[test]
    fn test_parse_criterion_spellings() {
        assert_eq!("role".parse::<Criterion>().unwrap(), Criterion::Role);
        assert_eq!(
            "ideaContribution".parse::<Criterion>().unwrap(),
            Criterion::IdeaContribution
        );
        assert_eq!(
            "idea-contribution".parse::<Criterion>().unwrap(),
            Criterion::IdeaContribution
        );
        assert_eq!(
            "BUSINESS_PLAN".parse::<Criterion>().unwrap(),
            Criterion::BusinessPlan
        );
        assert!("charisma".parse::<Criterion>().is_err());
    }

    #[test]
    fn test_scores_serialize_with_stored_ids() {
        let json = serde_json::to_value(Scores::default()).unwrap();
        for criterion in Criterion::ALL {
            assert_eq!(json[criterion.id()], 5);
        }
    }
}
