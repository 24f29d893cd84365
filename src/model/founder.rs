use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::criteria::Scores;
use super::ModelError;

/// Display colors, handed out by insertion order and cycling after the last one.
pub const FOUNDER_COLORS: [&str; 8] = [
    "#6366F1", // Indigo
    "#8B5CF6", // Violet
    "#EC4899", // Pink
    "#F43F5E", // Rose
    "#F97316", // Orange
    "#10B981", // Emerald
    "#06B6D4", // Cyan
    "#3B82F6", // Blue
];

/// Color for the founder inserted at position `index`.
pub fn color_for_index(index: usize) -> &'static str {
    FOUNDER_COLORS[index % FOUNDER_COLORS.len()]
}

/// A co-founder and everything needed to derive their share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Founder {
    pub id: String,
    pub name: String,
    pub role: String,
    #[serde(default, deserialize_with = "optional_email")]
    pub email: Option<String>,
    #[serde(default)]
    pub scores: Scores,
    #[serde(default, deserialize_with = "contributions_or_legacy_totals")]
    pub contributions: Vec<Contribution>,
    /// Derived by the equity engine. Persisted so reports and history can show it.
    #[serde(default)]
    pub equity_percentage: f64,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    FOUNDER_COLORS[0].to_string()
}

impl Founder {
    pub fn contribution(&self, id: &str) -> Option<&Contribution> {
        self.contributions.iter().find(|c| c.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributionType {
    Cash,
    Time,
    Skills,
}

impl ContributionType {
    pub const ALL: [ContributionType; 3] = [
        ContributionType::Cash,
        ContributionType::Time,
        ContributionType::Skills,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ContributionType::Cash => "cash",
            ContributionType::Time => "time",
            ContributionType::Skills => "skills",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ContributionType::Cash => "Cash Investment",
            ContributionType::Time => "Time Contribution",
            ContributionType::Skills => "Skills/Resources",
        }
    }

    /// Short capitalized name used for badges ("Cash", "Time", "Skills").
    pub fn badge(self) -> &'static str {
        match self {
            ContributionType::Cash => "Cash",
            ContributionType::Time => "Time",
            ContributionType::Skills => "Skills",
        }
    }
}

impl fmt::Display for ContributionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ContributionType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(ContributionType::Cash),
            "time" => Ok(ContributionType::Time),
            "skills" | "skill" => Ok(ContributionType::Skills),
            _ => Err(ModelError::UnknownContributionType(s.to_string())),
        }
    }
}

/// A logged cash/time/skills input owned by one founder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ContributionType,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    pub date: DateTime<Utc>,
}

/// Clamp a raw contribution amount at the input boundary: anything negative,
/// NaN or infinite becomes zero.
pub fn sanitize_amount(raw: f64) -> f64 {
    if raw.is_finite() && raw > 0.0 {
        raw
    } else {
        0.0
    }
}

/// Parse a user-typed amount, treating anything non-numeric as zero.
pub fn parse_amount(input: &str) -> f64 {
    input.trim().parse::<f64>().map(sanitize_amount).unwrap_or(0.0)
}

/// Process-wide multiplier per contribution type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContributionWeights {
    #[serde(default = "unit_weight")]
    pub cash: f64,
    #[serde(default = "unit_weight")]
    pub time: f64,
    #[serde(default = "unit_weight")]
    pub skills: f64,
}

fn unit_weight() -> f64 {
    1.0
}

impl Default for ContributionWeights {
    fn default() -> Self {
        Self {
            cash: 1.0,
            time: 1.0,
            skills: 1.0,
        }
    }
}

impl ContributionWeights {
    pub fn get(&self, kind: ContributionType) -> f64 {
        match kind {
            ContributionType::Cash => self.cash,
            ContributionType::Time => self.time,
            ContributionType::Skills => self.skills,
        }
    }

    pub fn set(&mut self, kind: ContributionType, weight: f64) {
        match kind {
            ContributionType::Cash => self.cash = weight,
            ContributionType::Time => self.time = weight,
            ContributionType::Skills => self.skills = weight,
        }
    }
}

/// Email was stored as a plain string, empty when not given.
fn optional_email<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|e| !e.trim().is_empty()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredContributions {
    Ledger(Vec<Contribution>),
    Totals(LegacyTotals),
}

/// Early records kept one running total per type instead of a ledger.
#[derive(Deserialize)]
struct LegacyTotals {
    #[serde(default)]
    cash: f64,
    #[serde(default)]
    time: f64,
    #[serde(default)]
    skills: f64,
}

pub(crate) const MIGRATED_DESCRIPTION: &str = "Migrated total";

fn contributions_or_legacy_totals<'de, D>(deserializer: D) -> Result<Vec<Contribution>, D::Error>
where
    D: Deserializer<'de>,
{
    let stored: Option<StoredContributions> = Option::deserialize(deserializer)?;
    let contributions = match stored {
        None => Vec::new(),
        Some(StoredContributions::Ledger(mut ledger)) => {
            for contribution in &mut ledger {
                contribution.amount = sanitize_amount(contribution.amount);
            }
            ledger
        }
        Some(StoredContributions::Totals(totals)) => {
            let migrated_at = Utc::now();
            [
                (ContributionType::Cash, totals.cash),
                (ContributionType::Time, totals.time),
                (ContributionType::Skills, totals.skills),
            ]
            .into_iter()
            .map(|(kind, amount)| (kind, sanitize_amount(amount)))
            .filter(|(_, amount)| *amount > 0.0)
            .map(|(kind, amount)| Contribution {
                id: uuid::Uuid::new_v4().to_string(),
                kind,
                amount,
                description: MIGRATED_DESCRIPTION.to_string(),
                date: migrated_at,
            })
            .collect()
        }
    };
    Ok(contributions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_cycles_through_palette() {
        assert_eq!(color_for_index(0), "#6366F1");
        assert_eq!(color_for_index(7), "#3B82F6");
        assert_eq!(color_for_index(8), "#6366F1");
    }

    #[test]
    fn test_sanitize_amount() {
        assert_eq!(sanitize_amount(250.0), 250.0);
        assert_eq!(sanitize_amount(-10.0), 0.0);
        assert_eq!(sanitize_amount(f64::NAN), 0.0);
        assert_eq!(sanitize_amount(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_parse_amount_non_numeric_is_zero() {
        assert_eq!(parse_amount("1500"), 1500.0);
        assert_eq!(parse_amount(" 12.5 "), 12.5);
        assert_eq!(parse_amount("lots"), 0.0);
        assert_eq!(parse_amount("-40"), 0.0);
    }

    #[test]
    fn test_parse_contribution_type() {
        assert_eq!("Cash".parse::<ContributionType>().unwrap(), ContributionType::Cash);
        assert_eq!("skill".parse::<ContributionType>().unwrap(), ContributionType::Skills);
        assert!("equity".parse::<ContributionType>().is_err());
    }

    #[test]
    fn test_weights_get_set() {
        let mut weights = ContributionWeights::default();
        weights.set(ContributionType::Time, 2.5);
        assert_eq!(weights.get(ContributionType::Time), 2.5);
        assert_eq!(weights.get(ContributionType::Cash), 1.0);
    }

    #[test]
    fn test_founder_without_contributions_field() {
        let json = r##"{
            "id": "1700000000000",
            "name": "Ada",
            "role": "CTO",
            "email": "",
            "scores": {"role":5,"usefulness":5,"ideaContribution":5,"businessPlan":5,
                       "expertise":5,"commitment":5,"operations":5},
            "equityPercentage": 100,
            "color": "#6366F1"
        }"##;
        let founder: Founder = serde_json::from_str(json).unwrap();
        assert!(founder.contributions.is_empty());
        assert!(founder.email.is_none());
        assert_eq!(founder.equity_percentage, 100.0);
    }

    #[test]
    fn test_founder_with_legacy_totals() {
        let json = r##"{
            "id": "1",
            "name": "Grace",
            "role": "CEO",
            "scores": {"role":5,"usefulness":5,"ideaContribution":5,"businessPlan":5,
                       "expertise":5,"commitment":5,"operations":5},
            "contributions": {"cash": 5000, "time": 0, "skills": 3},
            "equityPercentage": 0,
            "color": "#8B5CF6"
        }"##;
        let founder: Founder = serde_json::from_str(json).unwrap();
        assert_eq!(founder.contributions.len(), 2);
        assert_eq!(founder.contributions[0].kind, ContributionType::Cash);
        assert_eq!(founder.contributions[0].amount, 5000.0);
        assert_eq!(founder.contributions[1].kind, ContributionType::Skills);
        assert_eq!(founder.contributions[1].description, MIGRATED_DESCRIPTION);
    }

    #[test]
    fn test_contribution_ledger_parses_type_field() {
        let json = r#"[{"id":"c1","type":"time","amount":-4,"description":"nights","date":"2024-03-01T10:00:00Z"}]"#;
        let ledger: Vec<Contribution> = serde_json::from_str(json).unwrap();
        assert_eq!(ledger[0].kind, ContributionType::Time);
        // Raw parse keeps the value; sanitizing happens in the founder loader.
        assert_eq!(ledger[0].amount, -4.0);
    }
}
