use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::equity::{recompute_equity, EquityOutcome};
use crate::model::{
    color_for_index, default_milestones, sanitize_amount, Contribution, ContributionType,
    ContributionWeights, Criterion, Founder, HistoryEntry, Milestone, ModelError, Scores,
    INITIAL_MILESTONE_ID,
};

/// Schema version written by this build.
pub const STATE_VERSION: u32 = 1;

#[derive(Debug, Error, PartialEq)]
pub enum StateError {
    #[error("no co-founder matches '{0}'")]
    UnknownFounder(String),

    #[error("no contribution '{contribution}' for {founder}")]
    UnknownContribution { founder: String, contribution: String },

    #[error("no milestone with id '{0}'")]
    UnknownMilestone(String),

    #[error("milestone '{0}' is already completed and revisiting is disabled")]
    MilestoneCompleted(String),

    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("{what} weight must be a positive number, got {value}")]
    InvalidWeight { what: String, value: f64 },

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Whether a completed milestone may be made current again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevisitPolicy {
    #[default]
    Allow,
    Reject,
}

/// Input for a new co-founder. Scores default to mid-scale.
#[derive(Debug, Clone, Default)]
pub struct NewFounder {
    pub name: String,
    pub role: String,
    pub email: Option<String>,
    pub scores: Option<Scores>,
}

#[derive(Debug, Clone, Default)]
pub struct FounderUpdate {
    pub name: Option<String>,
    pub role: Option<String>,
    /// `Some(None)` clears the email.
    pub email: Option<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct NewContribution {
    pub kind: ContributionType,
    pub amount: f64,
    pub description: String,
}

/// Partial update of the contribution weights. `None` keeps the current value.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightsUpdate {
    pub cash: Option<f64>,
    pub time: Option<f64>,
    pub skills: Option<f64>,
}

impl WeightsUpdate {
    pub fn is_empty(&self) -> bool {
        self.cash.is_none() && self.time.is_none() && self.skills.is_none()
    }

    fn entries(&self) -> impl Iterator<Item = (ContributionType, f64)> {
        [
            (ContributionType::Cash, self.cash),
            (ContributionType::Time, self.time),
            (ContributionType::Skills, self.skills),
        ]
        .into_iter()
        .filter_map(|(kind, weight)| weight.map(|w| (kind, w)))
    }
}

/// The aggregate root: founders, milestones, weights and the history log.
///
/// Every mutator recomputes equity before returning, so the stored
/// percentages always match the current inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub version: u32,
    pub founders: Vec<Founder>,
    pub milestones: Vec<Milestone>,
    #[serde(default = "initial_milestone_id")]
    pub current_milestone_id: String,
    #[serde(default)]
    pub contribution_weights: ContributionWeights,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// Exact id, or an id prefix of 4+ chars that matches exactly one contribution.
fn contribution_index(contributions: &[Contribution], query: &str) -> Option<usize> {
    let query = query.trim();
    if let Some(index) = contributions.iter().position(|c| c.id == query) {
        return Some(index);
    }
    if query.len() < 4 {
        return None;
    }
    let mut prefixed = contributions
        .iter()
        .enumerate()
        .filter(|(_, c)| c.id.starts_with(query));
    match (prefixed.next(), prefixed.next()) {
        (Some((index, _)), None) => Some(index),
        _ => None,
    }
}

fn initial_milestone_id() -> String {
    INITIAL_MILESTONE_ID.to_string()
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn positive_weight(what: impl Into<String>, value: f64) -> Result<f64, StateError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(StateError::InvalidWeight {
            what: what.into(),
            value,
        })
    }
}

fn required(field: &'static str, value: &str) -> Result<String, StateError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(StateError::MissingField { field })
    } else {
        Ok(trimmed.to_string())
    }
}

impl AppState {
    /// Fresh state: no founders, default milestones, unit weights, empty history.
    pub fn new() -> Self {
        Self {
            version: STATE_VERSION,
            founders: Vec::new(),
            milestones: default_milestones(),
            current_milestone_id: initial_milestone_id(),
            contribution_weights: ContributionWeights::default(),
            history: Vec::new(),
        }
    }

    /// Restore every default, dropping founders and history.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn active_milestone(&self) -> Option<&Milestone> {
        self.milestone(&self.current_milestone_id)
    }

    /// Weight of the active milestone, 1.0 when the id points nowhere.
    pub fn active_milestone_weight(&self) -> f64 {
        self.active_milestone().map(|m| m.weight).unwrap_or(1.0)
    }

    pub fn milestone(&self, id: &str) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.id == id)
    }

    pub fn founder(&self, id: &str) -> Option<&Founder> {
        self.founders.iter().find(|f| f.id == id)
    }

    /// Resolve a founder from user input: 1-based index, exact id, id prefix
    /// (4+ chars), or case-insensitive name, tried in that order.
    pub fn find_founder(&self, query: &str) -> Option<&Founder> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        if let Ok(index) = query.parse::<usize>() {
            if index >= 1 && index <= self.founders.len() {
                return self.founders.get(index - 1);
            }
        }
        if let Some(founder) = self.founder(query) {
            return Some(founder);
        }
        if query.len() >= 4 {
            let mut prefixed = self.founders.iter().filter(|f| f.id.starts_with(query));
            if let (Some(founder), None) = (prefixed.next(), prefixed.next()) {
                return Some(founder);
            }
        }
        self.founders
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(query))
    }

    /// Recompute every founder's share with the active milestone weight.
    pub fn recompute(&mut self) -> EquityOutcome {
        let milestone_weight = self.active_milestone_weight();
        recompute_equity(&mut self.founders, &self.contribution_weights, milestone_weight)
    }

    fn founder_mut(&mut self, id: &str) -> Result<&mut Founder, StateError> {
        self.founders
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| StateError::UnknownFounder(id.to_string()))
    }

    pub fn add_founder(&mut self, new: NewFounder) -> Result<&Founder, StateError> {
        let name = required("name", &new.name)?;
        let role = required("role", &new.role)?;
        let founder = Founder {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            role,
            email: new.email.filter(|e| !e.trim().is_empty()),
            scores: new.scores.unwrap_or_default(),
            contributions: Vec::new(),
            equity_percentage: 0.0,
            color: color_for_index(self.founders.len()).to_string(),
        };
        tracing::info!(founder = %founder.name, "adding co-founder");
        self.founders.push(founder);
        self.recompute();
        Ok(&self.founders[self.founders.len() - 1])
    }

    pub fn update_founder(&mut self, id: &str, update: FounderUpdate) -> Result<(), StateError> {
        let name = update.name.as_deref().map(|n| required("name", n)).transpose()?;
        let role = update.role.as_deref().map(|r| required("role", r)).transpose()?;

        let founder = self.founder_mut(id)?;
        if let Some(name) = name {
            founder.name = name;
        }
        if let Some(role) = role {
            founder.role = role;
        }
        if let Some(email) = update.email {
            founder.email = email.filter(|e| !e.trim().is_empty());
        }
        self.recompute();
        Ok(())
    }

    pub fn set_score(
        &mut self,
        id: &str,
        criterion: Criterion,
        value: u8,
    ) -> Result<(), StateError> {
        self.founder_mut(id)?.scores.set(criterion, value)?;
        self.recompute();
        Ok(())
    }

    pub fn remove_founder(&mut self, id: &str) -> Result<Founder, StateError> {
        let index = self
            .founders
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| StateError::UnknownFounder(id.to_string()))?;
        let removed = self.founders.remove(index);
        tracing::info!(founder = %removed.name, "removed co-founder");
        self.recompute();
        Ok(removed)
    }

    pub fn add_contribution(
        &mut self,
        founder_id: &str,
        new: NewContribution,
    ) -> Result<&Contribution, StateError> {
        let contribution = Contribution {
            id: uuid::Uuid::new_v4().to_string(),
            kind: new.kind,
            amount: sanitize_amount(new.amount),
            description: new.description.trim().to_string(),
            date: Utc::now(),
        };
        let contribution_id = contribution.id.clone();
        self.founder_mut(founder_id)?.contributions.push(contribution);
        self.recompute();

        self.founder(founder_id)
            .and_then(|f| f.contribution(&contribution_id))
            .ok_or_else(|| StateError::UnknownFounder(founder_id.to_string()))
    }

    pub fn remove_contribution(
        &mut self,
        founder_id: &str,
        contribution_id: &str,
    ) -> Result<Contribution, StateError> {
        let founder = self.founder_mut(founder_id)?;
        let index = contribution_index(&founder.contributions, contribution_id).ok_or_else(|| {
            StateError::UnknownContribution {
                founder: founder.name.clone(),
                contribution: contribution_id.to_string(),
            }
        })?;
        let removed = founder.contributions.remove(index);
        self.recompute();
        Ok(removed)
    }

    /// Apply a partial weight update. Either every given weight is valid and
    /// applied, or nothing changes.
    pub fn update_contribution_weights(&mut self, update: WeightsUpdate) -> Result<(), StateError> {
        let mut weights = self.contribution_weights;
        for (kind, value) in update.entries() {
            weights.set(kind, positive_weight(kind.id(), value)?);
        }
        self.contribution_weights = weights;
        self.recompute();
        Ok(())
    }

    /// Make `id` the current milestone and apply its weight.
    pub fn select_milestone(&mut self, id: &str, policy: RevisitPolicy) -> Result<(), StateError> {
        let target = self
            .milestone(id)
            .ok_or_else(|| StateError::UnknownMilestone(id.to_string()))?;
        if target.completed && policy == RevisitPolicy::Reject {
            return Err(StateError::MilestoneCompleted(id.to_string()));
        }

        for milestone in &mut self.milestones {
            milestone.current = milestone.id == id;
        }
        self.current_milestone_id = id.to_string();
        tracing::info!(milestone = id, "milestone selected");
        self.recompute();
        Ok(())
    }

    /// Complete `id`, snapshot the split into history, and advance to the next
    /// milestone if there is one.
    ///
    /// Returns `Ok(false)` without touching anything when the milestone is
    /// already completed.
    pub fn complete_milestone(&mut self, id: &str) -> Result<bool, StateError> {
        let index = self
            .milestones
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| StateError::UnknownMilestone(id.to_string()))?;
        if self.milestones[index].completed {
            tracing::debug!(milestone = id, "already completed, ignoring");
            return Ok(false);
        }

        self.recompute();
        let entry = HistoryEntry::snapshot(&self.milestones[index], &self.founders);
        self.history.push(entry);

        self.milestones[index].completed = true;
        self.milestones[index].current = false;

        // The next milestone takes over from whichever one was active.
        if let Some(next_id) = self.milestones.get(index + 1).map(|m| m.id.clone()) {
            for milestone in &mut self.milestones {
                milestone.current = milestone.id == next_id;
            }
            self.current_milestone_id = next_id;
        }
        tracing::info!(
            milestone = id,
            active = %self.current_milestone_id,
            "milestone completed"
        );
        self.recompute();
        Ok(true)
    }

    pub fn update_milestone_weight(&mut self, id: &str, weight: f64) -> Result<(), StateError> {
        let weight = positive_weight(format!("milestone '{}'", id), weight)?;
        let milestone = self
            .milestones
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| StateError::UnknownMilestone(id.to_string()))?;
        milestone.weight = weight;

        if self.current_milestone_id == id {
            self.recompute();
        }
        Ok(())
    }

    /// Total of all equity percentages (about 100 once anyone has a score).
    pub fn equity_sum(&self) -> f64 {
        self.founders
            .iter()
            .fold(0.0, |acc, f| acc + f.equity_percentage)
    }
}
