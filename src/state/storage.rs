use super::app_state::{positive_weight, AppState, STATE_VERSION};
use crate::model::ContributionType;
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File name of the persisted state record.
pub const STATE_FILE_NAME: &str = "equity-growth-compass.json";

/// Get the default state file path (~/.config/equity-compass/equity-growth-compass.json)
pub fn get_state_path() -> Result<PathBuf> {
    Ok(crate::config::get_config_dir()?.join(STATE_FILE_NAME))
}

/// What the loader ended up with.
#[derive(Debug)]
pub enum LoadOutcome {
    /// No file yet; a fresh default state.
    Fresh(AppState),
    /// The stored record, migrated to the current schema.
    Loaded(AppState),
    /// The stored record could not be used. Holds a full default state.
    Recovered { state: AppState, reason: String },
}

impl LoadOutcome {
    pub fn into_state(self) -> AppState {
        match self {
            LoadOutcome::Fresh(state)
            | LoadOutcome::Loaded(state)
            | LoadOutcome::Recovered { state, .. } => state,
        }
    }
}

/// Load state from a JSON file.
///
/// A missing file gives the default state. A file that cannot be read as a
/// whole (malformed JSON, missing `founders`/`milestones` arrays, or a schema
/// newer than this build) is replaced by the default state; partial data is
/// never applied. Fields added after the first release are backfilled.
pub fn load_state(path: &Path) -> Result<LoadOutcome> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no state file, starting fresh");
            return Ok(LoadOutcome::Fresh(AppState::new()));
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to read state file at {}", path.display()))
        }
    };

    Ok(match parse_state(&content) {
        Ok(state) => {
            tracing::debug!(
                path = %path.display(),
                founders = state.founders.len(),
                history = state.history.len(),
                "state loaded"
            );
            LoadOutcome::Loaded(state)
        }
        Err(e) => {
            let reason = format!("{:#}", e);
            tracing::warn!(path = %path.display(), %reason, "discarding unreadable state");
            LoadOutcome::Recovered {
                state: AppState::new(),
                reason,
            }
        }
    })
}

/// Parse and migrate a stored record.
pub fn parse_state(content: &str) -> Result<AppState> {
    let mut state: AppState =
        serde_json::from_str(content).context("State file is not a valid state record")?;

    if state.version > STATE_VERSION {
        anyhow::bail!("Unsupported state version: {}", state.version);
    }
    if state.milestones.is_empty() {
        anyhow::bail!("State file has no milestones");
    }
    for kind in ContributionType::ALL {
        positive_weight(kind.id(), state.contribution_weights.get(kind))?;
    }
    for milestone in &state.milestones {
        positive_weight(format!("milestone '{}'", milestone.id), milestone.weight)?;
    }

    migrate(&mut state);
    Ok(state)
}

/// Bring a parsed record up to the current schema. Version 0 is the
/// unversioned layout, whose missing fields serde has already defaulted.
fn migrate(state: &mut AppState) {
    if state.version < STATE_VERSION {
        tracing::info!(from = state.version, to = STATE_VERSION, "migrating state");
        state.version = STATE_VERSION;
    }

    // Keep the current flag consistent with the stored active id.
    if state.milestone(&state.current_milestone_id).is_some() {
        let active = state.current_milestone_id.clone();
        let active_completed = state.milestone(&active).map(|m| m.completed).unwrap_or(false);
        let flagged = state.milestones.iter().filter(|m| m.current).count();
        if flagged > 1 || (flagged == 0 && !active_completed) {
            for milestone in &mut state.milestones {
                milestone.current = milestone.id == active;
            }
        }
    } else if let Some(first_open) = state.milestones.iter().find(|m| !m.completed) {
        state.current_milestone_id = first_open.id.clone();
        let active = state.current_milestone_id.clone();
        for milestone in &mut state.milestones {
            milestone.current = milestone.id == active;
        }
    }

    state.recompute();
}

/// Save state to a JSON file atomically
///
/// Uses atomic-write-file to ensure the file is never left in a corrupted state.
/// Creates the parent directory if it doesn't exist.
pub fn save_state(path: &Path, state: &AppState) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, state).context("Failed to serialize state")?;

    file.commit()
        .with_context(|| format!("Failed to save state to {}", path.display()))?;

    tracing::debug!(path = %path.display(), "state saved");
    Ok(())
}

/// Delete the state file. A file that is already gone is not an error.
pub fn clear_state(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => {
            Err(e).with_context(|| format!("Failed to remove state file at {}", path.display()))
        }
    }
}
