pub mod app_state;
pub mod storage;

pub use app_state::{
    AppState, FounderUpdate, NewContribution, NewFounder, RevisitPolicy, StateError,
    WeightsUpdate, STATE_VERSION,
};
pub use storage::{clear_state, get_state_path, load_state, parse_state, save_state, LoadOutcome};
