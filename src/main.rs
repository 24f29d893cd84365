use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

use equity_compass::config::{Config, WeightRange};
use equity_compass::model::{parse_amount, ContributionType, Criterion, Scores};
use equity_compass::notice;
use equity_compass::output;
use equity_compass::report;
use equity_compass::state::{
    AppState, FounderUpdate, LoadOutcome, NewContribution, NewFounder, StateError, WeightsUpdate,
};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_USAGE: i32 = 1;
const EXIT_STORAGE: i32 = 3;
const EXIT_CONFIG: i32 = 4;
const EXIT_EXPORT: i32 = 5;

const LOG_ENV: &str = "EQUITY_COMPASS_LOG";

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the current equity split (default if no subcommand)
    Status,
    /// Add, edit, score and inspect co-founders
    #[command(subcommand)]
    Founder(FounderCommand),
    /// Record or remove cash, time and skills contributions
    #[command(subcommand)]
    Contribution(ContributionCommand),
    /// Show or change the contribution type multipliers
    #[command(subcommand)]
    Weights(WeightsCommand),
    /// Move through the milestone sequence
    #[command(subcommand)]
    Milestone(MilestoneCommand),
    /// Show the equity split recorded at each completed milestone
    History,
    /// Write a shareable report
    Export {
        /// Report format (html, json or pdf)
        format: String,
        /// Output file (defaults to equity-growth-compass-report.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Open the report in the default browser afterwards
        #[arg(long)]
        open: bool,
    },
    /// Delete all data and start over with the default milestones
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum FounderCommand {
    /// Add a co-founder (all criteria start at 5)
    Add {
        name: String,
        role: String,
        #[arg(short, long)]
        email: Option<String>,
        /// Initial score override, e.g. --score role=8 (repeatable)
        #[arg(long = "score", value_name = "CRITERION=VALUE")]
        scores: Vec<String>,
    },
    /// Edit a co-founder's name, role or email
    Edit {
        /// Index, id, id prefix or name
        founder: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long, conflicts_with = "clear_email")]
        email: Option<String>,
        #[arg(long)]
        clear_email: bool,
    },
    /// Remove a co-founder and their contributions
    Remove { founder: String },
    /// Rate a co-founder on one criterion (0-10)
    Score {
        founder: String,
        criterion: Criterion,
        value: u8,
    },
    /// Show scores, contributions and how the share was derived
    Show { founder: String },
}

#[derive(Subcommand, Debug)]
enum ContributionCommand {
    /// Record a contribution; negative or non-numeric amounts count as 0
    Add {
        founder: String,
        /// cash, time or skills
        kind: ContributionType,
        #[arg(allow_hyphen_values = true)]
        amount: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Remove a contribution by id (or id prefix)
    Remove { founder: String, contribution: String },
}

#[derive(Subcommand, Debug)]
enum WeightsCommand {
    Show,
    /// Set one or more multipliers
    Set {
        #[arg(long)]
        cash: Option<f64>,
        #[arg(long)]
        time: Option<f64>,
        #[arg(long)]
        skills: Option<f64>,
    },
}

#[derive(Subcommand, Debug)]
enum MilestoneCommand {
    List,
    /// Make a milestone current and apply its weight
    Select {
        /// Milestone id, name or 1-based index
        milestone: String,
    },
    /// Complete a milestone (defaults to the current one) and record the split
    Complete { milestone: Option<String> },
    /// Change a milestone's weight multiplier
    Weight { milestone: String, weight: f64 },
}

#[derive(Parser, Debug)]
#[command(name = "equity-compass")]
#[command(about = "Co-founder equity calculator with milestone tracking", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/equity-compass/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the state file (overrides the config file)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Failure of a single command, mapped to an exit code in `main`.
#[derive(Debug, thiserror::Error)]
enum CommandError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Usage(#[from] anyhow::Error),

    #[error("{0:#}")]
    Storage(anyhow::Error),

    #[error("{0:#}")]
    Export(anyhow::Error),
}

impl CommandError {
    fn exit_code(&self) -> i32 {
        match self {
            CommandError::State(_) | CommandError::Usage(_) => EXIT_USAGE,
            CommandError::Storage(_) => EXIT_STORAGE,
            CommandError::Export(_) => EXIT_EXPORT,
        }
    }
}

/// Whether a command changed the state and it needs saving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    None,
    Modified,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let command = cli.command.unwrap_or(Commands::Status);

    // Load and validate config
    let config = match equity_compass::config::load_config(cli.config) {
        Ok(c) => c,
        Err(e) => {
            notice::error(format!("Config error: {:#}", e));
            std::process::exit(EXIT_CONFIG);
        }
    };
    if let Err(errors) = equity_compass::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let state_path = match resolve_state_path(cli.state, &config) {
        Ok(p) => p,
        Err(e) => {
            notice::error(format!("{:#}", e));
            std::process::exit(EXIT_STORAGE);
        }
    };
    tracing::debug!(path = %state_path.display(), "using state file");

    let mut state = match equity_compass::state::load_state(&state_path) {
        Ok(LoadOutcome::Recovered { state, reason }) => {
            notice::warn(format!(
                "Could not read {} ({}). Starting from defaults.",
                state_path.display(),
                reason
            ));
            state
        }
        Ok(outcome) => outcome.into_state(),
        Err(e) => {
            notice::error(format!("{:#}", e));
            std::process::exit(EXIT_STORAGE);
        }
    };

    let use_colors = output::should_use_colors();
    let change = match run(command, &mut state, &config, &state_path, use_colors) {
        Ok(change) => change,
        Err(e) => {
            notice::error(format!("{:#}", e));
            std::process::exit(e.exit_code());
        }
    };

    if change == Change::Modified {
        if let Err(e) = equity_compass::state::save_state(&state_path, &state) {
            notice::error(format!("Changes were not saved: {:#}", e));
            std::process::exit(EXIT_STORAGE);
        }
    }

    std::process::exit(EXIT_SUCCESS);
}

/// `--state` wins over the config file, which wins over the default location.
fn resolve_state_path(flag: Option<PathBuf>, config: &Config) -> anyhow::Result<PathBuf> {
    match flag.or_else(|| config.state_path.clone()) {
        Some(path) => Ok(path),
        None => equity_compass::state::get_state_path(),
    }
}

fn run(
    command: Commands,
    state: &mut AppState,
    config: &Config,
    state_path: &Path,
    use_colors: bool,
) -> Result<Change, CommandError> {
    match command {
        Commands::Status => {
            println!("{}", output::format_equity_table(state, use_colors));
            if !state.founders.is_empty() {
                println!("{}", output::format_summary(state));
            }
            Ok(Change::None)
        }
        Commands::Founder(cmd) => run_founder(cmd, state, use_colors),
        Commands::Contribution(cmd) => run_contribution(cmd, state),
        Commands::Weights(cmd) => run_weights(cmd, state, config),
        Commands::Milestone(cmd) => run_milestone(cmd, state, config, use_colors),
        Commands::History => {
            println!(
                "{}",
                output::format_history(&state.history, chrono::Utc::now(), use_colors)
            );
            Ok(Change::None)
        }
        Commands::Export {
            format,
            output: path,
            open,
        } => {
            run_export(&format, path, open, state)?;
            Ok(Change::None)
        }
        Commands::Reset { yes } => {
            if !yes && !confirm("Delete all co-founders, contributions and history?")? {
                notice::info("Reset cancelled");
                return Ok(Change::None);
            }
            equity_compass::state::clear_state(state_path).map_err(CommandError::Storage)?;
            state.reset();
            notice::success("All data reset");
            Ok(Change::Modified)
        }
    }
}

fn founder_id(state: &AppState, query: &str) -> Result<String, StateError> {
    state
        .find_founder(query)
        .map(|f| f.id.clone())
        .ok_or_else(|| StateError::UnknownFounder(query.to_string()))
}

/// Parse "role=8" into a criterion and a score.
fn parse_score_override(input: &str) -> anyhow::Result<(Criterion, u8)> {
    let (criterion, value) = input
        .split_once('=')
        .with_context(|| format!("Invalid score '{}', expected CRITERION=VALUE", input))?;
    let criterion = Criterion::from_str(criterion.trim())?;
    let value = value
        .trim()
        .parse::<u8>()
        .with_context(|| format!("Invalid score value in '{}'", input))?;
    Ok((criterion, value))
}

fn run_founder(
    cmd: FounderCommand,
    state: &mut AppState,
    use_colors: bool,
) -> Result<Change, CommandError> {
    match cmd {
        FounderCommand::Add {
            name,
            role,
            email,
            scores,
        } => {
            let scores = if scores.is_empty() {
                None
            } else {
                let mut initial = Scores::default();
                for input in &scores {
                    let (criterion, value) = parse_score_override(input)?;
                    initial.set(criterion, value).map_err(StateError::from)?;
                }
                Some(initial)
            };
            let founder = state.add_founder(NewFounder {
                name,
                role,
                email,
                scores,
            })?;
            notice::success(format!(
                "Added {} ({})",
                founder.name,
                output::format_percent(founder.equity_percentage)
            ));
            println!("{}", output::format_equity_table(state, use_colors));
            Ok(Change::Modified)
        }
        FounderCommand::Edit {
            founder,
            name,
            role,
            email,
            clear_email,
        } => {
            let id = founder_id(state, &founder)?;
            let email = if clear_email { Some(None) } else { email.map(Some) };
            state.update_founder(&id, FounderUpdate { name, role, email })?;
            notice::success("Co-founder updated");
            Ok(Change::Modified)
        }
        FounderCommand::Remove { founder } => {
            let id = founder_id(state, &founder)?;
            let removed = state.remove_founder(&id)?;
            notice::success(format!("Removed {}", removed.name));
            println!("{}", output::format_equity_table(state, use_colors));
            Ok(Change::Modified)
        }
        FounderCommand::Score {
            founder,
            criterion,
            value,
        } => {
            let id = founder_id(state, &founder)?;
            state.set_score(&id, criterion, value)?;
            println!("{}", output::format_equity_table(state, use_colors));
            Ok(Change::Modified)
        }
        FounderCommand::Show { founder } => {
            let id = founder_id(state, &founder)?;
            if let Some(founder) = state.founder(&id) {
                println!("{}", output::format_founder_detail(founder, state, use_colors));
            }
            Ok(Change::None)
        }
    }
}

fn run_contribution(cmd: ContributionCommand, state: &mut AppState) -> Result<Change, CommandError> {
    match cmd {
        ContributionCommand::Add {
            founder,
            kind,
            amount,
            description,
        } => {
            let id = founder_id(state, &founder)?;
            let amount = parse_amount(&amount);
            let contribution = state.add_contribution(
                &id,
                NewContribution {
                    kind,
                    amount,
                    description,
                },
            )?;
            let message = format!(
                "Recorded {} ({})",
                output::format_amount(contribution.kind, contribution.amount),
                contribution.id
            );
            notice::success(message);
            Ok(Change::Modified)
        }
        ContributionCommand::Remove {
            founder,
            contribution,
        } => {
            let id = founder_id(state, &founder)?;
            let removed = state.remove_contribution(&id, &contribution)?;
            notice::success(format!(
                "Removed {} contribution",
                output::format_amount(removed.kind, removed.amount)
            ));
            Ok(Change::Modified)
        }
    }
}

fn check_bounds(what: &str, value: f64, range: &WeightRange) -> anyhow::Result<()> {
    if !range.contains(value) {
        anyhow::bail!(
            "{} weight must be between {} and {}, got {}",
            what,
            range.min,
            range.max,
            value
        );
    }
    Ok(())
}

fn run_weights(
    cmd: WeightsCommand,
    state: &mut AppState,
    config: &Config,
) -> Result<Change, CommandError> {
    match cmd {
        WeightsCommand::Show => {
            println!("{}", output::format_weights(&state.contribution_weights));
            Ok(Change::None)
        }
        WeightsCommand::Set { cash, time, skills } => {
            let update = WeightsUpdate { cash, time, skills };
            if update.is_empty() {
                return Err(anyhow::anyhow!("Nothing to set. Use --cash, --time or --skills").into());
            }
            let range = &config.bounds.contribution_weight;
            for (kind, value) in [
                (ContributionType::Cash, cash),
                (ContributionType::Time, time),
                (ContributionType::Skills, skills),
            ] {
                if let Some(value) = value {
                    check_bounds(kind.label(), value, range)?;
                }
            }
            state.update_contribution_weights(update)?;
            println!("{}", output::format_weights(&state.contribution_weights));
            Ok(Change::Modified)
        }
    }
}

/// Resolve a milestone by 1-based index, id, or case-insensitive name.
fn milestone_id(state: &AppState, query: &str) -> Result<String, StateError> {
    let query = query.trim();
    if let Ok(index) = query.parse::<usize>() {
        if let Some(milestone) = index.checked_sub(1).and_then(|i| state.milestones.get(i)) {
            return Ok(milestone.id.clone());
        }
    }
    state
        .milestones
        .iter()
        .find(|m| m.id == query || m.name.eq_ignore_ascii_case(query))
        .map(|m| m.id.clone())
        .ok_or_else(|| StateError::UnknownMilestone(query.to_string()))
}

fn run_milestone(
    cmd: MilestoneCommand,
    state: &mut AppState,
    config: &Config,
    use_colors: bool,
) -> Result<Change, CommandError> {
    match cmd {
        MilestoneCommand::List => {
            println!(
                "{}",
                output::format_milestones(&state.milestones, &state.current_milestone_id, use_colors)
            );
            Ok(Change::None)
        }
        MilestoneCommand::Select { milestone } => {
            let id = milestone_id(state, &milestone)?;
            state.select_milestone(&id, config.milestones.revisit_policy())?;
            if let Some(active) = state.active_milestone() {
                notice::success(format!(
                    "Now at {} ({})",
                    active.name,
                    output::format_weight(active.weight)
                ));
            }
            Ok(Change::Modified)
        }
        MilestoneCommand::Complete { milestone } => {
            let id = match milestone {
                Some(query) => milestone_id(state, &query)?,
                None => state.current_milestone_id.clone(),
            };
            if !state.complete_milestone(&id)? {
                notice::info(format!("Milestone '{}' is already completed", id));
                return Ok(Change::None);
            }
            if let Some(entry) = state.history.last() {
                notice::success(format!("Completed {}", entry.milestone_name));
            }
            match state.active_milestone().filter(|m| m.current) {
                Some(next) => notice::info(format!("Next milestone: {}", next.name)),
                None => notice::info("All milestones completed"),
            }
            println!("{}", output::format_equity_table(state, use_colors));
            Ok(Change::Modified)
        }
        MilestoneCommand::Weight { milestone, weight } => {
            let id = milestone_id(state, &milestone)?;
            check_bounds("Milestone", weight, &config.bounds.milestone_weight)?;
            state.update_milestone_weight(&id, weight)?;
            println!(
                "{}",
                output::format_milestones(&state.milestones, &state.current_milestone_id, use_colors)
            );
            Ok(Change::Modified)
        }
    }
}

fn run_export(
    format: &str,
    path: Option<PathBuf>,
    open: bool,
    state: &AppState,
) -> Result<(), CommandError> {
    let reporter = report::create_reporter(format).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown report format '{}'. Available: {}",
            format,
            report::available_formats().join(", ")
        )
    })?;
    let path = path.unwrap_or_else(|| PathBuf::from(report::default_file_name(reporter.as_ref())));

    report::write_report(reporter.as_ref(), state, &path).map_err(CommandError::Export)?;
    notice::success(format!("Report written to {}", path.display()));

    if open {
        report::open_report(&path).map_err(CommandError::Export)?;
    }
    Ok(())
}

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> anyhow::Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

fn confirm(question: &str) -> anyhow::Result<bool> {
    let answer = prompt(&format!("{} [y/N]: ", question))?;
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}
