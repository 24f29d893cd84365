use chrono::Duration;
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::equity::{breakdown, contribution_totals, criterion_share, team_summary};
use crate::model::{ContributionType, ContributionWeights, Founder, HistoryEntry, Milestone, MilestoneStatus};
use crate::state::AppState;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Parse a palette hex color ("#6366F1") into RGB.
pub(crate) fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Paint text in a founder's display color (falls back to bold when the
/// stored color is not a hex code).
fn paint(text: &str, color: &str, use_colors: bool) -> String {
    if !use_colors {
        return text.to_string();
    }
    match parse_hex(color) {
        Some((r, g, b)) => text.truecolor(r, g, b).bold().to_string(),
        None => text.bold().to_string(),
    }
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Pad text to a display width by characters, not bytes
fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - len))
    }
}

/// Format a percentage with two decimals ("53.33%")
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

/// Insert thousands separators into the integer part ("12500.5" -> "12,500.5")
pub fn group_thousands(value: f64) -> String {
    // -0.0 prints as "-0"
    let value = if value == 0.0 { 0.0 } else { value };
    let rendered = if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    };
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (rendered, None),
    };
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(d) => ("-", d.to_string()),
        None => ("", int_part),
    };

    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// Format a contribution amount with the unit of its type:
/// "$5,000", "40 hours", "3 units"
pub fn format_amount(kind: ContributionType, amount: f64) -> String {
    let number = group_thousands(amount);
    match kind {
        ContributionType::Cash => format!("${}", number),
        ContributionType::Time => format!("{} hours", number),
        ContributionType::Skills => format!("{} units", number),
    }
}

/// Format a multiplier ("1.5x")
pub fn format_weight(weight: f64) -> String {
    format!("{:.1}x", weight)
}

/// Format a duration into a human-readable age string
/// "2h" for hours, "3d" for days, "1w" for weeks
pub fn format_age(duration: Duration) -> String {
    let hours = duration.num_hours();
    let days = duration.num_days();
    let weeks = days / 7;

    if weeks >= 1 {
        format!("{}w", weeks)
    } else if days >= 1 {
        format!("{}d", days)
    } else if hours >= 1 {
        format!("{}h", hours)
    } else {
        let minutes = duration.num_minutes();
        if minutes >= 1 {
            format!("{}m", minutes)
        } else {
            "now".to_string()
        }
    }
}

/// Proportional bar for an equity share. `width` cells represent 100%.
fn equity_bar(percentage: f64, width: usize) -> String {
    let filled = ((percentage.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled.min(width)))
}

/// Format the current split: index, name, role, equity and a bar.
/// Index column: 3 chars (fits "99."), right-aligned
pub fn format_equity_table(state: &AppState, use_colors: bool) -> String {
    if state.founders.is_empty() {
        return "No co-founders yet. Add one with `equity-compass founder add`.".to_string();
    }

    let name_width = state
        .founders
        .iter()
        .map(|f| f.name.chars().count())
        .max()
        .unwrap_or(0)
        .min(24);
    let role_width = state
        .founders
        .iter()
        .map(|f| f.role.chars().count())
        .max()
        .unwrap_or(0)
        .min(20);
    let separator = "  ";

    // index + name + role + "100.00%" + separators
    let fixed_width = 3 + 1 + name_width + role_width + 7 + separator.len() * 3;
    let bar_width = match get_terminal_width() {
        Some(width) if width > fixed_width + 10 => (width - fixed_width).min(40),
        Some(_) => 10,
        None => 20,
    };

    let mut lines: Vec<String> = state
        .founders
        .iter()
        .enumerate()
        .map(|(idx, founder)| {
            let index_str = format!("{:>2}.", idx + 1);
            let name = pad(&truncate(&founder.name, name_width), name_width);
            let role = pad(&truncate(&founder.role, role_width), role_width);
            let equity = format!("{:>7}", format_percent(founder.equity_percentage));
            let bar = equity_bar(founder.equity_percentage, bar_width);

            if use_colors {
                format!(
                    "{} {}{}{}{}{}{}{}",
                    index_str.dimmed(),
                    paint(&name, &founder.color, true),
                    separator,
                    role.dimmed(),
                    separator,
                    equity.bold(),
                    separator,
                    paint(&bar, &founder.color, true)
                )
            } else {
                format!(
                    "{} {}{}{}{}{}{}{}",
                    index_str, name, separator, role, separator, equity, separator, bar
                )
            }
        })
        .collect();

    let milestone = state
        .active_milestone()
        .map(|m| format!("{} ({})", m.name, format_weight(m.weight)))
        .unwrap_or_else(|| "none".to_string());
    let footer = format!("Milestone: {}", milestone);
    lines.push(String::new());
    lines.push(if use_colors {
        footer.dimmed().to_string()
    } else {
        footer
    });

    lines.join("\n")
}

/// Format one founder with scores, contributions and how the share was derived
pub fn format_founder_detail(founder: &Founder, state: &AppState, use_colors: bool) -> String {
    let detail = breakdown(
        founder,
        &state.contribution_weights,
        state.active_milestone_weight(),
    );
    let mut lines = Vec::new();

    let heading = format!("{} - {}", founder.name, founder.role);
    lines.push(paint(&heading, &founder.color, use_colors));
    lines.push(format!("  Id: {}", founder.id));
    if let Some(ref email) = founder.email {
        lines.push(format!("  Email: {}", email));
    }
    lines.push(format!("  Equity: {}", format_percent(founder.equity_percentage)));
    lines.push(String::new());

    lines.push("  Criteria:".to_string());
    for (criterion, score) in founder.scores.iter() {
        lines.push(format!(
            "    {:<30} {:>2}/10  {:>5.1}%",
            criterion.label(),
            score,
            criterion_share(score, detail.criteria_score)
        ));
    }
    lines.push(format!("    {:<30} {:>2}/70", "Total", detail.criteria_score));

    if !founder.contributions.is_empty() {
        lines.push(String::new());
        lines.push("  Contributions:".to_string());
        for contribution in &founder.contributions {
            let short_id: String = contribution.id.chars().take(8).collect();
            lines.push(format!(
                "    {}  {:<7} {:>14}  {}  {}",
                if use_colors {
                    short_id.dimmed().to_string()
                } else {
                    short_id
                },
                contribution.kind.badge(),
                format_amount(contribution.kind, contribution.amount),
                contribution.date.format("%Y-%m-%d"),
                contribution.description
            ));
        }
        let totals = contribution_totals(founder);
        let parts: Vec<String> = ContributionType::ALL
            .into_iter()
            .filter(|kind| totals.get(*kind) > 0.0)
            .map(|kind| format_amount(kind, totals.get(kind)))
            .collect();
        lines.push(format!("    Totals: {}", parts.join(", ")));
    }

    lines.push(String::new());
    lines.push(format!(
        "  Weighted total: ({} + {}) x {} = {}",
        detail.criteria_score,
        group_thousands(detail.contribution_score),
        format_weight(detail.milestone_weight),
        group_thousands(detail.weighted_total)
    ));

    lines.join("\n")
}

/// Format the milestone sequence with status and weight
pub fn format_milestones(milestones: &[Milestone], active_id: &str, use_colors: bool) -> String {
    milestones
        .iter()
        .enumerate()
        .map(|(idx, milestone)| {
            let status = milestone.status();
            let marker = if milestone.id == active_id { ">" } else { " " };
            let status_str = format!("{:<11}", status.label());
            let status_str = if use_colors {
                match status {
                    MilestoneStatus::Completed => status_str.green().to_string(),
                    MilestoneStatus::InProgress => status_str.blue().to_string(),
                    MilestoneStatus::Pending => status_str.dimmed().to_string(),
                }
            } else {
                status_str
            };
            format!(
                "{}{:>2}. {:<26} {}  {:>5}  {}",
                marker,
                idx + 1,
                milestone.name,
                status_str,
                format_weight(milestone.weight),
                milestone.id
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format the history log, one block per completed milestone
pub fn format_history(history: &[HistoryEntry], now: chrono::DateTime<chrono::Utc>, use_colors: bool) -> String {
    if history.is_empty() {
        return "No milestones completed yet.".to_string();
    }

    history
        .iter()
        .map(|entry| {
            let heading = format!(
                "{} - {} ({} ago)",
                entry.milestone_name,
                entry.date.format("%Y-%m-%d"),
                format_age(now - entry.date)
            );
            let heading = if use_colors {
                heading.bold().to_string()
            } else {
                heading
            };
            let founders: Vec<String> = entry
                .founders
                .iter()
                .map(|f| {
                    format!(
                        "  {}: {}",
                        paint(&f.name, &f.color, use_colors),
                        format_percent(f.equity_percentage)
                    )
                })
                .collect();
            if founders.is_empty() {
                format!("{}\n  (no co-founders)", heading)
            } else {
                format!("{}\n{}", heading, founders.join("\n"))
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Format the three contribution type multipliers, one per line
pub fn format_weights(weights: &ContributionWeights) -> String {
    ContributionType::ALL
        .into_iter()
        .map(|kind| format!("{:<18} {:>5}", kind.label(), format_weight(weights.get(kind))))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line team summary: total and average score
pub fn format_summary(state: &AppState) -> String {
    let summary = team_summary(&state.founders, &state.contribution_weights);
    format!(
        "Team score: {}  Average: {:.1}",
        group_thousands(summary.total_score),
        summary.average_score
    )
}
