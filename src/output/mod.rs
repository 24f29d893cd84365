pub mod formatter;

pub use formatter::{
    format_age, format_amount, format_equity_table, format_founder_detail, format_history,
    format_milestones, format_percent, format_summary, format_weight, format_weights,
    group_thousands, should_use_colors,
};
