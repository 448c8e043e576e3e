use std::fmt::Display;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use gh_query::{Phase, QueryState};

use crate::cli::OutputFormat;

static FORMAT: AtomicU8 = AtomicU8::new(0);
static QUIET: AtomicBool = AtomicBool::new(false);

pub fn set_format(format: OutputFormat) {
    let raw = match format {
        OutputFormat::Table => 0,
        OutputFormat::Json => 1,
        OutputFormat::Compact => 2,
    };
    FORMAT.store(raw, Ordering::Relaxed);
}

pub fn format() -> OutputFormat {
    match FORMAT.load(Ordering::Relaxed) {
        1 => OutputFormat::Json,
        2 => OutputFormat::Compact,
        _ => OutputFormat::Table,
    }
}

pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

pub fn is_json_output() -> bool {
    format() == OutputFormat::Json
}

#[derive(Tabled)]
struct StateRow {
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Loaded")]
    loaded: bool,
    #[tabled(rename = "Fetching")]
    fetching: bool,
    #[tabled(rename = "Error")]
    error: String,
}

/// Print a query state in the selected output format
pub fn print_state<T, E>(state: &QueryState<T, E>)
where
    T: Serialize,
    E: Display,
{
    match format() {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(state).unwrap_or_default());
        }
        OutputFormat::Compact => println!("{}", compact_line(state)),
        OutputFormat::Table => {
            let row = StateRow {
                status: phase_colored(state.phase()),
                loaded: state.loaded(),
                fetching: state.fetching(),
                error: state
                    .error()
                    .map(|e| truncate(&e.to_string(), 60))
                    .unwrap_or_default(),
            };
            let table = Table::new([row]).with(Style::rounded()).to_string();
            println!("{table}");

            if let Some(data) = state.data() {
                println!(
                    "{}",
                    serde_json::to_string_pretty(data).unwrap_or_default()
                );
            }
        }
    }
}

/// One line per state: `<phase> <data or error>`
pub fn compact_line<T, E>(state: &QueryState<T, E>) -> String
where
    T: Serialize,
    E: Display,
{
    let detail = match (state.data(), state.error()) {
        (Some(data), _) => serde_json::to_string(data).unwrap_or_default(),
        (_, Some(error)) => error.to_string(),
        _ => String::new(),
    };

    if detail.is_empty() {
        state.phase().label().to_string()
    } else {
        format!("{} {}", state.phase().label(), detail)
    }
}

/// Print a message (skipped in quiet mode, or prints simple object in JSON mode)
pub fn print_message(message: &str) {
    if QUIET.load(Ordering::Relaxed) {
        return;
    }

    if is_json_output() {
        println!(r#"{{"message": "{}"}}"#, message.replace('"', "\\\""));
    } else {
        println!("{message}");
    }
}

/// Format a phase with color
pub fn phase_colored(phase: Phase) -> String {
    let label = phase.label();
    match phase {
        Phase::Idle => label.bright_black().to_string(),
        Phase::Fetching => label.blue().to_string(),
        Phase::Loaded => label.green().bold().to_string(),
        Phase::Failed => label.red().bold().to_string(),
    }
}

/// Truncate a string with ellipsis
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
