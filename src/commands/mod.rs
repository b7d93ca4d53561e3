use clap::ValueEnum;
use std::io::{self, Write};

mod config_cmd;
mod plan;
mod recipe;
mod routine;

pub use config_cmd::ConfigCommand;
pub use plan::PlanCommand;
pub use recipe::RecipeCommand;
pub use routine::RoutineCommand;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Asks a yes/no question on stdin. Anything but `y` means no.
fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Where a listed record comes from.
fn origin(is_preloaded: bool, source_seed_id: Option<&str>) -> String {
    match (is_preloaded, source_seed_id) {
        (true, _) => "preloaded".to_string(),
        (false, Some(seed)) => format!("custom ({})", seed),
        (false, None) => "custom".to_string(),
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let cut: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        s.to_string()
    }
}
