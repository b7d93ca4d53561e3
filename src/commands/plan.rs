use chrono::{Datelike, Local};
use clap::{Args, Subcommand};

use super::OutputFormat;
use sinergyfit_core::{Account, DayPlan, MealSlot, Weekday};

#[derive(Args)]
pub struct PlanCommand {
    #[command(subcommand)]
    pub command: PlanSubcommand,
}

#[derive(Subcommand)]
pub enum PlanSubcommand {
    /// Show the weekly meal plan
    Show {
        /// Only show one day (Monday..Sunday, Mon..Sun, or "today")
        #[arg(long, short)]
        day: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Assign a recipe to a meal slot
    Set {
        /// Day (Monday..Sunday, Mon..Sun, or "today")
        day: String,

        /// Meal slot (breakfast, lunch, dinner)
        slot: String,

        /// Recipe ID
        recipe: String,
    },

    /// Clear a meal slot
    Clear {
        /// Day (Monday..Sunday, Mon..Sun, or "today")
        day: String,

        /// Meal slot (breakfast, lunch, dinner)
        slot: String,
    },
}

fn parse_day(value: &str) -> Result<Weekday, String> {
    if value.trim().eq_ignore_ascii_case("today") {
        return Ok(Local::now().weekday().into());
    }
    value.parse()
}

fn print_day(day: Weekday, plan: Option<&DayPlan>) {
    println!("{}", day);
    for slot in MealSlot::ALL {
        let name = plan
            .and_then(|p| p.get(slot))
            .map(|recipe| recipe.name.as_str())
            .unwrap_or("-");
        println!("  {:<10} {}", slot.key(), name);
    }
}

impl PlanCommand {
    pub async fn run(&self, account: &Account) -> Result<(), Box<dyn std::error::Error>> {
        let planner = account.planner();

        match &self.command {
            PlanSubcommand::Show { day, format } => {
                let plan = planner.plan().await?;
                let day = day.as_deref().map(parse_day).transpose()?;

                match (format, day) {
                    (OutputFormat::Json, Some(day)) => {
                        let day_plan = plan.day(day).cloned().unwrap_or_default();
                        println!("{}", serde_json::to_string_pretty(&day_plan)?);
                    }
                    (OutputFormat::Json, None) => {
                        println!("{}", serde_json::to_string_pretty(&plan)?);
                    }
                    (OutputFormat::Text, Some(day)) => {
                        print_day(day, plan.day(day));
                    }
                    (OutputFormat::Text, None) => {
                        print!("{}", plan);
                        println!("\nPlanned: {} of 21 meal(s)", plan.assigned_count());
                    }
                }
                Ok(())
            }

            PlanSubcommand::Set { day, slot, recipe } => {
                let day = parse_day(day)?;
                let slot: MealSlot = slot.parse()?;
                let recipe = account
                    .library()
                    .find_recipe(recipe)
                    .await?
                    .ok_or_else(|| format!("Recipe not found: {}", recipe))?;

                planner.set_slot(day, slot, Some(&recipe))?.wait().await?;
                println!("{} {}: {}", day, slot, recipe.name);
                Ok(())
            }

            PlanSubcommand::Clear { day, slot } => {
                let day = parse_day(day)?;
                let slot: MealSlot = slot.parse()?;

                planner.set_slot(day, slot, None)?.wait().await?;
                println!("Cleared {} {}", day, slot);
                Ok(())
            }
        }
    }
}
