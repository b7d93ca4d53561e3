use clap::{Args, Subcommand};

use super::{confirm, origin, truncate, OutputFormat};
use sinergyfit_core::{Account, Exercise, Routine};

#[derive(Args)]
pub struct RoutineCommand {
    #[command(subcommand)]
    pub command: RoutineSubcommand,
}

#[derive(Subcommand)]
pub enum RoutineSubcommand {
    /// List preloaded and custom routines
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Only show your own routines
        #[arg(long)]
        mine: bool,
    },

    /// Show a routine's details
    Show {
        /// Routine ID
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Create a new routine
    Create {
        /// Name of the routine
        name: String,

        /// What the routine is for
        #[arg(long, short)]
        description: String,

        /// Exercise as NAME:SETS:REPS[:DESCRIPTION] (can be repeated)
        #[arg(long = "exercise", short = 'e', value_name = "EXERCISE")]
        exercises: Vec<String>,

        /// Image URL
        #[arg(long)]
        image_url: Option<String>,

        /// Short description of the image
        #[arg(long)]
        image_hint: Option<String>,
    },

    /// Update one of your routines
    Update {
        /// Routine ID
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New description
        #[arg(long, short)]
        description: Option<String>,

        /// Replace the exercises (can be repeated)
        #[arg(long = "exercise", short = 'e', value_name = "EXERCISE")]
        exercises: Vec<String>,

        /// Image URL
        #[arg(long)]
        image_url: Option<String>,

        /// Short description of the image
        #[arg(long)]
        image_hint: Option<String>,
    },

    /// Delete one of your routines
    Delete {
        /// Routine ID
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Make an editable copy of a routine that replaces it in listings
    Customize {
        /// Routine ID
        id: String,
    },
}

fn parse_exercises(specs: &[String]) -> Result<Vec<Exercise>, String> {
    specs.iter().map(|spec| Exercise::parse_spec(spec)).collect()
}

impl RoutineCommand {
    pub async fn run(&self, account: &Account) -> Result<(), Box<dyn std::error::Error>> {
        let library = account.library();

        match &self.command {
            RoutineSubcommand::List { format, mine } => {
                let routines = if *mine {
                    library.routine_store().list().await?
                } else {
                    library.routines().await?
                };

                if routines.is_empty() {
                    println!("No routines found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&routines)?);
                    }
                    OutputFormat::Text => {
                        println!("{:<28}  {:<30}  {:>9}  SOURCE", "ID", "NAME", "EXERCISES");
                        println!("{}", "-".repeat(90));
                        for routine in &routines {
                            println!(
                                "{:<28}  {:<30}  {:>9}  {}",
                                routine.id,
                                truncate(&routine.name, 30),
                                routine.exercises.len(),
                                origin(routine.is_preloaded, routine.source_seed_id.as_deref())
                            );
                        }
                        println!("\nTotal: {} routine(s)", routines.len());
                    }
                }
                Ok(())
            }

            RoutineSubcommand::Show { id, format } => {
                let routine = library
                    .find_routine(id)
                    .await?
                    .ok_or_else(|| format!("Routine not found: {}", id))?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&routine)?);
                    }
                    OutputFormat::Text => {
                        println!("{}", routine);
                    }
                }
                Ok(())
            }

            RoutineSubcommand::Create {
                name,
                description,
                exercises,
                image_url,
                image_hint,
            } => {
                let mut routine = Routine::new(name.trim(), description.trim())
                    .with_exercises(parse_exercises(exercises)?);
                routine.image_url = image_url.clone();
                routine.image_hint = image_hint.clone();

                library.routine_store().add(routine.clone())?.wait().await?;
                println!("Created routine:");
                println!("{}", routine);
                Ok(())
            }

            RoutineSubcommand::Update {
                id,
                name,
                description,
                exercises,
                image_url,
                image_hint,
            } => {
                let has_updates = name.is_some()
                    || description.is_some()
                    || !exercises.is_empty()
                    || image_url.is_some()
                    || image_hint.is_some();

                if !has_updates {
                    return Err("Nothing to update. Provide at least one option.".into());
                }

                let mut routine = library
                    .find_routine(id)
                    .await?
                    .ok_or_else(|| format!("Routine not found: {}", id))?;

                if routine.is_preloaded {
                    return Err(format!(
                        "'{}' is preloaded. Run 'sinergy routine customize {}' to get an editable copy.",
                        id, id
                    )
                    .into());
                }

                if let Some(new_name) = name {
                    routine.name = new_name.trim().to_string();
                }
                if let Some(new_description) = description {
                    routine.description = new_description.trim().to_string();
                }
                if !exercises.is_empty() {
                    routine.exercises = parse_exercises(exercises)?;
                }
                if image_url.is_some() {
                    routine.image_url = image_url.clone();
                }
                if image_hint.is_some() {
                    routine.image_hint = image_hint.clone();
                }

                library.routine_store().update(&routine)?.wait().await?;
                println!("Updated routine:");
                println!("{}", routine);
                Ok(())
            }

            RoutineSubcommand::Delete { id, force } => {
                let routine = library
                    .routine_store()
                    .get(id)
                    .await?
                    .ok_or_else(|| format!("Routine not found among your routines: {}", id))?;

                if !force && !confirm(&format!("Delete routine '{}'?", routine.name))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                library.routine_store().delete(&routine.id).wait().await?;
                println!("Deleted routine: {}", routine.name);
                if let Some(seed) = &routine.source_seed_id {
                    println!("Preloaded routine {} is visible again.", seed);
                }
                Ok(())
            }

            RoutineSubcommand::Customize { id } => {
                let routine = library
                    .find_routine(id)
                    .await?
                    .ok_or_else(|| format!("Routine not found: {}", id))?;

                let (copy, handle) = library.customize_routine(&routine)?;
                handle.wait().await?;
                println!("Created editable copy of '{}':", routine.name);
                println!("{}", copy);
                Ok(())
            }
        }
    }
}
