use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;

use commands::{ConfigCommand, PlanCommand, RecipeCommand, RoutineCommand};
use config::Config;
use sinergyfit_core::{Account, Session, User, UserId};

#[derive(Parser)]
#[command(name = "sinergy")]
#[command(version)]
#[command(about = "Workout routines, recipes and a weekly meal plan", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// User to act as (overrides config and SINERGY_USER)
    #[arg(long, short, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage workout routines
    Routine(RoutineCommand),

    /// Manage recipes
    Recipe(RecipeCommand),

    /// Manage the weekly meal plan
    Plan(PlanCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sinergyfit=warn,sinergyfit_core=warn".into()),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Signs in the configured user and provisions their account.
async fn open_account(config: &Config) -> Result<Account, Box<dyn std::error::Error>> {
    let uid = config.user.value.clone().ok_or(
        "Not signed in. Set `user` in the config file, SINERGY_USER, or pass --user.",
    )?;
    let session = Session::signed_in(User::new(UserId::new(uid)?));

    let account = Account::open(config.data_dir.value.clone(), session, None);
    account.set_up()?.wait().await?;
    tracing::debug!(data_dir = %config.data_dir.value.display(), "account ready");
    Ok(account)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.clone())?.with_user_override(cli.user);

    match cli.command {
        Some(Commands::Routine(cmd)) => {
            let account = open_account(&config).await?;
            cmd.run(&account).await?;
        }
        Some(Commands::Recipe(cmd)) => {
            let account = open_account(&config).await?;
            cmd.run(&account).await?;
        }
        Some(Commands::Plan(cmd)) => {
            let account = open_account(&config).await?;
            cmd.run(&account).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config, cli.config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
