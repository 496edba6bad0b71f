use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use khata_store::Database;
use tracing::debug;

use crate::commands::{expense, meal, member, org, report, wallet, Ctx};
use crate::settings::Settings;
use crate::telemetry;

#[derive(Parser)]
#[command(name = "khata", version, about = "Shared-kitchen meal billing over SQLite")]
struct Cli {
    /// Extra configuration file, layered over `khata.toml`.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Email of the account the command runs as.
    #[arg(long, global = true, value_name = "EMAIL")]
    actor: Option<String>,
    /// Machine-readable output.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Organization registration and details.
    Org {
        #[command(subcommand)]
        command: org::OrgCmd,
    },
    /// Member accounts.
    Member {
        #[command(subcommand)]
        command: member::MemberCmd,
    },
    /// Deposits, corrections and ledger history.
    Wallet {
        #[command(subcommand)]
        command: wallet::WalletCmd,
    },
    /// Attendance sheets and meal boards.
    Meal {
        #[command(subcommand)]
        command: meal::MealCmd,
    },
    /// Shared kitchen expenses.
    Expense {
        #[command(subcommand)]
        command: expense::ExpenseCmd,
    },
    /// Rates, settlement and dashboards.
    Report {
        #[command(subcommand)]
        command: report::ReportCmd,
    },
    /// Print a default `khata.toml` to stdout.
    ConfigInit,
}

pub fn run() -> Result<()> {
    let Cli { config, actor, json, command } = Cli::parse();
    telemetry::init(json);

    // The one command that must work before any database exists.
    if let Commands::ConfigInit = command {
        print!("{}", toml::to_string_pretty(&Settings::default())?);
        return Ok(());
    }

    let settings = Settings::load(config.as_deref())?;
    debug!(db = %settings.db_path.display(), "opening database");
    let db = Database::open(&settings.db_path)?
        .with_busy_timeout(Duration::from_millis(settings.busy_timeout_ms))
        .with_batch_busy_timeout(Duration::from_millis(settings.batch_busy_timeout_ms));
    let ctx = Ctx::new(settings, db, json, actor);

    match command {
        Commands::Org { command } => org::run(&ctx, command),
        Commands::Member { command } => member::run(&ctx, command),
        Commands::Wallet { command } => wallet::run(&ctx, command),
        Commands::Meal { command } => meal::run(&ctx, command),
        Commands::Expense { command } => expense::run(&ctx, command),
        Commands::Report { command } => report::run(&ctx, command),
        Commands::ConfigInit => Ok(()),
    }
}
