use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use garden_core::EmbeddedKind;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "garden")]
#[command(about = "Track gardens with their plants, tasks and supplies")]
#[command(version)]
pub struct Cli {
    /// Login email
    #[arg(long, env = "GARDEN_EMAIL", global = true)]
    pub email: Option<String>,
    /// Login password
    #[arg(long, env = "GARDEN_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,
    /// Credentials file; overrides GARDEN_CREDENTIALS_JSON / GARDEN_CREDENTIALS_FILE
    #[arg(long, global = true)]
    pub credentials: Option<PathBuf>,
    /// trace|debug|info|warn|error
    #[arg(long, env = "GARDEN_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,
    /// Absolute directory for rolling log files
    #[arg(long, env = "GARDEN_LOG_DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List garden names
    List,
    /// Create a garden, replacing any garden with the same name
    Create(CreateArgs),
    /// Show one garden and its collections
    Show {
        name: String,
    },
    /// Change top-level fields of an existing garden
    Update(UpdateArgs),
    /// Add a plant to a garden
    AddPlant(AddPlantArgs),
    /// Add a task to a garden
    AddTask(AddTaskArgs),
    /// Add a supply to a garden
    AddSupply(AddSupplyArgs),
    /// Export one collection of a garden as CSV
    Export {
        name: String,
        /// plants|tasks|supplies
        #[arg(short, long)]
        collection: EmbeddedKind,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
    /// Register a user allowed to log in
    RegisterUser {
        email: String,
    },
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[arg(short, long)]
    pub name: String,
    #[arg(short, long, default_value = "")]
    pub location: String,
    /// Size in acres
    #[arg(short, long)]
    pub size: f64,
    /// Comma-separated owners
    #[arg(short, long)]
    pub owners: String,
    /// YYYY-MM-DD; defaults to today
    #[arg(long)]
    pub since: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    pub name: String,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub size: Option<f64>,
    #[arg(long)]
    pub since: Option<NaiveDate>,
    /// Comma-separated owners, replaces the current list
    #[arg(long)]
    pub owners: Option<String>,
}

#[derive(Args, Debug)]
pub struct AddPlantArgs {
    /// Garden name
    pub garden: String,
    #[arg(short, long)]
    pub name: String,
    /// Organism type or category
    #[arg(short = 't', long = "type")]
    pub org_type: String,
    #[arg(long, default_value = "")]
    pub notes: String,
    #[arg(long)]
    pub edible: bool,
    /// YYYY-MM-DD
    #[arg(long)]
    pub planted: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct AddTaskArgs {
    pub garden: String,
    #[arg(short, long)]
    pub name: String,
    #[arg(short, long, default_value = "")]
    pub description: String,
    #[arg(short, long, default_value = "")]
    pub assignee: String,
}

#[derive(Args, Debug)]
pub struct AddSupplyArgs {
    pub garden: String,
    #[arg(short, long)]
    pub name: String,
    #[arg(short, long)]
    pub quantity: i64,
    #[arg(long, default_value = "")]
    pub notes: String,
}
