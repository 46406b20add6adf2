//! `garden` command line entry point.
//!
//! Every command except `register-user` runs behind the login gate, and all
//! of them share one explicitly started store session.

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use garden_core::service::garden_service::split_owners;
use garden_core::{
    default_log_level, init_logging, AuthenticatedUser, CredentialSource, GardenForm,
    GardenPatch, GardenView, Plant, Session, Supply, Task,
};
use log::warn;

mod cli;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        let log_dir = log_dir
            .to_str()
            .ok_or_else(|| anyhow!("log dir `{}` is not valid UTF-8", log_dir.display()))?;
        init_logging(level, log_dir)
            .map_err(|err| anyhow!("failed to initialize logging: {err}"))?;
    }

    let source = match &cli.credentials {
        Some(path) => CredentialSource::File(path.clone()),
        None => CredentialSource::from_env(),
    };
    let session = Session::start(&source);
    if let Some(err) = session.init_error() {
        bail!("store unavailable: {err}");
    }

    if !matches!(cli.command, Commands::RegisterUser { .. }) {
        let user = login(&session, cli.email.as_deref(), cli.password.as_deref())?;
        println!("Garden Helper (user: {})", user.email);
    }

    run(&session, cli.command)
}

fn login(
    session: &Session,
    email: Option<&str>,
    password: Option<&str>,
) -> Result<AuthenticatedUser> {
    let (Some(email), Some(password)) = (email, password) else {
        bail!("login required: pass --email and --password");
    };
    session.auth()?.login(email, password).map_err(|err| {
        warn!("event=cli_login module=cli status=error");
        anyhow!(err)
    })
}

fn run(session: &Session, command: Commands) -> Result<()> {
    if let Commands::RegisterUser { email } = command {
        let record = session.auth()?.register_user(&email)?;
        println!("Registered {}", record.email);
        return Ok(());
    }

    let gardens = session.gardens()?;
    match command {
        Commands::List => {
            let names = gardens.list_gardens()?;
            if names.is_empty() {
                println!("No gardens.");
            }
            for name in names {
                println!("{name}");
            }
        }
        Commands::Create(args) => {
            let form = GardenForm {
                name: args.name,
                location: args.location,
                size: args.size,
                owners: args.owners,
                since: args
                    .since
                    .unwrap_or_else(|| chrono::Local::now().date_naive()),
            };
            let garden = gardens.create_garden(form)?;
            println!("Saved {}.", garden.name);
        }
        Commands::Show { name } => match gardens.view_garden(&name)? {
            Some(view) => print_view(&view),
            None => println!("No such garden: {name}"),
        },
        Commands::Update(args) => {
            let patch = GardenPatch {
                location: args.location,
                size: args.size,
                since: args.since,
                owners: args.owners.as_deref().map(split_owners),
                ..GardenPatch::default()
            };
            let garden = gardens.update_garden(&args.name, &patch)?;
            println!("Updated {}: {}", garden.name, patch.field_names().join(", "));
        }
        Commands::AddPlant(args) => {
            let plant = Plant {
                name: args.name,
                org_type: args.org_type,
                notes: args.notes,
                edible: args.edible,
                planted: args.planted,
            };
            let id = gardens.add_plant(&args.garden, plant)?;
            println!("Plant added to {}, id {id}", args.garden);
        }
        Commands::AddTask(args) => {
            let task = Task {
                name: args.name,
                description: args.description,
                assignee: args.assignee,
            };
            let id = gardens.add_task(&args.garden, task)?;
            println!("Task added to {}, id {id}", args.garden);
        }
        Commands::AddSupply(args) => {
            let supply = Supply {
                name: args.name,
                quantity: args.quantity,
                notes: args.notes,
            };
            let id = gardens.add_supply(&args.garden, supply)?;
            println!("Supply added to {}, id {id}", args.garden);
        }
        Commands::Export {
            name,
            collection,
            out,
        } => {
            let export = gardens.export_collection(&name, collection)?;
            let path = export.write_to_dir(&out)?;
            println!("Wrote {} rows to {}", export.row_count(), path.display());
        }
        Commands::RegisterUser { .. } => {}
    }
    Ok(())
}

fn print_view(view: &GardenView) {
    println!("{}", view.garden.name);
    println!("{}", view.summary);

    println!("Plants:");
    for (id, plant) in &view.garden.plants {
        let planted = plant
            .planted
            .map(|date| date.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {id}: {} ({}) edible={} planted={} {}",
            plant.name, plant.org_type, plant.edible, planted, plant.notes
        );
    }
    println!("Tasks:");
    for (id, task) in &view.garden.tasks {
        println!(
            "  {id}: {} [{}] {}",
            task.name, task.assignee, task.description
        );
    }
    println!("Supplies:");
    for (id, supply) in &view.garden.supplies {
        println!("  {id}: {} x{} {}", supply.name, supply.quantity, supply.notes);
    }
}
