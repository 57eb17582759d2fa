use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{FormValues, Surfaces, UiServices};
use shared::protocol::{Categories, Products, Users};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod console;
mod resources;
mod screen;

use console::{AutoConfirm, ConsoleSurface, DialogResponder, PromptResponder};
use resources::ScreenResource;
use screen::{CrudScreen, DeleteOutcome, SaveOutcome};

/// Manage admin panel records from the terminal.
#[derive(Parser, Debug)]
#[command(name = "admin-console")]
struct Args {
    /// Settings file; missing files fall back to defaults.
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Overrides the configured backend base URL.
    #[arg(long)]
    base_url: Option<String>,
    /// Confirm destructive actions without asking.
    #[arg(long, short)]
    yes: bool,
    #[arg(value_enum)]
    resource: ResourceKind,
    #[command(subcommand)]
    action: Action,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ResourceKind {
    Categories,
    Products,
    Users,
}

#[derive(Subcommand, Debug)]
enum Action {
    List {
        #[arg(long)]
        search: Option<String>,
    },
    Show {
        id: String,
    },
    Create {
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        values: Vec<(String, String)>,
    },
    Update {
        id: String,
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        values: Vec<(String, String)>,
    },
    Delete {
        id: String,
    },
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing field name in '{raw}'"));
    }
    Ok((name.to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings(&args.config)?;
    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }

    let console = ConsoleSurface::stdout();
    let services = UiServices::init(settings, Surfaces::uniform(console.clone()))?;
    let responder: Arc<dyn DialogResponder> = if args.yes {
        Arc::new(AutoConfirm)
    } else {
        Arc::new(PromptResponder::stdin())
    };

    let result = match args.resource {
        ResourceKind::Categories => {
            let screen = CrudScreen::<Categories>::new(services.clone(), console, responder);
            run(screen, args.action).await
        }
        ResourceKind::Products => {
            let screen = CrudScreen::<Products>::new(services.clone(), console, responder);
            run(screen, args.action).await
        }
        ResourceKind::Users => {
            let screen = CrudScreen::<Users>::new(services.clone(), console, responder);
            run(screen, args.action).await
        }
    };

    services.teardown();
    result
}

fn id_page(id: &str) -> FormValues {
    FormValues::from([("id".to_string(), id.to_string())])
}

async fn run<R: ScreenResource>(screen: CrudScreen<R>, action: Action) -> Result<()> {
    match action {
        Action::List { search } => {
            let records = screen.list(search.as_deref()).await?;
            if records.is_empty() {
                println!("no {} found", R::COLLECTION.trim_start_matches('/'));
            }
            for record in &records {
                println!("{}", R::summary(record));
            }
        }
        Action::Show { id } => {
            let record = screen.show(&id_page(&id)).await?;
            println!("{}", R::summary(&record));
        }
        Action::Create { values } => {
            let outcome = screen.save_flow(None, &values.into_iter().collect()).await?;
            report::<R>(outcome)?;
        }
        Action::Update { id, values } => {
            let id = R::parse_id(&id).with_context(|| format!("invalid {} id '{id}'", R::NOUN))?;
            let outcome = screen
                .save_flow(Some(id), &values.into_iter().collect())
                .await?;
            report::<R>(outcome)?;
        }
        Action::Delete { id } => match screen.delete_flow(&id_page(&id)).await? {
            DeleteOutcome::Deleted { redirect } => {
                if let Some(target) = redirect {
                    info!(%target, "returning to list");
                }
            }
            DeleteOutcome::Cancelled => println!("delete cancelled"),
            DeleteOutcome::MissingId => bail!("{} id '{id}' is not valid", R::NOUN),
            DeleteOutcome::Failed(failure) => return Err(failure.into()),
        },
    }
    Ok(())
}

fn report<R: ScreenResource>(outcome: SaveOutcome<R::Record>) -> Result<()> {
    match outcome {
        SaveOutcome::Saved { record, redirect } => {
            println!("{}", R::summary(&record));
            if let Some(target) = redirect {
                info!(%target, "returning to list");
            }
            Ok(())
        }
        SaveOutcome::Invalid(errors) => {
            let fields: Vec<_> = errors.keys().map(String::as_str).collect();
            bail!("{} not saved; invalid fields: {}", R::NOUN, fields.join(", "))
        }
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
