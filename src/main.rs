use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mod_weekly::aggregate::{self, RecordFilter};
use mod_weekly::client::ApiClient;
use mod_weekly::config::{ApiConfig, TOKEN_VAR};
use mod_weekly::form::{DraftField, WeeklyPlanForm};
use mod_weekly::models::MaterialType;
use mod_weekly::weeks::WeekValidation;
use mod_weekly::{import, render, service};

#[derive(Parser)]
#[command(name = "mod-weekly")]
#[command(about = "Weekly direct labor (MOD) tracker for the copper and aluminum lines", long_about = None)]
struct Cli {
    /// Bearer token for the MOD API
    #[arg(long, global = true, env = TOKEN_VAR, hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show weekly records with totals and summary cards
    List {
        #[arg(long)]
        week: Option<i64>,
        #[arg(long, default_value = "")]
        search: String,
        /// Also write the dashboard as markdown
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show recorded weeks and the next available one
    Weeks,
    /// Register a new week's plan
    Create {
        /// Defaults to the next available week
        #[arg(long)]
        week: Option<String>,
        #[command(flatten)]
        fields: MaterialFields,
    },
    /// Edit an existing week's plan
    Update {
        #[arg(long)]
        week: i64,
        #[command(flatten)]
        fields: MaterialFields,
    },
    /// Download the weekly Excel report
    Report {
        #[arg(long)]
        week: i64,
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Create weekly plans from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
}

/// Raw inputs; coerced the same way the interactive form does.
#[derive(Args)]
struct MaterialFields {
    #[arg(long)]
    cu_target: Option<String>,
    #[arg(long)]
    cu_volume: Option<String>,
    #[arg(long)]
    cu_mod: Option<String>,
    #[arg(long)]
    al_target: Option<String>,
    #[arg(long)]
    al_volume: Option<String>,
    #[arg(long)]
    al_mod: Option<String>,
}

impl MaterialFields {
    fn apply(&self, form: &mut WeeklyPlanForm) {
        let inputs = [
            (MaterialType::Cu, DraftField::ProductivityTarget, &self.cu_target),
            (MaterialType::Cu, DraftField::ProductionVolume, &self.cu_volume),
            (MaterialType::Cu, DraftField::Mod, &self.cu_mod),
            (MaterialType::Al, DraftField::ProductivityTarget, &self.al_target),
            (MaterialType::Al, DraftField::ProductionVolume, &self.al_volume),
            (MaterialType::Al, DraftField::Mod, &self.al_mod),
        ];
        for (material, field, raw) in inputs {
            if let Some(raw) = raw {
                form.set_field(material, field, raw);
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = ApiConfig::from_env()?;
    if cli.token.is_some() {
        config = config.with_token(cli.token);
    }

    let command = cli.command;
    if let Commands::Report { dir: Some(dir), .. } = &command {
        config = config.with_download_dir(dir.clone());
    }
    let client = ApiClient::new(config).context("failed to build HTTP client")?;

    match command {
        Commands::List { week, search, out } => {
            let records = service::get_all(&client).await?;
            let filter = RecordFilter {
                week: week.into(),
                search,
            };
            let filtered = filter.apply(&records);
            let totals = aggregate::totals(&filtered);
            let weeks = aggregate::unique_weeks(&records);
            let dashboard =
                render::render_dashboard(&filter, &weeks, records.len(), &filtered, &totals);

            print!("{dashboard}");
            if let Some(out) = out {
                std::fs::write(&out, &dashboard)
                    .with_context(|| format!("failed to write {}", out.display()))?;
                println!("Dashboard written to {}.", out.display());
            }
        }
        Commands::Weeks => {
            let existing = service::get_existing_weeks(&client).await?;
            let weeks = WeekValidation::from_weeks(existing);
            print!("{}", render::render_weeks(&weeks));
        }
        Commands::Create { week, fields } => {
            let mut form = WeeklyPlanForm::open_create(&client).await;
            if let Some(week) = week {
                form.set_week(&week);
            }
            fields.apply(&mut form);
            let ack = form.submit(&client).await?;
            println!(
                "Week {} registered.{}",
                form.draft().week_number,
                ack.message.map(|m| format!(" {m}")).unwrap_or_default()
            );
        }
        Commands::Update { week, fields } => {
            let mut form = WeeklyPlanForm::open_edit(&client, week).await?;
            fields.apply(&mut form);
            let ack = form.submit(&client).await?;
            println!(
                "Week {week} updated.{}",
                ack.message.map(|m| format!(" {m}")).unwrap_or_default()
            );
        }
        Commands::Report { week, .. } => {
            let saved = service::download_weekly_report(&client, week).await?;
            println!("Report saved to {}.", saved.display());
        }
        Commands::Import { csv } => {
            let inserted = import::import_csv(&client, &csv).await?;
            println!("Created {inserted} weekly plans from {}.", csv.display());
        }
    }

    Ok(())
}
