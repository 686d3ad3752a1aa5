use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use adaptive_dashboard::messaging::{adapt_message, builtin_book};
use adaptive_dashboard::report::{self, TeamDashboard};
use adaptive_dashboard::{compose_dashboard, input, role_tone_for, widgets, MessageContext, Role};

#[derive(Parser)]
#[command(name = "dashboard-composer")]
#[command(about = "Compose role-aware project dashboards from situation profiles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank widgets for one situation profile
    Compose {
        #[arg(long, env = "DASHBOARD_PROFILE")]
        profile: PathBuf,
        #[arg(long, env = "DASHBOARD_ROLE", value_parser = parse_role, default_value_t = Role::User)]
        role: Role,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        recommendations: Option<PathBuf>,
        /// Print the composed dashboard as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report for every team in a CSV file
    Report {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, env = "DASHBOARD_ROLE", value_parser = parse_role, default_value_t = Role::User)]
        role: Role,
        #[arg(long)]
        recommendations: Option<PathBuf>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Phrase a message key for a role
    Message {
        #[arg(long)]
        key: String,
        #[arg(long, env = "DASHBOARD_ROLE", value_parser = parse_role, default_value_t = Role::User)]
        role: Role,
        /// Placeholder value as name=value, repeatable
        #[arg(long = "set", value_parser = parse_pair)]
        values: Vec<(String, String)>,
    },
    /// Show the tone descriptor for a role name
    Tone {
        #[arg(long, default_value = "user")]
        role: String,
    },
    /// List the built-in widgets
    Catalog,
}

fn parse_role(raw: &str) -> Result<Role, String> {
    raw.parse()
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got `{raw}`"))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Compose {
            profile,
            role,
            limit,
            recommendations,
            json,
        } => {
            let catalog = widgets::builtin_catalog().context("built-in widget catalog is invalid")?;
            let situation = input::load_profile(&profile)?;
            let recs = match recommendations {
                Some(path) => input::load_recommendations(&path)?,
                None => Vec::new(),
            };
            let dashboard = compose_dashboard(&catalog, &situation, role, builtin_book(), &recs, limit);

            if json {
                println!("{}", serde_json::to_string_pretty(&dashboard)?);
                return Ok(());
            }

            if dashboard.panels.is_empty() {
                println!("{}", adapt_message("noActivations", role, &MessageContext::new()));
                return Ok(());
            }

            println!("Widgets for {role}:");
            for panel in &dashboard.panels {
                println!(
                    "- {} relevance {:.1} (priority {}): {}",
                    panel.activation.id,
                    panel.activation.relevance,
                    panel.activation.priority,
                    panel.headline.as_deref().unwrap_or("-")
                );
            }
            for rec in &dashboard.recommendations {
                println!("{} {}: {}", rec.prefix, rec.title, rec.description);
            }
        }
        Commands::Report {
            csv,
            role,
            recommendations,
            out,
        } => {
            let catalog = widgets::builtin_catalog().context("built-in widget catalog is invalid")?;
            let teams = input::import_csv(&csv)?;
            let recs = match recommendations {
                Some(path) => input::load_recommendations(&path)?,
                None => Vec::new(),
            };
            let dashboards: Vec<TeamDashboard> = teams
                .into_iter()
                .map(|team| TeamDashboard {
                    dashboard: compose_dashboard(&catalog, &team.profile, role, builtin_book(), &recs, None),
                    team: team.team,
                })
                .collect();
            let generated_on = chrono::Utc::now().date_naive();
            let report = report::build_report(generated_on, role, &dashboards);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report for {} teams written to {}.", dashboards.len(), out.display());
        }
        Commands::Message { key, role, values } => {
            let context: MessageContext = values.into_iter().collect();
            println!("{}", adapt_message(&key, role, &context));
        }
        Commands::Tone { role } => {
            println!("{}", serde_json::to_string_pretty(role_tone_for(&role))?);
        }
        Commands::Catalog => {
            let catalog = widgets::builtin_catalog().context("built-in widget catalog is invalid")?;
            for widget in catalog.iter() {
                let roles: Vec<&str> = widget.allowed_roles().iter().map(Role::as_str).collect();
                println!(
                    "- {} [{}] {} priority {} roles {}",
                    widget.id(),
                    widget.category(),
                    widget.name(),
                    widget.priority_weight(),
                    roles.join(",")
                );
            }
        }
    }

    Ok(())
}
