//! CLI administration tool for the task tracker.
//!
//! Runs the schema migration and the seed step (usually as one-off commands
//! inside the `app` container) and drives the Compose stack from the host.
//!
//! # Usage
//!
//! ```bash
//! # Apply migrations up to head (no-op when already there)
//! admin migrate
//! admin migrate --status
//!
//! # Insert the default users (skips existing ones)
//! admin seed
//!
//! # Check database connection
//! admin db check
//!
//! # Stack lifecycle from the host
//! admin stack check
//! admin stack up --detach
//! admin stack migrate
//! admin stack seed
//! admin stack down --volumes
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_HOST`/`DB_PORT`/`DB_USER`/`DB_PASSWORD`/`DB_NAME`
//!   for database commands
//! - `APP_PORT`, `DB_NAME`, `DB_USER`, `DB_PASSWORD`, `DB_PORT` for stack commands
//! - `DB_CONNECT_RETRIES`, `DB_RETRY_BASE_DELAY_MS` for the startup retry

use task_tracker::application::services::SeedService;
use task_tracker::config::{self, DatabaseSettings};
use task_tracker::deploy::descriptor::{Descriptor, Interpolation};
use task_tracker::deploy::env::StackEnv;
use task_tracker::deploy::orchestrator::{self, ComposeCli, Orchestrator, Teardown, UpOptions};
use task_tracker::infrastructure::database::{self, migrations};
use task_tracker::infrastructure::persistence::PgUserRepository;
use task_tracker::telemetry;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// CLI tool for managing the task tracker.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Env file layered under the process environment
    #[arg(long, global = true, default_value = ".env")]
    env_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Apply schema migrations up to head
    Migrate {
        /// Only list migrations and whether they are applied
        #[arg(long)]
        status: bool,
    },

    /// Insert the default users
    Seed,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },

    /// Compose stack operations
    Stack(StackArgs),
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[derive(Args)]
struct StackArgs {
    /// Compose file the stack is run from
    #[arg(long, default_value = "docker-compose.yml")]
    compose_file: PathBuf,

    /// Compose project name
    #[arg(long, default_value = "task-tracker")]
    project: String,

    #[command(subcommand)]
    action: StackAction,
}

/// Stack subcommands.
#[derive(Subcommand)]
enum StackAction {
    /// Validate the descriptor, bind the environment and compare the compose file
    Check,

    /// Print the compose document
    Render {
        /// Substitute bound values instead of `${VAR:?...}` references
        #[arg(long)]
        resolved: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build and start all units
    Up {
        /// Skip rebuilding the application image
        #[arg(long)]
        no_build: bool,

        /// Run in the background
        #[arg(short, long)]
        detach: bool,
    },

    /// Stop and remove all units
    Down {
        /// Also delete named volumes (irreversible)
        #[arg(short = 'v', long)]
        volumes: bool,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Run the migration inside the app unit
    Migrate,

    /// Run the seed step inside the app unit
    Seed,

    /// Start detached, then migrate and seed
    Bootstrap {
        /// Skip rebuilding the application image
        #[arg(long)]
        no_build: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load environment variables from the env file
    dotenvy::from_path(&cli.env_file).ok();
    telemetry::init("warn", "text");

    match cli.command {
        Commands::Migrate { status } => handle_migrate(status).await?,
        Commands::Seed => handle_seed().await?,
        Commands::Db { action } => handle_db_action(action).await?,
        Commands::Stack(args) => handle_stack(args, &cli.env_file).await?,
    }

    Ok(())
}

/// Connects with the startup retry, since the database unit may still be
/// booting when the app container runs this.
async fn connect() -> Result<PgPool> {
    let database_url = config::load_database_url()?;
    let settings = DatabaseSettings::from_env();

    database::connect(&database_url, &settings)
        .await
        .with_context(|| {
            format!(
                "Failed to connect to database at {}",
                config::mask_connection_string(&database_url)
            )
        })
}

async fn handle_migrate(status_only: bool) -> Result<()> {
    let pool = connect().await?;

    if status_only {
        println!("{}", "📋 Migrations".bright_blue().bold());
        println!();
        for m in migrations::status(&pool).await? {
            let state = if m.applied {
                "applied".green()
            } else {
                "pending".yellow()
            };
            println!("  {:>14}  {:<8}  {}", m.version, state, m.description);
        }
        println!();
        return Ok(());
    }

    println!("{}", "🔄 Migrating database...".bright_blue());

    let report = migrations::run(&pool)
        .await
        .context("Migration aborted, nothing was applied")?;

    let head = report
        .head
        .map_or_else(|| "none".to_string(), |v| v.to_string());

    if report.is_noop() {
        println!(
            "{} {}",
            "✅ Already at head:".green().bold(),
            head.bright_white()
        );
    } else {
        for version in &report.applied_now {
            println!("  applied {}", version.to_string().bright_green());
        }
        println!("{} {}", "✅ Migrated to".green().bold(), head.bright_white());
    }

    Ok(())
}

async fn handle_seed() -> Result<()> {
    let pool = connect().await?;
    let users = Arc::new(PgUserRepository::new(Arc::new(pool)));

    println!("{}", "🌱 Seeding default users...".bright_blue());

    let report = SeedService::new(users)
        .seed()
        .await
        .context("Seeding failed; is the schema migrated?")?;

    for name in &report.created {
        println!("  {} {}", "created".green(), name.bright_white());
    }
    for name in &report.skipped {
        println!("  {} {} (already exists)", "skipped".yellow(), name);
    }

    println!(
        "{} {} created, {} skipped",
        "✅ Seed complete:".green().bold(),
        report.created.len(),
        report.skipped.len()
    );

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction) -> Result<()> {
    let pool = connect().await?;

    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            database::ping(&pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(&pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());

            let head = migrations::status(&pool)
                .await?
                .into_iter()
                .filter(|m| m.applied)
                .map(|m| m.version)
                .max();
            println!(
                "  Schema head: {}",
                head.map_or_else(|| "not migrated".to_string(), |v| v.to_string())
                    .bright_white()
            );
            println!();
        }
    }

    Ok(())
}

/// Binds the stack environment or fails before any orchestrator command.
fn bind_env(descriptor: &Descriptor, env_file: &Path) -> Result<StackEnv> {
    descriptor.validate()?;
    StackEnv::from_environment(descriptor, Some(env_file))
        .context("Stack environment is incomplete; nothing was started")
}

async fn compose_cli(
    descriptor: &Descriptor,
    env_file: &Path,
    compose_file: &Path,
    project: &str,
) -> Result<ComposeCli> {
    let env = bind_env(descriptor, env_file)?;
    Ok(ComposeCli::detect(compose_file, project, env).await)
}

async fn handle_stack(args: StackArgs, env_file: &Path) -> Result<()> {
    let descriptor = Descriptor::task_tracker();
    let StackArgs {
        compose_file,
        project,
        action,
    } = args;

    match action {
        StackAction::Check => stack_check(&descriptor, &compose_file, env_file)?,
        StackAction::Render { resolved, output } => {
            let rendered = if resolved {
                let env = bind_env(&descriptor, env_file)?;
                descriptor.render(Interpolation::Resolved(&env))?
            } else {
                descriptor.validate()?;
                descriptor.render(Interpolation::Template)?
            };

            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("{} {}", "✅ Wrote".green().bold(), path.display());
                }
                None => print!("{rendered}"),
            }
        }
        StackAction::Up { no_build, detach } => {
            let cli = compose_cli(&descriptor, env_file, &compose_file, &project).await?;
            cli.up(UpOptions {
                build: !no_build,
                detach,
            })
            .await?;
        }
        StackAction::Down { volumes, yes } => {
            let cli = compose_cli(&descriptor, env_file, &compose_file, &project).await?;
            let teardown = if volumes {
                Teardown::RemoveVolumes
            } else {
                Teardown::KeepVolumes
            };

            if teardown == Teardown::RemoveVolumes && !yes {
                println!(
                    "{}",
                    "⚠️  This deletes the database volume and all data in it."
                        .yellow()
                        .bold()
                );
                let confirmed = Confirm::new()
                    .with_prompt("Remove volumes?")
                    .default(false)
                    .interact()?;
                if !confirmed {
                    println!("{}", "Cancelled".yellow());
                    return Ok(());
                }
            }

            cli.down(teardown).await?;
        }
        StackAction::Migrate => {
            let cli = compose_cli(&descriptor, env_file, &compose_file, &project).await?;
            orchestrator::migrate_in_stack(&cli).await?;
        }
        StackAction::Seed => {
            let cli = compose_cli(&descriptor, env_file, &compose_file, &project).await?;
            orchestrator::seed_in_stack(&cli).await?;
        }
        StackAction::Bootstrap { no_build } => {
            let cli = compose_cli(&descriptor, env_file, &compose_file, &project).await?;
            orchestrator::bootstrap(&cli, !no_build).await?;
        }
    }

    Ok(())
}

fn stack_check(descriptor: &Descriptor, compose_file: &Path, env_file: &Path) -> Result<()> {
    println!("{}", "🔍 Checking stack...".bright_blue());
    println!();

    descriptor.validate()?;
    let order: Vec<&str> = descriptor
        .startup_order()?
        .iter()
        .map(|u| u.name.as_str())
        .collect();
    println!("  Units:         {}", order.join(" -> ").bright_white());

    let env = bind_env(descriptor, env_file)?;
    println!("  Environment:");
    for (name, value) in env.masked() {
        println!("    {}={}", name, value.bright_white());
    }

    let on_disk = std::fs::read_to_string(compose_file)
        .with_context(|| format!("Failed to read {}", compose_file.display()))?;
    let on_disk: serde_yaml::Value = serde_yaml::from_str(&on_disk)
        .with_context(|| format!("{} is not valid YAML", compose_file.display()))?;
    let expected: serde_yaml::Value =
        serde_yaml::from_str(&descriptor.render(Interpolation::Template)?)?;

    if on_disk != expected {
        anyhow::bail!(
            "{} differs from the descriptor; regenerate it with `admin stack render --output {}`",
            compose_file.display(),
            compose_file.display()
        );
    }
    println!("  Compose file:  {}", "up to date".green());
    println!();
    println!("{}", "✅ Stack is ready to start".green().bold());

    Ok(())
}
