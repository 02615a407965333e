use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ft_cli::commands::{pause, resume, start, status, stop, summary};
use ft_cli::{Cli, Commands, Config};
use ft_core::{SessionEngine, SystemClock, UserId};
use ft_db::SessionStore;

/// Load config and open the database, ensuring the parent directory exists.
fn open_engine(
    config_path: Option<&Path>,
) -> Result<(SessionEngine<SessionStore, SystemClock>, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let store = SessionStore::open(&config.database_path).context("failed to open database")?;
    Ok((SessionEngine::new(store, SystemClock), config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut engine, config) = open_engine(cli.config.as_deref())?;
    let user = UserId::new(cli.user.as_deref().unwrap_or(&config.user))
        .context("invalid user")?;
    let stdout = std::io::stdout();
    let mut writer = stdout.lock();

    match command {
        Commands::Start { kind, minutes, at } => {
            start::run(&mut writer, &mut engine, &user, *kind, *minutes, at.as_deref())?;
        }
        Commands::Pause {
            session,
            at,
            remaining,
        } => {
            pause::run(
                &mut writer,
                &mut engine,
                &user,
                session.as_deref(),
                at.as_deref(),
                *remaining,
            )?;
        }
        Commands::Resume { session, remaining } => {
            resume::run(&mut writer, &mut engine, &user, session.as_deref(), *remaining)?;
        }
        Commands::Stop { kind, session, at } => {
            stop::run(
                &mut writer,
                &mut engine,
                &user,
                *kind,
                session.as_deref(),
                at.as_deref(),
            )?;
        }
        Commands::Status { json } => {
            status::run(&mut writer, &engine, &user, *json)?;
        }
        Commands::Summary { date, json } => {
            summary::run(&mut writer, &engine, &user, *date, *json)?;
        }
    }
    writer.flush()?;

    Ok(())
}
