// Scout desk entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file)
// 2. Load config
// 3. Open database, seeding it from data/ when it holds no squads
// 4. Build the rating calculator for the configured club
// 5. Load the roster (CSV if configured, database otherwise)
// 6. Rate the requested squad and print the report as JSON
//
// Usage: scoutdesk [SQUAD_ID]
//        scoutdesk --list
//        scoutdesk seed

use std::path::Path;

use anyhow::{bail, Context};
use tracing::{error, info, warn};

use scout_assistant::config::{self, Config};
use scout_assistant::db::Database;
use scout_assistant::rating::RatingCalculator;
use scout_assistant::roster;
use scout_assistant::seed;
use scout_assistant::store;

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("Scout desk starting up");

    if let Err(e) = run() {
        error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

fn run() -> anyhow::Result<()> {
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: club={} ({}), {} weight overrides",
        config.club.name,
        config.club.id,
        config.ratings.overrides.len()
    );

    let db = Database::open(&config.db_path).context("failed to open database")?;
    info!("Database opened at {}", config.db_path);

    let arg = std::env::args().nth(1);
    if arg.as_deref() == Some("seed") || db.squad_ids()?.is_empty() {
        info!("Seeding database from configured data files");
        seed_store(&config, &db)?;
    }

    if matches!(arg.as_deref(), Some("seed" | "--list")) {
        for id in db.squad_ids()? {
            println!("{id}");
        }
        return Ok(());
    }

    let stored = store::load_calculator(&db, &config.club.id)?;
    let calculator = RatingCalculator::new(
        config.club.id.clone(),
        config.ratings.apply(stored.table()),
    );

    let roster = match &config.data_paths.roster {
        Some(path) if Path::new(path).exists() => roster::load_roster(Path::new(path))
            .with_context(|| format!("failed to load roster from {path}"))?,
        _ => store::load_roster(&db)?,
    };
    info!("Roster ready: {} players", roster.len());

    let Some(squad_id) = arg.or_else(|| config.default_squad.clone()) else {
        bail!("no squad id given and no [squad] default configured");
    };

    let Some(report) = store::report_squad(&db, &roster, &calculator, &squad_id)? else {
        bail!("squad '{squad_id}' not found");
    };
    info!(
        "Rated squad {} ({}): starter rating {:.1}",
        report.squad_id,
        report.formation,
        report.starter_rating()
    );

    let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
    println!("{json}");
    Ok(())
}

/// Write the configured roster CSV and squads file into the database.
fn seed_store(config: &Config, db: &Database) -> anyhow::Result<()> {
    let players = match &config.data_paths.roster {
        Some(path) if Path::new(path).exists() => roster::load_players(Path::new(path))
            .with_context(|| format!("failed to load roster from {path}"))?,
        _ => Vec::new(),
    };
    let squads = match &config.data_paths.squads {
        Some(path) if Path::new(path).exists() => seed::load_squads(Path::new(path))
            .with_context(|| format!("failed to load squads from {path}"))?,
        _ => {
            warn!("No squads file configured or found; nothing to seed");
            Vec::new()
        }
    };
    seed::seed_database(db, &players, &squads)
}

/// Initialize tracing to log to a file so stdout carries only the report.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("scoutdesk.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("scout_assistant=info,scoutdesk=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
