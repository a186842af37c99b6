use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crew_tracker::api::{build_router, state::AppState};
use crew_tracker::calculate::ranking::{attach_names, attach_overall_names};
use crew_tracker::calculate::{
    format_split, parse_time_str, rank_overall, rank_test_type, split_from_watts,
    watts_from_split, PieceMetrics, TimeValue,
};
use crew_tracker::config::AppConfig;
use crew_tracker::models::{
    AthleteId, AthleteProfile, PerformanceRecord, RankingScope, Team, TeamId,
};
use crew_tracker::storage::{JsonlReader, StorageConfig, TeamStore};

#[derive(Parser)]
#[command(name = "crew-tracker")]
#[command(about = "Rowing team performance tracker: erg tests, splits, watts and rankings")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,

        /// Log all HTTP requests
        #[arg(long)]
        access_log: bool,
    },

    /// Print team rankings
    Rankings {
        /// Test type (e.g. "2k"); omit or use "overall" for the combined ranking
        #[arg(long)]
        test_type: Option<String>,

        /// Restrict to a team roster
        #[arg(long)]
        team: Option<String>,
    },

    /// Convert between time, split and watts
    Convert {
        /// Piece time (e.g. "6:40.5"), requires --test-type
        #[arg(long)]
        time: Option<String>,

        #[arg(long)]
        test_type: Option<String>,

        /// 500m split (e.g. "1:45.0")
        #[arg(long)]
        split: Option<String>,

        /// Power in watts
        #[arg(long)]
        watts: Option<f64>,
    },

    /// Create a team
    AddTeam {
        #[arg(long)]
        name: String,
    },

    /// Register an athlete profile
    AddAthlete {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// Team to roster the athlete on
        #[arg(long)]
        team: Option<String>,
    },

    /// Log a test piece
    AddPerformance {
        /// Athlete id
        #[arg(long)]
        athlete: String,

        #[arg(long)]
        test_type: String,

        /// Time as "M:SS.s", "H:MM:SS.s" or seconds; omit for an incomplete piece
        #[arg(long)]
        time: Option<String>,

        /// Date of the piece (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Import performance documents from a JSON array or JSONL file
    Import { path: String },

    /// Show a team roster
    Roster {
        #[arg(long)]
        team: String,
    },
}

/// Numbers are stored as raw seconds, anything else as entered.
fn time_value_from_arg(raw: &str) -> TimeValue {
    match raw.trim().parse::<f64>() {
        Ok(seconds) => TimeValue::Seconds(seconds),
        Err(_) => TimeValue::Text(raw.trim().to_string()),
    }
}

fn load_records(path: &str) -> Result<Vec<PerformanceRecord>> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    if contents.trim_start().starts_with('[') {
        serde_json::from_str(&contents).with_context(|| format!("Invalid JSON array in {}", path))
    } else {
        Ok(JsonlReader::new(PathBuf::from(path)).read_all()?)
    }
}

fn print_rankings(store: &TeamStore, test_type: Option<&str>, team: Option<&str>) -> Result<()> {
    let records = match team {
        Some(team_id) => {
            let team_id = TeamId::from(team_id);
            let Some(team) = store.team(&team_id)? else {
                bail!("Unknown team: {}", team_id);
            };
            store.performances_for_team(&team)?
        }
        None => store.performances()?,
    };
    let names = store.athlete_names()?;

    match RankingScope::from_filter(test_type) {
        RankingScope::Overall => {
            let mut rows = rank_overall(&records);
            attach_overall_names(&mut rows, &names);
            println!("=== Overall Ranking ({} athletes) ===\n", rows.len());
            for row in &rows {
                println!(
                    "{:>3}. {:<24} {:>6.1}  ({} tests)",
                    row.rank,
                    row.athlete_name.as_deref().unwrap_or(row.athlete_id.as_str()),
                    row.average_percentile,
                    row.tests_counted
                );
            }
        }
        RankingScope::TestType(test_type) => {
            let mut rows = rank_test_type(&records, &test_type);
            attach_names(&mut rows, &names);
            println!("=== {} Ranking ({} athletes) ===\n", test_type, rows.len());
            for row in &rows {
                println!(
                    "{:>3}. {:<24} {:>10}  split {:>7}  {:>4}W",
                    row.rank,
                    row.athlete_name.as_deref().unwrap_or(row.athlete_id.as_str()),
                    row.best_time_display,
                    format_split(row.split),
                    row.watts.map(|w| w.to_string()).unwrap_or_else(|| "-".to_string())
                );
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&PathBuf::from(&cli.config))?;
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = PathBuf::from(data_dir);
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    config.json_logs |= cli.json_logs;
    config.validate()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting crew-tracker v{}", env!("CARGO_PKG_VERSION"));

    let storage = StorageConfig::new(config.data_dir.clone());
    let store = TeamStore::new(storage.clone());

    match cli.command {
        Commands::Serve {
            host,
            port,
            access_log,
        } => {
            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);

            let mut app = build_router(AppState::new(storage), &config.server.cors_origin);
            if access_log {
                app = app.layer(TraceLayer::new_for_http());
            }

            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Rankings { test_type, team } => {
            print_rankings(&store, test_type.as_deref(), team.as_deref())?;
        }
        Commands::Convert {
            time,
            test_type,
            split,
            watts,
        } => {
            if let Some(time) = time {
                let Some(test_type) = test_type else {
                    bail!("--time requires --test-type");
                };
                let metrics = PieceMetrics::derive(Some(&time_value_from_arg(&time)), &test_type);
                if metrics.seconds.is_none() {
                    bail!("Unreadable time: {}", time);
                }
                println!("Time:   {}", metrics.time_display);
                println!("Split:  {}", metrics.split_display);
                match metrics.watts {
                    Some(w) => println!("Watts:  {}", w),
                    None => println!("Watts:  N/A ({} has no fixed distance)", test_type),
                }
            } else if let Some(split) = split {
                let seconds = parse_time_str(&split);
                let Some(w) = watts_from_split(seconds) else {
                    bail!("Unreadable split: {}", split);
                };
                println!("Split:  {}", format_split(Some(seconds)));
                println!("Watts:  {}", w);
            } else if let Some(watts) = watts {
                let Some(s) = split_from_watts(watts) else {
                    bail!("Watts must be a positive number");
                };
                println!("Watts:  {}", watts);
                println!("Split:  {}", format_split(Some(s)));
            } else {
                eprintln!("Specify --time with --test-type, --split or --watts");
            }
        }
        Commands::AddTeam { name } => {
            let team = Team::new(name);
            if store.add_team(&team)? {
                println!("Created team {} ({})", team.name, team.id);
            } else {
                println!("Team {} already exists ({})", team.name, team.id);
            }
        }
        Commands::AddAthlete { name, email, team } => {
            let profile = AthleteProfile::new(name, email);
            let team_id = team.map(TeamId::from);
            let created = store.add_athlete(&profile, team_id.as_ref())?;
            println!(
                "{} athlete {} ({})",
                if created { "Added" } else { "Updated roster for" },
                profile.name,
                profile.id
            );
        }
        Commands::AddPerformance {
            athlete,
            test_type,
            time,
            date,
            notes,
        } => {
            let athlete_id = AthleteId::from(athlete);
            if store.athlete(&athlete_id)?.is_none() {
                bail!("Unknown athlete: {}", athlete_id);
            }
            let date = match date {
                Some(d) => NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                    .with_context(|| format!("Invalid --date (expected YYYY-MM-DD): {}", d))?,
                None => chrono::Utc::now().date_naive(),
            };

            let mut record = PerformanceRecord::new(
                athlete_id,
                test_type,
                time.as_deref().map(time_value_from_arg),
                date,
            );
            if let Some(notes) = notes {
                record = record.with_notes(notes);
            }

            if !store.add_performance(&record)? {
                println!("Already logged ({})", record.id);
                return Ok(());
            }

            let metrics = PieceMetrics::derive(record.time.as_ref(), &record.test_type);
            println!("Logged {} {} ({})", record.test_type, metrics.time_display, record.id);
            if metrics.seconds.is_none() {
                println!("(no valid time; excluded from rankings)");
            } else if let Some(w) = metrics.watts {
                println!("Split {}  {}W", metrics.split_display, w);
            }
        }
        Commands::Import { path } => {
            let records = load_records(&path)?;
            let total = records.len();
            let written = store.import_performances(records)?;
            println!("\n=== Import Results ===");
            println!("Documents read:   {}", total);
            println!("New records:      {}", written);
            println!("Already stored:   {}", total - written);
        }
        Commands::Roster { team } => {
            let team_id = TeamId::from(team);
            let Some(roster) = store.roster(&team_id)? else {
                bail!("Unknown team: {}", team_id);
            };
            println!("=== Roster ({} athletes) ===\n", roster.len());
            for athlete in roster {
                println!("  {:<24} {:<32} {}", athlete.name, athlete.email, athlete.id);
            }
        }
    }

    Ok(())
}
