//! pinmap
//!
//! Save named map locations and find the saved location nearest to you.

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use owo_colors::OwoColorize;
use pinmap_cli::output::{format_count, format_distance, Status};
use pinmap_cli::{progress, TerminalDialog, TerminalMap};
use pinmap_core::prelude::*;
use pinmap_geo::{distance_km, from_lon_lat, to_lon_lat, GeoPoint, ProjectedPoint};
use pinmap_telemetry::{counters, metrics, TelemetryConfig, Timer};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pinmap")]
#[command(about = "Save named map locations and find the nearest one")]
#[command(version)]
struct Cli {
    /// Configuration file (default: .pinmap.toml, pinmap.toml or .config/pinmap.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Storage file holding saved locations
    #[arg(long, global = true, env = "PINMAP_STORAGE")]
    storage: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Print counters and timings to stderr on exit
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Save a named location at a lon,lat coordinate
    Save {
        /// Location name
        name: String,

        /// Coordinate as lon,lat
        #[arg(long, allow_hyphen_values = true)]
        at: GeoPoint,
    },

    /// Click the map at a projected coordinate and name the location
    Click {
        /// Projected x in meters
        #[arg(allow_negative_numbers = true)]
        x: f64,

        /// Projected y in meters
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },

    /// List saved locations
    List,

    /// Show the details of a saved location
    Show {
        /// Location name
        name: String,
    },

    /// Find the saved location nearest to the current position
    Nearest {
        /// Current position as lon,lat
        #[arg(long, env = "PINMAP_POSITION", allow_hyphen_values = true)]
        from: Option<GeoPoint>,
    },

    /// List saved locations by distance from the current position
    Nearby {
        /// Current position as lon,lat
        #[arg(long, env = "PINMAP_POSITION", allow_hyphen_values = true)]
        from: Option<GeoPoint>,

        /// Only include locations within this many kilometers
        #[arg(long)]
        radius: Option<f64>,

        /// Maximum number of locations to list
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Great-circle distance between two points or saved locations
    Distance {
        /// lon,lat or a saved location name
        #[arg(allow_hyphen_values = true)]
        a: String,

        /// lon,lat or a saved location name
        #[arg(allow_hyphen_values = true)]
        b: String,
    },

    /// Project lon,lat to Web Mercator meters
    Project {
        /// Coordinate as lon,lat
        #[arg(allow_hyphen_values = true)]
        point: GeoPoint,
    },

    /// Convert Web Mercator meters back to lon,lat
    Unproject {
        #[arg(allow_negative_numbers = true)]
        x: f64,

        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            report_error(&e, cli.format);
            std::process::exit(e.exit_code());
        }
    };

    let guard = pinmap_telemetry::init_with_config(TelemetryConfig {
        log_level: config.schema.logging.level.clone(),
        verbosity: cli.verbose,
        log_file: config.schema.logging.file.clone(),
        show_target: cli.verbose >= 2,
    })?;

    if let Some(path) = &config.path {
        tracing::debug!(config = %path.display(), "Loaded configuration");
    }

    let result = run(&cli, &config);

    if cli.metrics {
        eprintln!("{}", serde_json::to_string_pretty(&metrics().export_json())?);
    }

    let code = match result {
        Ok(code) => code,
        Err(e) => {
            report_error(&e, cli.format);
            e.exit_code()
        }
    };

    // Flush the log file before exiting
    drop(guard);
    if code != exit_codes::SUCCESS {
        std::process::exit(code);
    }
    Ok(())
}

fn report_error(error: &Error, format: OutputFormat) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(&error.to_report()) {
            Ok(json) => println!("{}", json),
            Err(_) => Status::error(&error.to_string()),
        },
        OutputFormat::Text => Status::error(&error.to_string()),
    }
}

fn run(cli: &Cli, config: &Config) -> pinmap_core::Result<i32> {
    match &cli.command {
        Commands::Project { point } => return cmd_project(point, cli.format),
        Commands::Unproject { x, y } => return cmd_unproject(*x, *y, cli.format),
        _ => {}
    }

    let schema = &config.schema;
    let path = cli.storage.clone().unwrap_or_else(|| schema.storage.path.clone());
    let storage = FileStorage::open(path)?;
    let store = LocationStore::open_with_key(storage, schema.storage.key.clone());
    let mut session = MapSession::new(store, schema.geolocation.options())
        .with_initial_view(schema.map.center, schema.map.zoom)
        .with_focus_zoom(schema.map.focus_zoom);

    match &cli.command {
        Commands::Save { name, at } => cmd_save(&mut session, name, *at, cli.format),
        Commands::Click { x, y } => {
            cmd_click(&mut session, ProjectedPoint::new(*x, *y), cli.format)
        }
        Commands::List => cmd_list(&session, cli.format),
        Commands::Show { name } => cmd_show(&session, name, cli.format),
        Commands::Nearest { from } => {
            let provider = position_provider(*from, config);
            cmd_nearest(&mut session, provider.as_ref(), cli.format)
        }
        Commands::Nearby { from, radius, limit } => {
            let provider = position_provider(*from, config);
            cmd_nearby(&session, provider.as_ref(), *radius, *limit, cli.format)
        }
        Commands::Distance { a, b } => cmd_distance(&session, a, b, cli.format),
        Commands::Project { .. } | Commands::Unproject { .. } => Ok(exit_codes::SUCCESS),
    }
}

/// Where the device position comes from: `--from` or `PINMAP_POSITION`,
/// then `geolocation.position` in config.
fn position_provider(from: Option<GeoPoint>, config: &Config) -> Box<dyn LocationProvider> {
    match from.or(config.schema.geolocation.position) {
        Some(point) => Box::new(FixedLocationProvider::new(point)),
        None => Box::new(FailingLocationProvider::unsupported()),
    }
}

/// Dialog output goes to stderr in JSON mode so stdout stays parseable.
fn dialog(format: OutputFormat) -> TerminalDialog<io::StdinLock<'static>, Box<dyn Write>> {
    let output: Box<dyn Write> = match format {
        OutputFormat::Text => Box::new(io::stdout()),
        OutputFormat::Json => Box::new(io::stderr()),
    };
    TerminalDialog::new(io::stdin().lock(), output)
}

fn map(format: OutputFormat) -> TerminalMap<Box<dyn Write>> {
    let output: Box<dyn Write> = match format {
        OutputFormat::Text => Box::new(io::stdout()),
        OutputFormat::Json => Box::new(io::sink()),
    };
    TerminalMap::new(output)
}

fn print_json(value: &impl serde::Serialize) -> pinmap_core::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_save<S: KeyValueStorage>(
    session: &mut MapSession<S>,
    name: &str,
    at: GeoPoint,
    format: OutputFormat,
) -> pinmap_core::Result<i32> {
    let outcome = session.save(name.to_string(), at, &mut dialog(format), &mut map(format))?;
    metrics().increment(counters::LOCATIONS_SAVED);

    if format == OutputFormat::Json {
        print_json(&outcome)?;
    }
    Ok(exit_codes::SUCCESS)
}

fn cmd_click<S: KeyValueStorage>(
    session: &mut MapSession<S>,
    clicked: ProjectedPoint,
    format: OutputFormat,
) -> pinmap_core::Result<i32> {
    let outcome = session.handle_click(clicked, &mut dialog(format), &mut map(format))?;

    match &outcome {
        ClickOutcome::Saved { .. } => metrics().increment(counters::LOCATIONS_SAVED),
        ClickOutcome::Cancelled => {
            metrics().increment(counters::SAVES_CANCELLED);
            if format == OutputFormat::Text {
                Status::info("Nothing saved");
            }
        }
    }

    if format == OutputFormat::Json {
        print_json(&outcome)?;
    }
    Ok(exit_codes::SUCCESS)
}

fn cmd_list<S: KeyValueStorage>(
    session: &MapSession<S>,
    format: OutputFormat,
) -> pinmap_core::Result<i32> {
    let store = session.store();

    if format == OutputFormat::Json {
        print_json(&store.locations())?;
        return Ok(exit_codes::SUCCESS);
    }

    if store.is_empty() {
        Status::info("No saved locations yet");
        return Ok(exit_codes::SUCCESS);
    }

    Status::header("Saved locations");
    let mut map = TerminalMap::stdout();
    let placed = session.open_map(&mut map);

    println!();
    println!("{}", format_count(placed, "location", "locations").dimmed());
    let skipped = store.len() - placed;
    if skipped > 0 {
        Status::warning(&format!(
            "{} without a usable coordinate",
            format_count(skipped, "entry", "entries")
        ));
    }
    Ok(exit_codes::SUCCESS)
}

fn cmd_show<S: KeyValueStorage>(
    session: &MapSession<S>,
    name: &str,
    format: OutputFormat,
) -> pinmap_core::Result<i32> {
    let (index, location) = session
        .store()
        .find_by_name(name)
        .ok_or_else(|| Error::location_not_found(name))?;

    if format == OutputFormat::Json {
        print_json(&serde_json::json!({ "index": index, "location": location }))?;
        return Ok(exit_codes::SUCCESS);
    }

    session.show_details(index, &mut dialog(format))?;
    Ok(exit_codes::SUCCESS)
}

fn cmd_nearest<S: KeyValueStorage>(
    session: &mut MapSession<S>,
    provider: &dyn LocationProvider,
    format: OutputFormat,
) -> pinmap_core::Result<i32> {
    metrics().increment(counters::NEAREST_LOOKUPS);
    let timer = Timer::start("nearest_lookup");
    let spinner = progress::locating(format == OutputFormat::Json);

    let mut dialog = dialog(format);
    let mut map = map(format);
    let outcome = session.locate_nearest(provider, &mut dialog, &mut map);

    progress::finish(&spinner);
    timer.stop();
    let outcome = outcome?;

    let code = match &outcome {
        NearestOutcome::LocationUnavailable { .. } => {
            metrics().increment(counters::GEOLOCATION_FAILURES);
            exit_codes::GEOLOCATION_ERROR
        }
        _ => exit_codes::SUCCESS,
    };

    if format == OutputFormat::Json {
        print_json(&outcome)?;
    }
    Ok(code)
}

fn cmd_nearby<S: KeyValueStorage>(
    session: &MapSession<S>,
    provider: &dyn LocationProvider,
    radius: Option<f64>,
    limit: Option<usize>,
    format: OutputFormat,
) -> pinmap_core::Result<i32> {
    if let Some(radius) = radius {
        if !radius.is_finite() || radius < 0.0 {
            return Err(Error::validation(format!("Invalid radius: {}", radius))
                .with_suggestion("Pass a radius in kilometers, zero or more"));
        }
    }

    let spinner = progress::locating(format == OutputFormat::Json);
    let reply = session.request_position(provider);
    progress::finish(&spinner);

    let position = match reply? {
        Ok(position) => position,
        Err(error) => {
            metrics().increment(counters::GEOLOCATION_FAILURES);
            if format == OutputFormat::Json {
                print_json(&serde_json::json!({ "outcome": "location_unavailable", "error": error }))?;
            } else {
                Status::warning(&format!("Location not found: {}", error));
            }
            return Ok(exit_codes::GEOLOCATION_ERROR);
        }
    };

    let store = session.store();
    let mut ranked = match radius {
        Some(radius) => store.within_radius(&position.point, radius),
        None => store.ranked(&position.point, None),
    };
    if let Some(limit) = limit {
        ranked.truncate(limit);
    }

    if format == OutputFormat::Json {
        let entries: Vec<_> = ranked
            .iter()
            .filter_map(|r| {
                store.get(r.index).map(|location| {
                    serde_json::json!({
                        "index": r.index,
                        "name": location.name(),
                        "coordinate": location.coordinate(),
                        "distance_km": r.distance_km,
                    })
                })
            })
            .collect();
        print_json(&entries)?;
        return Ok(exit_codes::SUCCESS);
    }

    if ranked.is_empty() {
        Status::info("No saved locations nearby");
        return Ok(exit_codes::SUCCESS);
    }

    Status::header(&format!("Nearby {}", position.point));
    for entry in &ranked {
        if let Some(location) = store.get(entry.index) {
            println!(
                "{:>10}  {}",
                format_distance(entry.distance_km).cyan(),
                location.name().bold()
            );
        }
    }
    Ok(exit_codes::SUCCESS)
}

/// A `lon,lat` pair, or the name of a saved location.
fn resolve_point<S: KeyValueStorage>(
    session: &MapSession<S>,
    arg: &str,
) -> pinmap_core::Result<GeoPoint> {
    if let Ok(point) = arg.parse::<GeoPoint>() {
        return Ok(point);
    }
    let (_, location) = session
        .store()
        .find_by_name(arg)
        .ok_or_else(|| Error::location_not_found(arg))?;
    location.point().ok_or_else(|| {
        Error::new(
            ErrorCode::InvalidCoordinate,
            format!("Saved location \"{}\" has no usable coordinate", arg),
        )
    })
}

fn cmd_distance<S: KeyValueStorage>(
    session: &MapSession<S>,
    a: &str,
    b: &str,
    format: OutputFormat,
) -> pinmap_core::Result<i32> {
    let from = resolve_point(session, a)?;
    let to = resolve_point(session, b)?;
    let km = distance_km(&from, &to);

    if format == OutputFormat::Json {
        print_json(&serde_json::json!({ "from": from, "to": to, "distance_km": km }))?;
    } else {
        println!("{}", format_distance(km));
    }
    Ok(exit_codes::SUCCESS)
}

fn cmd_project(point: &GeoPoint, format: OutputFormat) -> pinmap_core::Result<i32> {
    if !point.is_valid() {
        return Err(Error::new(
            ErrorCode::InvalidCoordinate,
            format!("Coordinate out of range: {}", point),
        ));
    }
    let projected = from_lon_lat(point);

    if format == OutputFormat::Json {
        print_json(&projected)?;
    } else {
        println!("{}", projected);
    }
    Ok(exit_codes::SUCCESS)
}

fn cmd_unproject(x: f64, y: f64, format: OutputFormat) -> pinmap_core::Result<i32> {
    let projected = ProjectedPoint::checked(x, y)?;
    let point = to_lon_lat(&projected);

    if format == OutputFormat::Json {
        print_json(&point)?;
    } else {
        println!("{}", point);
    }
    Ok(exit_codes::SUCCESS)
}
