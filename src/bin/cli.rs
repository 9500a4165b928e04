//! cleanwalk CLI - Debug tool for the walk tracking engine
//!
//! Usage:
//!   cleanwalk-cli replay <file.gpx> [--interval-ms <ms>] [--accuracy <m>] [--json]
//!   cleanwalk-cli simulate [--fixes <n>] [--seed <n>] [--mock-at <i>] [--speeding-at <i>] [--json]
//!
//! Both commands push a fix sequence through a walk repository exactly as
//! the app would: the first accepted fix seeds the start position, the walk
//! runs over the remaining fixes and is stopped after the last one.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use cleanwalk::geo_utils::{haversine_distance, meters_to_miles};
use cleanwalk::synthetic::SyntheticWalk;
use cleanwalk::{
    GpsPoint, LocationFix, ManualClock, OptionExt, Result, WalkConfig, WalkData, WalkError,
    WalkRepository, WalkState,
};
use log::{debug, info};

#[derive(Parser)]
#[command(name = "cleanwalk-cli")]
#[command(about = "Debug tool for walk tracking and location filtering", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print the final walk as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Speed limit in m/s (default: 20 mph)
    #[arg(long, global = true)]
    speed_limit: Option<f32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a GPX track as a walk
    Replay {
        /// GPX file to replay
        file: PathBuf,

        /// Spacing between fixes in milliseconds
        #[arg(long, default_value = "4000")]
        interval_ms: i64,

        /// Accuracy radius in meters for points without HDOP
        #[arg(long, default_value = "10")]
        accuracy: f32,
    },

    /// Run a synthetic walk
    Simulate {
        /// Number of fixes to generate
        #[arg(long, default_value = "120")]
        fixes: usize,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Flag the fix at this index as mock
        #[arg(long)]
        mock_at: Option<usize>,

        /// Report driving speed at this index
        #[arg(long)]
        speeding_at: Option<usize>,
    },
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let cli = Cli::parse();

    let mut config = WalkConfig::default();
    if let Some(limit) = cli.speed_limit {
        config.speed_limit_mps = limit;
    }

    let fixes = match cli.command {
        Commands::Replay {
            file,
            interval_ms,
            accuracy,
        } => load_gpx_fixes(&file, interval_ms, accuracy),
        Commands::Simulate {
            fixes,
            seed,
            mock_at,
            speeding_at,
        } => Ok(SyntheticWalk {
            fix_count: fixes,
            seed,
            mock_at,
            speeding_at,
            ..SyntheticWalk::default()
        }
        .generate()),
    };

    let result = fixes
        .and_then(|fixes| run_walk(fixes, config))
        .and_then(|walk| print_walk(&walk, cli.json));

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Read GPX track points as fixes spaced `interval_ms` apart.
///
/// GPX carries no speed, so each fix reports the speed implied by the
/// distance from the previous point.
fn load_gpx_fixes(path: &Path, interval_ms: i64, accuracy: f32) -> Result<Vec<LocationFix>> {
    let file = File::open(path).map_err(|e| WalkError::Gpx(e.to_string()))?;
    let gpx = gpx::read(BufReader::new(file)).map_err(|e| WalkError::Gpx(e.to_string()))?;

    let mut fixes: Vec<LocationFix> = Vec::new();
    for track in &gpx.tracks {
        for segment in &track.segments {
            for pt in &segment.points {
                let point = GpsPoint::new(pt.point().y(), pt.point().x());
                point.validate()?;
                let timestamp_ms = fixes.len() as i64 * interval_ms;
                let speed = fixes.last().map_or(0.0, |prev| {
                    haversine_distance(&prev.point, &point) / (interval_ms as f64 / 1000.0)
                });
                let fix_accuracy = pt.hdop.map_or(accuracy, |hdop| (hdop * 5.0) as f32);
                fixes.push(
                    LocationFix::new(point, timestamp_ms, fix_accuracy)
                        .with_provider("gpx")
                        .with_speed(speed as f32),
                );
            }
        }
    }

    info!("Loaded {} points from {}", fixes.len(), path.display());
    if fixes.is_empty() {
        return Err(WalkError::Gpx(format!("no track points in {}", path.display())));
    }
    Ok(fixes)
}

/// Push fixes through a repository and return the final walk.
fn run_walk(fixes: Vec<LocationFix>, config: WalkConfig) -> Result<WalkData> {
    let first_timestamp = fixes.first().ok_or_unavailable("no fixes to walk")?.timestamp_ms;
    let clock = ManualClock::new(first_timestamp);
    let repository = WalkRepository::with_clock(config, Arc::new(clock.clone()));

    let mut accepted = 0;
    for fix in fixes.iter().cloned() {
        clock.set(fix.timestamp_ms);
        if repository.update_current_location(fix) {
            accepted += 1;
        }
        if repository.walk_state() == WalkState::Idle && repository.current_location().is_some() {
            repository.start_walk();
        }
        if repository.walk_state().is_anomaly() {
            debug!("Walk ended early: {}", repository.walk_state());
            break;
        }
    }

    info!("Accepted {} of {} fixes", accepted, fixes.len());
    repository.stop_walk();
    Ok(repository.walk())
}

fn print_walk(walk: &WalkData, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(walk)?);
        return Ok(());
    }

    println!("\n{}", "=".repeat(60));
    println!("State:     {}", walk.state);
    println!("Points:    {}", walk.path.len());
    println!(
        "Distance:  {:.0}m ({:.2} mi)",
        walk.distance_meters,
        meters_to_miles(walk.distance_meters)
    );
    println!("Duration:  {:.1}s", walk.duration_millis as f64 / 1000.0);
    if let Some(b) = walk.bounds {
        println!(
            "Bounds:    [{:.5}, {:.5}] - [{:.5}, {:.5}]",
            b.min_lat, b.min_lng, b.max_lat, b.max_lng
        );
    }
    println!("{}", "=".repeat(60));
    Ok(())
}
