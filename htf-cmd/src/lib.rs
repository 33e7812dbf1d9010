//! Command implementations for the HTF CLI.
//!
//! Each subcommand reads what it needs from the data directory into a fresh
//! in-memory store, runs the analysis for one station and prints a JSON
//! report to stdout.

use clap::{Args, Subcommand};
use htf_core::scenario::Scenario;
use htf_db::Database;
use serde::Serialize;

pub mod config;
pub mod data_dir;
pub mod report;

use config::{GlobalOptions, RequestConfig};
use data_dir::DataDir;
use report::StationContext;

/// Station and threshold selection shared by the per-station commands.
#[derive(Args, Debug, Clone)]
pub struct Selection {
    /// Tide gauge station id
    #[arg(short = 's', long)]
    pub station: String,

    /// Threshold: a category (minor, nws_moderate, 10yr, ...), a three-digit
    /// centimeter key (070) or a height in the display unit (2.3)
    #[arg(short = 't', long)]
    pub threshold: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ScenarioSelection {
    #[command(flatten)]
    pub selection: Selection,

    /// Sea level rise scenario: traj, low, int_low, int, int_high, high
    #[arg(long, default_value = "int")]
    pub scenario: Scenario,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the station registry
    Stations,

    /// Reference levels, threshold options and return-period context for a station
    Levels {
        #[command(flatten)]
        selection: Selection,
    },

    /// Resolve a threshold against a station's levels
    Threshold {
        #[command(flatten)]
        selection: Selection,
    },

    /// Observed flooding days above a threshold
    Observed {
        #[command(flatten)]
        selection: Selection,

        /// Take annual/monthly tables from the precomputed observed payload
        #[arg(long)]
        precomputed: bool,
    },

    /// Normalized ensemble projection tables
    Projection {
        #[command(flatten)]
        scenario: ScenarioSelection,
    },

    /// Year of inflection of the projected median flooding days
    Yoi {
        #[command(flatten)]
        scenario: ScenarioSelection,
    },

    /// Numbers behind the projection and long-term change narratives
    Narrative {
        #[command(flatten)]
        scenario: ScenarioSelection,
    },

    /// Scenarios with a projection for a station and threshold
    Scenarios {
        #[command(flatten)]
        selection: Selection,
    },

    /// Convert station-datum levels to an MHHW-relative level payload
    Normalize {
        /// Path to the published station levels JSON
        #[arg(short = 'i', long)]
        input: String,
    },
}

pub fn run(options: GlobalOptions, command: Command) -> anyhow::Result<()> {
    let data = DataDir::new(&options.data_dir);
    let db = Database::new()?;
    match command {
        Command::Stations => {
            data.load_stations(&db)?;
            print_json(&db.query_stations()?)
        }
        Command::Levels { selection } => {
            let (context, _) = open_station(&data, &db, &options, &selection, Scenario::default())?;
            print_json(&report::levels_report(&context))
        }
        Command::Threshold { selection } => {
            let (context, config) =
                open_station(&data, &db, &options, &selection, Scenario::default())?;
            print_json(&report::threshold_report(&context, &config))
        }
        Command::Observed {
            selection,
            precomputed,
        } => {
            let (context, config) =
                open_station(&data, &db, &options, &selection, Scenario::default())?;
            data.load_daily(&db, &context.station.id)?;
            data.load_observed(&db, &context.station.id, &context.selection.key)?;
            print_json(&report::observed_report(&db, &context, &config, precomputed)?)
        }
        Command::Projection { scenario } => {
            let (context, config) = open_projection(&data, &db, &options, &scenario)?;
            print_json(&report::projection_report(&db, &context, &config)?)
        }
        Command::Yoi { scenario } => {
            let (context, config) = open_projection(&data, &db, &options, &scenario)?;
            print_json(&report::yoi_report(&db, &context, &config)?)
        }
        Command::Narrative { scenario } => {
            let (context, config) = open_projection(&data, &db, &options, &scenario)?;
            data.load_observed(&db, &context.station.id, &context.selection.key)?;
            print_json(&report::narrative_report(&db, &context, &config)?)
        }
        Command::Scenarios { selection } => {
            let (context, _) = open_station(&data, &db, &options, &selection, Scenario::default())?;
            for scenario in Scenario::ALL {
                data.load_projection(&db, &context.station.id, scenario, &context.selection.key)?;
            }
            print_json(&report::scenarios_report(&db, &context)?)
        }
        Command::Normalize { input } => {
            let json = data_dir::read_optional(std::path::Path::new(&input))?
                .ok_or_else(|| anyhow::anyhow!("{} not found", input))?;
            print_json(&report::normalize_levels(&json)?)
        }
    }
}

/// Load a station's registry entry and levels and resolve the threshold.
fn open_station(
    data: &DataDir,
    db: &Database,
    options: &GlobalOptions,
    selection: &Selection,
    scenario: Scenario,
) -> anyhow::Result<(StationContext, RequestConfig)> {
    data.load_station(db, &selection.station)?;
    data.load_levels(db, &selection.station)?;
    let config = RequestConfig::new(options.units, scenario, selection.threshold.clone());
    let context = StationContext::resolve(db, &selection.station, &config)?;
    log::debug!("[HTF] cmd: store {:?}", db.query_summary()?);
    Ok((context, config))
}

fn open_projection(
    data: &DataDir,
    db: &Database,
    options: &GlobalOptions,
    scenario: &ScenarioSelection,
) -> anyhow::Result<(StationContext, RequestConfig)> {
    let (context, config) =
        open_station(data, db, options, &scenario.selection, scenario.scenario)?;
    let found = data.load_projection(db, &context.station.id, config.scenario, &context.selection.key)?;
    if !found {
        log::info!(
            "[HTF] cmd: no {} projection for {} at {}",
            config.scenario,
            context.station.id,
            context.selection.key
        );
    }
    Ok((context, config))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
