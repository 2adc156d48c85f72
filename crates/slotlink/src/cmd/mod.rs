use std::num::NonZeroU8;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use slotlink_engine::{SlotConfig, UpdateRate};
use slotlink_frame::Value;
use slotlink_transport::Location;

use crate::exit::{CliResult, DATA_INVALID};
use crate::output::OutputFormat;

pub mod sim;
pub mod table;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Drive two mailbox engines over a lossy in-process link.
    Sim(SimArgs),
    /// Print a slot table configuration.
    Table(TableArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Sim(args) => sim::run(args, format),
        Command::Table(args) => table::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct SimArgs {
    /// Number of rounds to simulate.
    #[arg(long, default_value = "20")]
    pub rounds: u32,
    /// Drop every Nth frame in each direction (0 = lossless).
    #[arg(long, default_value = "0", value_name = "N")]
    pub drop_every: usize,
    /// Slot table JSON file. Default: the built-in demo table.
    #[arg(long, value_name = "FILE")]
    pub table: Option<PathBuf>,
    /// Broadcast the round counter every N rounds.
    #[arg(long, value_name = "N")]
    pub sync_interval: Option<NonZeroU8>,
    /// Retransmit unacknowledged entries, up to N attempts each.
    #[arg(long, value_name = "N")]
    pub retry: Option<u8>,
}

#[derive(Args, Debug)]
pub struct TableArgs {
    /// Slot table JSON file. Default: the built-in demo table.
    #[arg(long, value_name = "FILE")]
    pub table: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// The built-in demo table: a periodic telemetry float, an async command
/// uint, and a slow status boolean.
pub fn demo_table() -> Vec<SlotConfig> {
    let every = |n: u8| UpdateRate::EveryRounds(NonZeroU8::new(n).expect("nonzero rate"));
    vec![
        SlotConfig {
            name: "pressure".into(),
            initial: Value::Float32(0.0),
            rate: every(1),
            source: Location::Mcu,
            destination: Location::Host,
        },
        SlotConfig {
            name: "setpoint".into(),
            initial: Value::Uint32(0),
            rate: UpdateRate::Async,
            source: Location::Host,
            destination: Location::Mcu,
        },
        SlotConfig {
            name: "armed".into(),
            initial: Value::Boolean(false),
            rate: every(5),
            source: Location::Mcu,
            destination: Location::Host,
        },
    ]
}

/// Load a slot table from a JSON file, or fall back to the demo table.
pub fn load_table(path: Option<&PathBuf>) -> CliResult<Vec<SlotConfig>> {
    let Some(path) = path else {
        return Ok(demo_table());
    };
    let raw = std::fs::read_to_string(path)
        .map_err(|err| crate::exit::io_error(&format!("reading {}", path.display()), err))?;
    let slots: Vec<SlotConfig> = serde_json::from_str(&raw).map_err(|err| {
        crate::exit::CliError::new(
            DATA_INVALID,
            format!("parsing {}: {err}", path.display()),
        )
    })?;
    Ok(slots)
}
