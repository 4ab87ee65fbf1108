mod alarm;
mod alert;
mod audio;
mod clock;
mod diagnostics;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use crate::alarm::model::{AlarmSeed, load_alarm_seed};
use crate::alarm::registry::AlarmRegistry;
use crate::alarm::scheduler::AlarmScheduler;
use crate::clock::{Country, TimeDisplayMode, WallClock};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliCountry {
    Thailand,
    Usa,
    Japan,
    Uk,
    France,
    Germany,
    Australia,
}

impl From<CliCountry> for Country {
    fn from(value: CliCountry) -> Self {
        match value {
            CliCountry::Thailand => Country::Thailand,
            CliCountry::Usa => Country::Usa,
            CliCountry::Japan => Country::Japan,
            CliCountry::Uk => Country::Uk,
            CliCountry::France => Country::France,
            CliCountry::Germany => Country::Germany,
            CliCountry::Australia => Country::Australia,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliTimeFormat {
    #[value(name = "24h")]
    Hour24,
    #[value(name = "12h")]
    Hour12,
}

impl From<CliTimeFormat> for TimeDisplayMode {
    fn from(value: CliTimeFormat) -> Self {
        match value {
            CliTimeFormat::Hour24 => TimeDisplayMode::Hour24,
            CliTimeFormat::Hour12 => TimeDisplayMode::Hour12,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "mealclock",
    version,
    about = "Meal reminder clock with country-picked timezones"
)]
struct Cli {
    #[arg(long)]
    alarms: Option<PathBuf>,

    #[arg(long, value_enum)]
    country: Option<CliCountry>,

    #[arg(long = "time-format", value_enum, default_value_t = CliTimeFormat::Hour24)]
    time_format: CliTimeFormat,

    #[arg(long)]
    diagnostics: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    if let Err(err) = simple_file_logger::init_logger!("mealclock") {
        // missing log file is no reason to skip a meal
        eprintln!("warning: file logging unavailable: {err}");
    }

    let cli = Cli::parse();

    let seed = match &cli.alarms {
        Some(path) => load_alarm_seed(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => AlarmSeed::default_meals(),
    };

    let country = cli
        .country
        .map(Country::from)
        .or(seed.country)
        .unwrap_or_default();
    let registry = AlarmRegistry::from_seed(&seed);
    let scheduler = AlarmScheduler::new();
    let clock = WallClock::system(country);

    if cli.diagnostics {
        return diagnostics::run_diagnostics(&clock, &registry, cli.time_format.into());
    }

    ui::app::run_gui(clock, registry, scheduler, cli.time_format.into())
}
