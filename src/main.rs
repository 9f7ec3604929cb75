use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use log::{error, info};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use pilot_logbook::configuration::{get_airports_filepath, get_log_level, get_sun_horizon, get_sun_source};
use pilot_logbook::logbook::time_format::{display_minutes, format_minutes};
use pilot_logbook::logbook::{compute_night_records, load_flights, AirportManager};
use pilot_logbook::night::NightTimeEstimator;
use pilot_logbook::sun::day_table::sun_times_around;
use pilot_logbook::sun::{build_source, SunHorizon, SunSourceKind, SunTimesSource};
use pilot_logbook::NightTime;

#[derive(Parser, Debug)]
#[command(name = "pilot_logbook")]
#[command(version = "0.1.0")]
#[command(about = "Night time of logbook flights")]
struct CliArgs {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: LogbookCommands,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Sun times source; SUN_SOURCE env var when omitted
    #[arg(long, value_enum, global = true)]
    source: Option<SunSourceKind>,

    /// Night boundary of the solar source; SUN_HORIZON env var when omitted
    #[arg(long, value_enum, global = true)]
    horizon: Option<SunHorizon>,

    /// Airports json file; AIRPORTS_FILE env var when omitted
    #[arg(long, value_name = "FILE", global = true)]
    airports: Option<String>,
}

#[derive(Subcommand, Debug)]
enum LogbookCommands {
    /// Night time of a single flight
    Night {
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: NaiveDate,
        /// takeoff, HH:MM UTC
        #[arg(long, value_name = "HH:MM")]
        start: String,
        /// landing, HH:MM UTC
        #[arg(long, value_name = "HH:MM")]
        end: String,
        /// departure airport ICAO or IATA code
        #[arg(long, value_name = "CODE")]
        from: String,
        /// destination airport ICAO or IATA code
        #[arg(long, value_name = "CODE")]
        to: String,
    },
    /// Sunrise and sunset of an airport around a day
    Sun {
        #[arg(value_name = "CODE")]
        airport: String,
        /// today when omitted
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<NaiveDate>,
    },
    /// Night time of every flight in a json file
    Logbook {
        #[arg(value_name = "FLIGHTS_FILE")]
        flights: String,
    },
}

fn sun_source(common: &CommonArgs) -> Result<Box<dyn SunTimesSource>> {
    let kind = match common.source {
        Some(kind) => kind,
        None => get_sun_source().parse::<SunSourceKind>().map_err(anyhow::Error::msg)?,
    };

    let horizon = match common.horizon {
        Some(horizon) => horizon,
        None => get_sun_horizon().parse::<SunHorizon>().map_err(anyhow::Error::msg)?,
    };

    Ok(build_source(kind, horizon)?)
}

fn load_airports(common: &CommonArgs) -> Result<AirportManager> {
    let filepath = common.airports.clone().unwrap_or_else(get_airports_filepath);
    AirportManager::from_file(&filepath).with_context(|| format!("loading airports from '{filepath}'"))
}

fn night_label(night: &NightTime) -> String {
    match night {
        NightTime::Computed(minutes) => format_minutes(*minutes),
        NightTime::Unavailable(reason) => format!("unknown ({reason})"),
    }
}

fn run(args: CliArgs) -> Result<()> {
    match args.command {
        LogbookCommands::Night { date, start, end, from, to } => {
            let airports = load_airports(&args.common)?;
            let estimator = NightTimeEstimator::new(sun_source(&args.common)?);

            let night = estimator.estimate(date, &start, &end, airports.position(&from), airports.position(&to));
            println!("{date} {from}-{to} {start}-{end}: night {}", night_label(&night));
        },

        LogbookCommands::Sun { airport, date } => {
            let airports = load_airports(&args.common)?;
            let record = airports.get(&airport).with_context(|| format!("unknown airport '{airport}'"))?;
            let point = record.position().with_context(|| format!("airport '{airport}' has no coordinates"))?;
            let source = sun_source(&args.common)?;

            let today = date.unwrap_or_else(|| Utc::now().date_naive());
            let table = sun_times_around(&source, &point, today).context("Failed to load sunrise and sunset times")?;

            println!("{record}");
            for day in table {
                println!("{:<12} sunrise {} UTC  sunset {} UTC",
                    day.label, day.window.sunrise.format("%H:%M"), day.window.sunset.format("%H:%M"));
            }
        },

        LogbookCommands::Logbook { flights } => {
            let airports = load_airports(&args.common)?;
            let estimator = NightTimeEstimator::new(sun_source(&args.common)?);
            let flights = load_flights(&flights).with_context(|| format!("loading flights from '{flights}'"))?;

            let (records, totals) = compute_night_records(flights, &airports, &estimator);
            for rec in records.iter() {
                let air = rec.air_minutes.map(display_minutes).unwrap_or_else(|| "-".into());
                let block = rec.block_minutes.map(display_minutes).unwrap_or_else(|| "-".into());
                println!("{} {:<11} block {:>6}  air {:>6}  night {}",
                    rec.flight.date, rec.flight.route(), block, air, night_label(&rec.night));
            }

            println!("{} flights, block {}, air {}, night {} ({} without night time)",
                totals.flights, display_minutes(totals.block_minutes), display_minutes(totals.air_minutes),
                display_minutes(totals.night_minutes), totals.night_unavailable);
        },
    }

    Ok(())
}

fn main() {
    if let Err(e) = TermLogger::init(get_log_level(), Config::default(), TerminalMode::Stderr, ColorChoice::Auto) {
        eprintln!("Could not initialise logger: {e}");
    }

    let args = CliArgs::parse();
    info!("Starting {:?}", args.command);

    if let Err(e) = run(args) {
        error!("{e:#}");
        std::process::exit(1);
    }
}
