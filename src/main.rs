//! Mining Extraction Calculator
//!
//! Throughput calculator for ore, ice and gas mining setups.

mod calculator;
mod db;
mod error;
mod models;
mod session;

use std::convert::Infallible;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use rusqlite::Connection;
use tracing::{Level, info};

use crate::calculator::FormattedMetrics;
use crate::models::{FieldEdit, Mode, ResourceType, Setup, SetupId};
use crate::session::Session;

#[derive(Parser)]
#[command(name = "mining-calculator")]
#[command(about = "Extraction throughput calculator for ore, ice and gas mining")]
struct Cli {
    /// Path to the SQLite database holding preferences
    #[arg(short, long, default_value = "mining_calculator.db")]
    database: PathBuf,

    /// Log every recalculation
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate a single setup
    Calc {
        #[arg(long, value_enum, default_value_t = ResourceType::Ore)]
        resource: ResourceType,

        /// Resource name shown in the heading
        #[arg(long, default_value = "")]
        name: String,

        /// Number of mining modules
        #[arg(short, long, default_value_t = 1, value_parser = lenient_count, allow_hyphen_values = true)]
        modules: u32,

        /// Yield per module per cycle in m³
        #[arg(short = 'y', long, default_value_t = 100.0, value_parser = lenient_number, allow_hyphen_values = true)]
        yield_per_cycle: f64,

        /// Cycle time in seconds
        #[arg(short, long, default_value_t = 60.0, value_parser = lenient_number, allow_hyphen_values = true)]
        cycle_time: f64,

        /// Residue lost each cycle, in percent
        #[arg(short, long, default_value_t = 0.0, value_parser = lenient_number, allow_hyphen_values = true)]
        residue: f64,

        /// Target quantity (m³, or units for gas)
        #[arg(short, long, default_value_t = 10_000.0, value_parser = lenient_number, allow_hyphen_values = true)]
        target: f64,

        /// Volume of one gas unit in m³
        #[arg(short, long, default_value_t = 1.0, value_parser = lenient_number, allow_hyphen_values = true)]
        unit_size: f64,
    },

    /// Compare two setups built from defaults plus field=value edits
    Compare {
        /// Edit for setup 1, e.g. numModules=2 (repeatable)
        #[arg(long, value_parser = FieldEdit::parse_pair)]
        first: Vec<FieldEdit>,

        /// Edit for setup 2, e.g. cycleTime=45 (repeatable)
        #[arg(long, value_parser = FieldEdit::parse_pair)]
        second: Vec<FieldEdit>,
    },

    /// Start an interactive session
    Interactive,

    /// Show or change the dark mode preference
    DarkMode {
        #[arg(value_enum)]
        action: Option<DarkModeAction>,
    },
}

/// Numeric flags follow the session rules: anything unparseable becomes 0
fn lenient_number(raw: &str) -> Result<f64, Infallible> {
    Ok(models::coerce_number(raw))
}

fn lenient_count(raw: &str) -> Result<u32, Infallible> {
    Ok(models::coerce_count(raw))
}

#[derive(Clone, Copy, ValueEnum)]
enum DarkModeAction {
    On,
    Off,
    Toggle,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .without_time()
        .compact()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let conn = Connection::open(&cli.database)?;
    db::init_schema(&conn)?;

    match cli.command {
        Commands::Calc {
            resource,
            name,
            modules,
            yield_per_cycle,
            cycle_time,
            residue,
            target,
            unit_size,
        } => {
            let mut setup = Setup {
                resource_type: resource,
                resource_name: name,
                num_modules: modules,
                yield_per_cycle,
                cycle_time,
                residue_percentage: residue,
                target_volume: target,
                unit_size,
            };
            let metrics = calculator::compute(&mut setup);
            println!(
                "Target: {} {}",
                setup.target_volume,
                calculator::target_unit_label(setup.resource_type)
            );
            println!("{}", FormattedMetrics::from(&metrics));
        }

        Commands::Compare { first, second } => {
            let mut session = Session::new();
            session.set_mode(Mode::Compare);
            for edit in first {
                session.apply(SetupId::First, edit);
            }
            for edit in second {
                session.apply(SetupId::Second, edit);
            }
            print_session(&session);
        }

        Commands::Interactive => run_interactive(&conn)?,

        Commands::DarkMode { action } => {
            let enabled = match action {
                None => db::load_dark_mode(&conn)?,
                Some(DarkModeAction::On) => {
                    db::save_dark_mode(&conn, true)?;
                    true
                }
                Some(DarkModeAction::Off) => {
                    db::save_dark_mode(&conn, false)?;
                    false
                }
                Some(DarkModeAction::Toggle) => db::toggle_dark_mode(&conn)?,
            };
            println!("Dark mode: {}", on_off(enabled));
        }
    }

    Ok(())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

fn print_session(session: &Session) {
    for card in session.visible_cards() {
        println!("{card}\n");
    }
    if session.mode() == Mode::Compare {
        match session.winner() {
            Some(id) => println!("Most efficient: setup {id}"),
            None => println!("No clear winner"),
        }
    }
}

const HELP: &str = "\
Commands:
  set <1|2> <field> <value>   Change a field (resourceType, resourceName, numModules,
                              yieldPerCycle, cycleTime, residuePercentage,
                              targetVolume, unitSize)
  mode <single|compare>       Switch between one setup and side-by-side comparison
  dark                        Toggle dark mode (saved across sessions)
  show                        Print the current results
  help                        Show this message
  quit                        Leave the session";

/// Line-oriented session acting as both the input and display surface
fn run_interactive(conn: &Connection) -> Result<()> {
    let dark_mode = db::load_dark_mode(conn)?;
    info!(dark_mode, "starting session");
    println!("Dark mode: {}", on_off(dark_mode));
    println!("{HELP}\n");

    let mut session = Session::new();
    print_session(&session);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

        match command {
            "" => {}
            "quit" | "exit" => break,
            "help" => println!("{HELP}"),
            "show" => print_session(&session),
            "dark" => {
                let enabled = db::toggle_dark_mode(conn)?;
                info!(dark_mode = enabled, "preference saved");
                println!("Dark mode: {}", on_off(enabled));
            }
            "mode" => match rest.parse::<Mode>() {
                Ok(mode) => {
                    session.set_mode(mode);
                    print_session(&session);
                }
                Err(e) => println!("Error: {e}"),
            },
            "set" => match parse_set(rest) {
                Ok((id, edit)) => {
                    session.apply(id, edit);
                    print_session(&session);
                }
                Err(e) => println!("Error: {e}"),
            },
            other => println!("Unknown command '{other}', type 'help' for a list"),
        }
    }

    Ok(())
}

/// Parse `<id> <field> <value>`; the value may contain spaces
fn parse_set(args: &str) -> Result<(SetupId, FieldEdit), error::Error> {
    let args = args.trim();
    let (id, rest) = args.split_once(char::is_whitespace).unwrap_or((args, ""));
    let rest = rest.trim();
    let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    Ok((id.parse()?, FieldEdit::parse(field, value.trim())?))
}
