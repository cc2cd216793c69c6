//! `molar` command-line entry point.
//!
//! # Responsibility
//! - Translate process arguments into session `Command`s.
//! - Keep presentation (tables, JSON) out of `molar_core`.

mod render;
mod shell;

use clap::{Args, Parser, Subcommand};
use log::info;
use molar_core::db::DEFAULT_DB_FILE_NAME;
use molar_core::{parse_entry, AccumulatorEntry, Command, Element, Response, Session};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "molar",
    version = molar_core::core_version(),
    about = "Molar mass calculator backed by a SQLite element table"
)]
struct Cli {
    /// SQLite file holding elements and compounds; created and seeded if missing.
    #[arg(long, global = true, default_value = DEFAULT_DB_FILE_NAME)]
    db: PathBuf,
    /// Print raw response envelopes as JSON.
    #[arg(long, global = true)]
    json: bool,
    /// trace|debug|info|warn|error; only used together with --log-dir.
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Directory for rolling log files. Logging stays off when omitted.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: TopCommand,
}

#[derive(Debug, Subcommand)]
enum TopCommand {
    /// Browse and edit the element table.
    #[command(subcommand)]
    Elements(ElementsCommand),
    /// Reference and saved compounds.
    #[command(subcommand)]
    Compounds(CompoundsCommand),
    /// Element table CSV exchange.
    #[command(subcommand)]
    Csv(CsvCommand),
    /// Compute the molar mass of SYMBOL:QUANTITY entries.
    Calc(CalcArgs),
    /// Interactive session reading commands from stdin.
    Shell,
}

#[derive(Debug, Subcommand)]
enum ElementsCommand {
    List {
        /// Only elements whose category matches exactly.
        #[arg(long)]
        category: Option<String>,
    },
    Search { query: String },
    Show { symbol: String },
    Add(ElementArgs),
    Update {
        /// Symbol of the row to replace.
        old_symbol: String,
        #[command(flatten)]
        element: ElementArgs,
    },
    Delete { symbol: String },
}

#[derive(Debug, Args)]
struct ElementArgs {
    symbol: String,
    name: String,
    #[arg(long)]
    mass: f64,
    #[arg(long)]
    number: u32,
    #[arg(long)]
    category: Option<String>,
    /// Discovery year; negative for BCE.
    #[arg(long, allow_negative_numbers = true)]
    year: Option<i32>,
}

impl ElementArgs {
    fn into_element(self) -> Element {
        let mut element = Element::new(self.symbol, self.name, self.mass, self.number);
        if let Some(category) = self.category {
            element = element.with_category(category);
        }
        element.discovered_year = self.year;
        element
    }
}

#[derive(Debug, Subcommand)]
enum CompoundsCommand {
    Reference,
    Saved,
    Delete { id: i64 },
}

#[derive(Debug, Subcommand)]
enum CsvCommand {
    Export { path: PathBuf },
    Import { path: PathBuf },
}

#[derive(Debug, Args)]
struct CalcArgs {
    /// Entries such as `H:2 O:1`; repeated symbols are kept apart.
    #[arg(required = true, value_parser = parse_entry_arg)]
    entries: Vec<AccumulatorEntry>,
    #[arg(long)]
    name: Option<String>,
    /// Store the result as a saved compound (requires --name).
    #[arg(long, requires = "name")]
    save: bool,
    /// Also write the text report to this file.
    #[arg(long)]
    report: Option<PathBuf>,
}

fn parse_entry_arg(value: &str) -> Result<AccumulatorEntry, String> {
    parse_entry(value).map_err(|err| err.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_ref() {
        if let Err(err) = start_logging(cli.log_level.as_deref(), log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let mut session = match Session::open(&cli.db) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("cannot open database `{}`: {err}", cli.db.display());
            return ExitCode::FAILURE;
        }
    };

    let interactive = matches!(cli.command, TopCommand::Shell);
    info!(
        "event=cli_start module=cli status=ok interactive={} json={}",
        interactive, cli.json
    );

    let ok = match cli.command {
        TopCommand::Shell => shell::run(&mut session, cli.json),
        other => run_batch(&mut session, commands_for(other), cli.json),
    };

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn start_logging(level: Option<&str>, log_dir: &Path) -> Result<(), String> {
    let absolute = if log_dir.is_absolute() {
        log_dir.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|err| format!("cannot resolve log directory: {err}"))?
            .join(log_dir)
    };
    let dir = absolute
        .to_str()
        .ok_or_else(|| "log directory must be valid UTF-8".to_string())?;
    molar_core::init_logging(level.unwrap_or(molar_core::default_log_level()), dir)
}

/// Runs commands in order, stopping at the first failure.
fn run_batch(session: &mut Session, commands: Vec<Command>, json: bool) -> bool {
    let total = commands.len();
    for (position, command) in commands.into_iter().enumerate() {
        let quiet = is_setup_step(&command) && position + 1 < total;
        let response = session.dispatch(command);
        if !response.ok || !quiet {
            print_response(&response, json);
        }
        if !response.ok {
            return false;
        }
    }
    true
}

/// Accumulator edits whose output would only repeat the final result.
fn is_setup_step(command: &Command) -> bool {
    matches!(command, Command::AddEntry { .. } | Command::SetName { .. })
}

fn print_response(response: &Response, json: bool) {
    if json {
        match serde_json::to_string_pretty(response) {
            Ok(text) => println!("{text}"),
            Err(err) => eprintln!("cannot encode response: {err}"),
        }
        return;
    }

    let text = render::render_response(response);
    if response.ok {
        print!("{text}");
    } else {
        eprint!("{text}");
    }
}

fn commands_for(command: TopCommand) -> Vec<Command> {
    match command {
        TopCommand::Elements(sub) => vec![match sub {
            ElementsCommand::List { category: None } => Command::ListElements,
            ElementsCommand::List {
                category: Some(category),
            } => Command::FilterElements { category },
            ElementsCommand::Search { query } => Command::SearchElements { query },
            ElementsCommand::Show { symbol } => Command::LookupElement { symbol },
            ElementsCommand::Add(args) => Command::AddElement {
                element: args.into_element(),
            },
            ElementsCommand::Update {
                old_symbol,
                element,
            } => Command::UpdateElement {
                old_symbol,
                element: element.into_element(),
            },
            ElementsCommand::Delete { symbol } => Command::DeleteElement { symbol },
        }],
        TopCommand::Compounds(sub) => vec![match sub {
            CompoundsCommand::Reference => Command::ListReferenceCompounds,
            CompoundsCommand::Saved => Command::ListSavedCompounds,
            CompoundsCommand::Delete { id } => Command::DeleteSavedCompound { id },
        }],
        TopCommand::Csv(sub) => vec![match sub {
            CsvCommand::Export { path } => Command::ExportCsv { path },
            CsvCommand::Import { path } => Command::ImportCsv { path },
        }],
        TopCommand::Calc(args) => calc_commands(args),
        TopCommand::Shell => Vec::new(),
    }
}

fn calc_commands(args: CalcArgs) -> Vec<Command> {
    let mut commands: Vec<Command> = args
        .entries
        .into_iter()
        .map(|entry| Command::AddEntry {
            symbol: entry.symbol,
            quantity: entry.quantity,
        })
        .collect();
    if let Some(name) = args.name {
        commands.push(Command::SetName { name });
    }
    commands.push(Command::Compute);
    if args.save {
        commands.push(Command::SaveCompound { name: None });
    }
    if let Some(path) = args.report {
        commands.push(Command::ExportReport { path });
    }
    commands
}
