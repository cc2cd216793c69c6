//! Line-oriented interactive session.
//!
//! # Invariants
//! - One `Session` (and so one accumulator) lives for the whole loop.
//! - A malformed line prints clap's diagnostic and never ends the loop.
//! - Lines are split with POSIX shell quoting, so `search "газ"` and
//!   `export 'my file.csv'` keep their spaces.

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use molar_core::{Command, Session};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(no_binary_name = true, name = "molar>", disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Debug, Subcommand)]
enum ShellCommand {
    /// Append SYMBOL with QUANTITY to the accumulator.
    Add { symbol: String, quantity: f64 },
    /// Remove the entry at a zero-based INDEX.
    Remove { index: usize },
    Clear,
    /// Set the compound name; no words clears it.
    Name {
        #[arg(allow_hyphen_values = true)]
        words: Vec<String>,
    },
    Show,
    Compute,
    /// Save the accumulator; falls back to the current name.
    Save {
        #[arg(allow_hyphen_values = true)]
        words: Vec<String>,
    },
    Report { path: PathBuf },
    Find { symbol: String },
    Search { query: String },
    List,
    /// Elements of one category.
    Category { category: String },
    Refs,
    /// Name the accumulator after the reference compound at INDEX.
    Use { index: usize },
    Saved,
    Load { id: i64 },
    Forget { id: i64 },
    Import { path: PathBuf },
    Export { path: PathBuf },
    #[command(alias = "exit")]
    Quit,
}

enum LineOutcome {
    Dispatch(Command),
    Quit,
    Skip,
}

/// Reads commands from stdin until EOF or `quit`.
///
/// Returns `false` when any dispatched command failed.
pub fn run(session: &mut Session, json: bool) -> bool {
    let stdin = io::stdin();
    let mut all_ok = true;

    prompt();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                eprintln!("cannot read input: {err}");
                return false;
            }
        };

        match parse_line(&line) {
            Ok(LineOutcome::Dispatch(command)) => {
                let response = session.dispatch(command);
                all_ok &= response.ok;
                crate::print_response(&response, json);
            }
            Ok(LineOutcome::Quit) => break,
            Ok(LineOutcome::Skip) => {}
            Err(err) => {
                let _ = err.print();
            }
        }
        prompt();
    }
    all_ok
}

fn prompt() {
    print!("molar> ");
    let _ = io::stdout().flush();
}

fn parse_line(line: &str) -> Result<LineOutcome, clap::Error> {
    let words = shlex::split(line)
        .ok_or_else(|| clap::Error::raw(ErrorKind::InvalidValue, "unbalanced quotes\n"))?;
    if words.is_empty() {
        return Ok(LineOutcome::Skip);
    }

    let parsed = ShellLine::try_parse_from(words)?;
    let command = match parsed.command {
        ShellCommand::Add { symbol, quantity } => Command::AddEntry { symbol, quantity },
        ShellCommand::Remove { index } => Command::RemoveEntry { index },
        ShellCommand::Clear => Command::ClearEntries,
        ShellCommand::Name { words } => Command::SetName {
            name: words.join(" "),
        },
        ShellCommand::Show => Command::ShowEntries,
        ShellCommand::Compute => Command::Compute,
        ShellCommand::Save { words } => Command::SaveCompound {
            name: (!words.is_empty()).then(|| words.join(" ")),
        },
        ShellCommand::Report { path } => Command::ExportReport { path },
        ShellCommand::Find { symbol } => Command::LookupElement { symbol },
        ShellCommand::Search { query } => Command::SearchElements { query },
        ShellCommand::List => Command::ListElements,
        ShellCommand::Category { category } => Command::FilterElements { category },
        ShellCommand::Refs => Command::ListReferenceCompounds,
        ShellCommand::Use { index } => Command::UseReferenceCompound { index },
        ShellCommand::Saved => Command::ListSavedCompounds,
        ShellCommand::Load { id } => Command::LoadSavedCompound { id },
        ShellCommand::Forget { id } => Command::DeleteSavedCompound { id },
        ShellCommand::Import { path } => Command::ImportCsv { path },
        ShellCommand::Export { path } => Command::ExportCsv { path },
        ShellCommand::Quit => return Ok(LineOutcome::Quit),
    };
    Ok(LineOutcome::Dispatch(command))
}
