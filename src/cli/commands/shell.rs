//! Interactive shell.
//!
//! Reads one command per line and parses it with the same grammar as the
//! one-shot subcommands, so `employee add Ada Lovelace --role 2` works in
//! both places. The cache is started once for the whole session.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use console::{style, Term};
use std::io::{self, BufRead};

use super::department::{self, DepartmentArgs};
use super::employee::{self, EmployeeArgs};
use super::refresh;
use super::role::{self, RoleArgs};
use crate::cli::report_error;
use crate::domain::models::Config;
use crate::domain::ports::PersistenceGateway;
use crate::services::OrgCache;

const PROMPT: &str = "employee-tracker> ";

/// Grammar of a single shell line.
#[derive(Parser, Debug)]
#[command(name = "", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Subcommand, Debug)]
pub enum ShellCommand {
    /// Department management commands
    Department(DepartmentArgs),
    /// Role management commands
    Role(RoleArgs),
    /// Employee management commands
    Employee(EmployeeArgs),
    /// Reload every table from the database
    Refresh,
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub async fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let mut cache = super::open_cache(config).await?;
    let result = repl(&mut cache, json_mode).await;
    cache.close().await;
    result
}

async fn repl<G: PersistenceGateway>(cache: &mut OrgCache<G>, json_mode: bool) -> Result<()> {
    let term = Term::stdout();
    let interactive = term.is_term();

    if interactive {
        term.write_line(&format!(
            "{} Type {} for commands, {} to leave.",
            style("Employee Tracker").bold(),
            style("help").cyan(),
            style("quit").cyan()
        ))?;
    }

    loop {
        let line = if interactive {
            term.write_str(PROMPT)?;
            term.read_line().context("Failed to read from terminal")?
        } else {
            // console only reads from a terminal; fall back to plain stdin
            let mut buf = String::new();
            let read = io::stdin().lock().read_line(&mut buf).context("Failed to read stdin")?;
            if read == 0 {
                break;
            }
            buf
        };

        if dispatch_line(cache, &line, json_mode).await == Flow::Quit {
            break;
        }
    }
    Ok(())
}

/// Run one shell line against the cache. Errors are reported and the session
/// continues.
pub async fn dispatch_line<G: PersistenceGateway>(
    cache: &mut OrgCache<G>,
    line: &str,
    json_mode: bool,
) -> Flow {
    let words = match split_line(line) {
        Ok(words) if words.is_empty() => return Flow::Continue,
        Ok(words) => words,
        Err(message) => {
            report_error(&anyhow::anyhow!(message), json_mode);
            return Flow::Continue;
        }
    };

    let parsed = match ShellLine::try_parse_from(words) {
        Ok(parsed) => parsed,
        Err(err) => {
            match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                    println!("{}", err.render());
                }
                _ => eprintln!("{}", err.render()),
            }
            return Flow::Continue;
        }
    };

    let result = match parsed.command {
        ShellCommand::Department(args) => department::run(cache, args, json_mode).await,
        ShellCommand::Role(args) => role::run(cache, args, json_mode).await,
        ShellCommand::Employee(args) => employee::run(cache, args, json_mode).await,
        ShellCommand::Refresh => refresh::run(cache, json_mode).await,
        ShellCommand::Quit => return Flow::Quit,
    };

    if let Err(err) = result {
        report_error(&err, json_mode);
    }
    Flow::Continue
}

/// Split a line into words, honoring single quotes, double quotes and
/// backslash escapes.
pub fn split_line(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('\''), c) => current.push(c),
            (_, '\\') => match chars.next() {
                Some(escaped) => {
                    current.push(escaped);
                    in_word = true;
                }
                None => return Err("trailing backslash".to_string()),
            },
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err("unterminated quote".to_string());
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
