//! Line-driven interactive browser.
//!
//! Each input line is one event. Selection changes re-render the schedule;
//! failed commands are reported and the loop continues with state unchanged.

use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use tracing::{info, warn};

use crate::args::{FormatArgs, SelectionArgs};
use crate::cmd::months::print_months;
use crate::cmd::show::print_schedule;
use crate::cmd::stats::print_stats;
use crate::cmd::upcoming::print_upcoming;
use crate::cmd::Context;
use crate::error::ScheduleError;
use crate::html;
use crate::output::{self, OutputFormat};
use crate::select::GroupFilter;
use crate::session::{Event, Outcome, Session};

#[derive(Args)]
pub struct BrowseArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    #[command(flatten)]
    format: FormatArgs,
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Month(String),
    Group(GroupFilter),
    Search(String),
    Clear,
    Show,
    Upcoming,
    Stats,
    Months,
    Export(PathBuf),
    Import(PathBuf),
    Html(PathBuf),
    Help,
    Quit,
}

const HELP: &[(&str, &str)] = &[
    ("month <label>", "switch month, e.g. month 2月"),
    ("group <label|all>", "filter by group"),
    ("search [text]", "filter by site, note or date; empty clears"),
    ("clear", "reset group and search"),
    ("show", "print the schedule again"),
    ("upcoming", "tasks for today and tomorrow"),
    ("stats", "total tasks, sites, tasks this month"),
    ("months", "list months"),
    ("export [path]", "write the schedule as JSON"),
    ("import <path>", "replace the schedule from a JSON file"),
    ("html <path>", "write the current page as HTML"),
    ("help", "this list"),
    ("quit", "leave"),
];

impl Command {
    /// Parse a line. Blank lines yield `Ok(None)`.
    fn parse(line: &str) -> Result<Option<Command>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let required = |what: &str| {
            if rest.is_empty() {
                Err(format!("{} needs {}", word, what))
            } else {
                Ok(rest.to_string())
            }
        };

        let command = match word {
            "month" | "m" => Command::Month(required("a month label")?),
            "group" | "g" => Command::Group(GroupFilter::parse(&required("a group label")?)),
            "search" | "s" | "/" => Command::Search(rest.to_string()),
            "clear" => Command::Clear,
            "show" | "ls" => Command::Show,
            "upcoming" | "up" => Command::Upcoming,
            "stats" => Command::Stats,
            "months" => Command::Months,
            "export" => Command::Export(PathBuf::from(if rest.is_empty() { "." } else { rest })),
            "import" => Command::Import(PathBuf::from(required("a file path")?)),
            "html" => Command::Html(PathBuf::from(required("a file path")?)),
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(format!("unknown command: {} (try help)", other)),
        };
        Ok(Some(command))
    }

    /// Session event this command maps to, if it changes state.
    fn event(&self) -> Option<Event> {
        match self {
            Command::Month(m) => Some(Event::SelectMonth(m.clone())),
            Command::Group(g) => Some(Event::SelectGroup(g.clone())),
            Command::Search(s) => Some(Event::Search(s.clone())),
            Command::Clear => Some(Event::ClearFilters),
            Command::Export(p) => Some(Event::Export(p.clone())),
            Command::Import(p) => Some(Event::Import(p.clone())),
            _ => None,
        }
    }
}

enum Flow {
    Continue,
    Quit,
}

pub fn run(args: BrowseArgs, ctx: &Context) -> Result<(), String> {
    let format = args.format.resolve();
    let schedule = ctx.load_schedule().map_err(|e| e.to_string())?;
    let month = ctx.month(args.selection.month.month.as_deref(), &schedule);
    let selection = args.selection.to_selection(month);

    let mut session = Session::new(
        schedule,
        selection,
        ctx.config.keywords.clone(),
        ctx.today,
        ctx.config.display.title.clone(),
    );

    let interactive = io::stdin().is_terminal();
    if interactive && !ctx.quiet() {
        println!("{}", "Type help for commands, quit to leave.".dimmed());
    }
    render(&session, format, ctx.quiet())?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            print!("{} ", format!("[{}]>", session.selection().month).bold());
            io::stdout()
                .flush()
                .map_err(|e| format!("failed to flush stdout: {}", e))?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.map_err(|e| format!("failed to read input: {}", e))?;

        match Command::parse(&line) {
            Ok(None) => {}
            Ok(Some(command)) => match dispatch(&mut session, &command, format, ctx.quiet()) {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(e) => report(&e),
            },
            Err(e) => report(&e),
        }
    }
    Ok(())
}

fn report(message: &str) {
    warn!(error = %message, "browse command failed");
    eprintln!("{} {}", "error:".red(), message);
}

fn dispatch(
    session: &mut Session,
    command: &Command,
    format: OutputFormat,
    quiet: bool,
) -> Result<Flow, String> {
    if let Some(event) = command.event() {
        match session.apply(event).map_err(|e| e.to_string())? {
            Outcome::SelectionChanged => render(session, format, quiet)?,
            Outcome::Imported { months, tasks } => {
                println!("Imported {} months, {} tasks", months, tasks);
                render(session, format, quiet)?;
            }
            Outcome::Exported(path) => println!("Exported to {}", path.display()),
        }
        return Ok(Flow::Continue);
    }

    match command {
        Command::Show => render(session, format, quiet)?,
        Command::Upcoming => print_upcoming(&session.page().upcoming, format)?,
        Command::Stats => {
            let page = session.page();
            print_stats(&page.stats, &page.selection.month, format)?;
        }
        Command::Months => print_months(session.schedule(), &session.selection().month, format)?,
        Command::Html(path) => {
            let document = html::page_to_html(&session.page(), |_, _| None);
            fs::write(path, document).map_err(|e| ScheduleError::io(path, e).to_string())?;
            info!(path = %path.display(), "wrote html page");
            println!("Wrote {}", path.display());
        }
        Command::Help => print_help(),
        Command::Quit => return Ok(Flow::Quit),
        _ => {}
    }
    Ok(Flow::Continue)
}

fn render(session: &Session, format: OutputFormat, quiet: bool) -> Result<(), String> {
    let page = session.page();
    print_schedule(
        &page.schedule,
        &page.selection,
        &session.schedule().month_labels(),
        format,
        quiet,
    )
}

fn print_help() {
    let width = HELP.iter().map(|(c, _)| c.len()).max().unwrap_or(0);
    for (command, description) in HELP {
        println!(
            "  {}  {}",
            output::pad_to_width(command, width).bold(),
            description.dimmed()
        );
    }
}
