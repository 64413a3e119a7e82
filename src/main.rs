use std::io;
use std::path::{Path, PathBuf};
use std::process;

use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::env::CompleteEnv;
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

mod aggregate;
mod args;
mod classify;
mod cmd;
mod config;
mod error;
mod html;
mod output;
mod render;
mod schedule;
mod select;
mod session;

#[derive(Parser)]
#[command(name = "minewatch")]
#[command(version = env!("MINEWATCH_VERSION"))]
#[command(about = "Coal-mine monitoring schedule viewer")]
#[command(
    long_about = "minewatch - View the monthly coal-mine monitoring schedule.\n\n\
                  The schedule is a JSON document of months, groups and dated tasks.\n\
                  Browse it by month, group and search term, see what is due today and\n\
                  tomorrow, and render it as a static HTML page."
)]
struct Cli {
    /// Schedule JSON file (overrides MINEWATCH_DATA and config)
    #[arg(long, global = true, value_name = "PATH")]
    data: Option<PathBuf>,

    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long, global = true, value_name = "DATE", value_parser = parse_date)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one month's schedule, grouped
    #[command(alias = "ls")]
    Show(cmd::show::ShowArgs),

    /// Tasks for today and tomorrow
    #[command(alias = "up")]
    Upcoming(cmd::upcoming::UpcomingArgs),

    /// Total tasks, unique sites, tasks in a month
    Stats(cmd::stats::StatsArgs),

    /// List months and groups
    Months(cmd::months::MonthsArgs),

    /// Render the page as HTML
    Html(cmd::html::HtmlArgs),

    /// Export the schedule as JSON
    Export(cmd::export::ExportArgs),

    /// Replace the schedule from a JSON file
    Import(cmd::import::ImportArgs),

    /// Interactive line-driven browser
    Browse(cmd::browse::BrowseArgs),

    /// Generate shell completion script
    Completion(CompletionArgs),

    /// Configuration introspection
    Config(cmd::config_cmd::ConfigArgs),
}

#[derive(clap::Args)]
struct CompletionArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Clone, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, select::DATE_FORMAT)
        .map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("MINEWATCH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    // Handle dynamic shell completions
    CompleteEnv::with_factory(Cli::command).complete();

    // Use try_parse to catch errors and normalize exit code
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // Exit with 0 for help/version, 1 for actual errors
            let exit_code = if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind() == clap::error::ErrorKind::DisplayVersion
            {
                0
            } else {
                1
            };
            process::exit(exit_code);
        }
    };

    init_logging();

    if let Commands::Completion(args) = &cli.command {
        let shell = match args.shell {
            CompletionShell::Bash => Shell::Bash,
            CompletionShell::Zsh => Shell::Zsh,
            CompletionShell::Fish => Shell::Fish,
            CompletionShell::Powershell => Shell::PowerShell,
        };
        generate(shell, &mut Cli::command(), "minewatch", &mut io::stdout());
        return;
    }

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            eprintln!("cannot get cwd: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Config(args) => cmd::config_cmd::run(args, &cwd),
        Commands::Completion(_) => unreachable!(), // Handled above
        command => build_context(cli.data.as_deref(), cli.today, &cwd)
            .and_then(|ctx| run_data_command(command, &ctx)),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn run_data_command(command: Commands, ctx: &cmd::Context) -> Result<(), String> {
    match command {
        Commands::Show(args) => cmd::show::run(args, ctx),
        Commands::Upcoming(args) => cmd::upcoming::run(args, ctx),
        Commands::Stats(args) => cmd::stats::run(args, ctx),
        Commands::Months(args) => cmd::months::run(args, ctx),
        Commands::Html(args) => cmd::html::run(args, ctx),
        Commands::Export(args) => cmd::export::run(args, ctx),
        Commands::Import(args) => cmd::import::run(args, ctx),
        Commands::Browse(args) => cmd::browse::run(args, ctx),
        Commands::Config(_) | Commands::Completion(_) => unreachable!(),
    }
}

fn build_context(
    data: Option<&Path>,
    today: Option<NaiveDate>,
    cwd: &Path,
) -> Result<cmd::Context, String> {
    let loaded = config::load_config(cwd);
    let data_path = config::resolve_data_path(data, &loaded.config);
    let today = config::resolve_today(today)?;
    Ok(cmd::Context {
        config: loaded.config,
        data_path,
        today,
    })
}
