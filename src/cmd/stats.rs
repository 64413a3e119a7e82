use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::aggregate::{Aggregates, aggregate};
use crate::args::{FormatArgs, MonthArgs};
use crate::cmd::Context;
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct StatsArgs {
    #[command(flatten)]
    month: MonthArgs,

    #[command(flatten)]
    format: FormatArgs,
}

pub fn run(args: StatsArgs, ctx: &Context) -> Result<(), String> {
    let format = args.format.resolve();
    let schedule = ctx.load_schedule().map_err(|e| e.to_string())?;
    let month = ctx.month(args.month.month.as_deref(), &schedule);
    let stats = aggregate(&schedule, &month, &ctx.config.keywords);
    print_stats(&stats, &month, format)
}

#[derive(Serialize)]
struct StatsOutput<'a> {
    month: &'a str,
    #[serde(flatten)]
    stats: &'a Aggregates,
}

/// Row data for stats table
#[derive(Tabled)]
struct StatsRow {
    #[tabled(rename = "STAT")]
    stat: String,
    #[tabled(rename = "COUNT")]
    count: String,
}

fn stat_lines(stats: &Aggregates, month: &str) -> Vec<(String, usize)> {
    vec![
        ("总任务数".to_string(), stats.total_tasks),
        ("监测煤矿数".to_string(), stats.unique_sites),
        (format!("{}任务", month), stats.current_month_tasks),
    ]
}

/// Print the three counters in any output format.
pub fn print_stats(stats: &Aggregates, month: &str, format: OutputFormat) -> Result<(), String> {
    match format {
        OutputFormat::Pretty => {
            println!("{} ({})", "Schedule stats".bold(), month.dimmed());
            println!();
            let rows: Vec<StatsRow> = stat_lines(stats, month)
                .into_iter()
                .map(|(stat, count)| StatsRow {
                    stat,
                    count: count.to_string().bold().to_string(),
                })
                .collect();
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{}", table);
            Ok(())
        }
        OutputFormat::Plain => {
            println!("STAT | COUNT");
            for (stat, count) in stat_lines(stats, month) {
                println!("{} | {}", stat, count);
            }
            Ok(())
        }
        OutputFormat::Json => output::print_json(&StatsOutput { month, stats }),
        OutputFormat::Yaml => output::print_yaml(&StatsOutput { month, stats }),
    }
}
