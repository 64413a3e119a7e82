use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::args::FormatArgs;
use crate::cmd::Context;
use crate::output::{self, OutputFormat};
use crate::schedule::{self, Schedule};

#[derive(Args)]
pub struct MonthsArgs {
    #[command(flatten)]
    format: FormatArgs,
}

#[derive(Serialize)]
struct MonthSummary {
    month: String,
    groups: Vec<String>,
    tasks: usize,
    current: bool,
}

pub fn run(args: MonthsArgs, ctx: &Context) -> Result<(), String> {
    let format = args.format.resolve();
    let schedule = ctx.load_schedule().map_err(|e| e.to_string())?;
    let current = ctx.month(None, &schedule);
    print_months(&schedule, &current, format)
}

fn summarize(schedule: &Schedule, current: &str) -> Vec<MonthSummary> {
    schedule
        .months()
        .iter()
        .map(|(label, groups)| MonthSummary {
            month: label.clone(),
            groups: groups.keys().cloned().collect(),
            tasks: schedule::task_count(groups),
            current: label == current,
        })
        .collect()
}

/// Print month summaries in the given format.
pub fn print_months(
    schedule: &Schedule,
    current: &str,
    format: OutputFormat,
) -> Result<(), String> {
    let summaries = summarize(schedule, current);
    match format {
        OutputFormat::Pretty => output_pretty(&summaries, schedule),
        OutputFormat::Plain => output_plain(&summaries),
        OutputFormat::Json => output::print_json(&summaries),
        OutputFormat::Yaml => output::print_yaml(&summaries),
    }
}

/// Row data for months table
#[derive(Tabled)]
struct MonthRow {
    #[tabled(rename = "MONTH")]
    month: String,
    #[tabled(rename = "TASKS")]
    tasks: String,
    #[tabled(rename = "GROUPS")]
    groups: String,
}

fn output_pretty(summaries: &[MonthSummary], schedule: &Schedule) -> Result<(), String> {
    println!(
        "{} {} months, {} tasks",
        "Schedule:".bold(),
        summaries.len(),
        schedule.total_tasks()
    );
    println!(
        "{} {}",
        "Groups:".dimmed(),
        schedule.group_labels().join(", ")
    );
    println!();

    if summaries.is_empty() {
        println!("{}", "No months.".dimmed());
        return Ok(());
    }

    let rows: Vec<MonthRow> = summaries
        .iter()
        .map(|s| MonthRow {
            month: if s.current {
                format!("{} ←", s.month).bold().to_string()
            } else {
                s.month.clone()
            },
            tasks: s.tasks.to_string(),
            groups: s.groups.join(", "),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
    Ok(())
}

fn output_plain(summaries: &[MonthSummary]) -> Result<(), String> {
    println!("MONTH | TASKS | GROUPS | CURRENT");
    for s in summaries {
        println!(
            "{} | {} | {} | {}",
            s.month,
            s.tasks,
            s.groups.join(","),
            if s.current { "yes" } else { "" }
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::tests::sample;

    #[test]
    fn test_summarize() {
        let summaries = summarize(&sample(), "2月");
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].month, "1月");
        assert_eq!(summaries[0].tasks, 3);
        assert_eq!(summaries[0].groups, vec!["一组", "二组"]);
        assert!(!summaries[0].current);
        assert!(summaries[1].current);
    }
}
