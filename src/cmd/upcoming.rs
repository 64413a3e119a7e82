use clap::Args;
use colored::Colorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::args::FormatArgs;
use crate::cmd::Context;
use crate::output::{self, OutputFormat};
use crate::render::{self, UpcomingView};

#[derive(Args)]
pub struct UpcomingArgs {
    #[command(flatten)]
    format: FormatArgs,
}

pub fn run(args: UpcomingArgs, ctx: &Context) -> Result<(), String> {
    let format = args.format.resolve();
    let schedule = ctx.load_schedule().map_err(|e| e.to_string())?;
    let view = render::render_upcoming(&schedule, ctx.today, &ctx.config.keywords);
    print_upcoming(&view, format)
}

/// Row data for the upcoming table.
#[derive(Tabled)]
struct UpcomingRow {
    #[tabled(rename = "日期")]
    date: String,
    #[tabled(rename = "星期")]
    weekday: String,
    #[tabled(rename = "小组")]
    group: String,
    #[tabled(rename = "监测煤矿")]
    site: String,
    #[tabled(rename = "备注")]
    note: String,
}

/// Print the two-day panel in any output format.
pub fn print_upcoming(view: &UpcomingView, format: OutputFormat) -> Result<(), String> {
    match format {
        OutputFormat::Pretty => {
            output_pretty(view);
            Ok(())
        }
        OutputFormat::Plain => {
            output_plain(view);
            Ok(())
        }
        OutputFormat::Json => output::print_json(view),
        OutputFormat::Yaml => output::print_yaml(view),
    }
}

fn output_pretty(view: &UpcomingView) {
    match view {
        UpcomingView::Empty { range, message } => {
            println!("{} ({})", "最近2天监测计划".bold(), range.dimmed());
            println!();
            println!("{}", message.dimmed());
        }
        UpcomingView::Tasks { range, items } => {
            println!("{} ({})", "最近2天监测计划".bold(), range.dimmed());
            println!();
            let rows: Vec<UpcomingRow> = items
                .iter()
                .map(|r| UpcomingRow {
                    date: output::style_today(&r.date_display, r.is_today),
                    weekday: r.weekday.clone(),
                    group: r.group.clone().unwrap_or_default(),
                    site: output::style_category(r.category, &r.site).to_string(),
                    note: if r.has_note {
                        r.note.clone()
                    } else {
                        String::new()
                    },
                })
                .collect();
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{}", table);
        }
    }
}

fn output_plain(view: &UpcomingView) {
    match view {
        UpcomingView::Empty { range, message } => {
            println!("Upcoming: {}", range);
            println!("{}", message);
        }
        UpcomingView::Tasks { range, items } => {
            println!("Upcoming: {}", range);
            println!("DATE | DAY | GROUP | SITE | NOTE | TYPE | TODAY");
            for r in items {
                println!(
                    "{} | {} | {} | {} | {} | {} | {}",
                    r.date,
                    r.weekday,
                    r.group.as_deref().unwrap_or_default(),
                    r.site,
                    if r.has_note { r.note.as_str() } else { "" },
                    r.category.label(),
                    if r.is_today { "yes" } else { "" }
                );
            }
        }
    }
}
