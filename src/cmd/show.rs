use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::args::{FormatArgs, SelectionArgs};
use crate::cmd::Context;
use crate::output::{self, OutputFormat};
use crate::render::{self, COLUMN_HEADERS, GroupTable, ScheduleView, TaskRow};
use crate::select::Selection;

#[derive(Args)]
pub struct ShowArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    #[command(flatten)]
    format: FormatArgs,
}

pub fn run(args: ShowArgs, ctx: &Context) -> Result<(), String> {
    let format = args.format.resolve();
    let schedule = ctx.load_schedule().map_err(|e| e.to_string())?;

    let month = ctx.month(args.selection.month.month.as_deref(), &schedule);
    let selection = args.selection.to_selection(month);
    let view = render::render_schedule(&schedule, &selection, ctx.today, &ctx.config.keywords);

    print_schedule(
        &view,
        &selection,
        &schedule.month_labels(),
        format,
        ctx.quiet(),
    )
}

/// Print a schedule view in any output format.
pub fn print_schedule(
    view: &ScheduleView,
    selection: &Selection,
    months: &[&str],
    format: OutputFormat,
    quiet: bool,
) -> Result<(), String> {
    match format {
        OutputFormat::Pretty => output_pretty(view, selection, months, quiet),
        OutputFormat::Plain => output_plain(view, selection, months, quiet),
        OutputFormat::Json => output::print_json(&ScheduleOutput { selection, view }),
        OutputFormat::Yaml => output::print_yaml(&ScheduleOutput { selection, view }),
    }
}

#[derive(Serialize)]
struct ScheduleOutput<'a> {
    selection: &'a Selection,
    #[serde(flatten)]
    view: &'a ScheduleView,
}

/// Row data for the schedule table.
#[derive(Tabled)]
struct TableRow {
    #[tabled(rename = "日期")]
    date: String,
    #[tabled(rename = "星期")]
    weekday: String,
    #[tabled(rename = "监测煤矿")]
    site: String,
    #[tabled(rename = "所属井田")]
    note: String,
    #[tabled(rename = "类型")]
    kind: String,
}

fn build_filter_desc(selection: &Selection) -> String {
    let mut parts = vec![format!("group={}", selection.group)];
    if !selection.search.is_empty() {
        parts.push(format!("search=\"{}\"", selection.search));
    }
    parts.join(", ")
}

fn empty_hint(view: &ScheduleView, months: &[&str]) -> Option<String> {
    match view {
        ScheduleView::NoMonthData { .. } if months.is_empty() => {
            Some("Hint: the schedule has no months at all".to_string())
        }
        ScheduleView::NoMonthData { .. } => {
            Some(format!("Hint: available months: {}", months.join(", ")))
        }
        ScheduleView::NoMatches { .. } => {
            Some("Hint: use --group all or a different --search".to_string())
        }
        ScheduleView::Groups { .. } => None,
    }
}

fn pretty_row(row: &TaskRow, note_max: usize) -> TableRow {
    let site = match row.sites.as_slice() {
        [] => output::style_placeholder(&row.site, row.site == render::REST_DAY),
        sites => sites.join(" · "),
    };
    TableRow {
        date: output::style_today(&row.date, row.is_today),
        weekday: row.weekday.clone(),
        site,
        note: output::style_placeholder(&output::truncate_back(&row.note, note_max), !row.has_note),
        kind: output::style_category(row.category, row.category.label()).to_string(),
    }
}

fn print_group_pretty(group: &GroupTable, note_max: usize) {
    println!("{}  {}", group.label.bold(), group.count_label.dimmed());
    let rows: Vec<TableRow> = group.rows.iter().map(|r| pretty_row(r, note_max)).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
    println!();
}

fn output_pretty(
    view: &ScheduleView,
    selection: &Selection,
    months: &[&str],
    quiet: bool,
) -> Result<(), String> {
    println!(
        "{} ({})",
        selection.month.bold(),
        build_filter_desc(selection).dimmed()
    );
    println!();

    match view {
        ScheduleView::NoMonthData { message } | ScheduleView::NoMatches { message } => {
            println!("{}", message.dimmed());
            if !quiet && let Some(hint) = empty_hint(view, months) {
                println!("{}", hint.dimmed());
            }
        }
        ScheduleView::Groups { groups } => {
            // Fixed columns take roughly 50; the note column gets the rest.
            let note_max = output::terminal_width().saturating_sub(50).max(12);
            for group in groups {
                print_group_pretty(group, note_max);
            }
        }
    }
    Ok(())
}

fn output_plain(
    view: &ScheduleView,
    selection: &Selection,
    months: &[&str],
    quiet: bool,
) -> Result<(), String> {
    println!("Month: {} ({})", selection.month, build_filter_desc(selection));
    println!();

    match view {
        ScheduleView::NoMonthData { message } | ScheduleView::NoMatches { message } => {
            println!("{}", message);
            if !quiet && let Some(hint) = empty_hint(view, months) {
                println!("{}", hint);
            }
        }
        ScheduleView::Groups { groups } => {
            for group in groups {
                println!("# {} | {}", group.label, group.count_label);
                println!("{} | TYPE | TODAY", COLUMN_HEADERS.join(" | "));
                for row in &group.rows {
                    println!(
                        "{} | {} | {} | {} | {} | {}",
                        row.date,
                        row.weekday,
                        row.site,
                        row.note,
                        row.category.label(),
                        if row.is_today { "yes" } else { "" }
                    );
                }
                println!();
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Category;

    fn row(mine: &str, sites: &[&str], note: &str) -> TaskRow {
        TaskRow {
            date: "2024-01-01".to_string(),
            date_display: "2024年1月1日".to_string(),
            weekday: "周一".to_string(),
            site: mine.to_string(),
            sites: sites.iter().map(|s| s.to_string()).collect(),
            category: Category::Regular,
            badge: None,
            note: note.to_string(),
            has_note: note != render::NO_NOTE,
            group: None,
            is_today: false,
        }
    }

    #[test]
    fn test_filter_desc() {
        let mut sel = Selection::new("1月");
        assert_eq!(build_filter_desc(&sel), "group=all");
        sel.search = "矿".to_string();
        assert_eq!(build_filter_desc(&sel), "group=all, search=\"矿\"");
    }

    #[test]
    fn test_empty_hints() {
        let no_month = ScheduleView::NoMonthData {
            message: render::NO_MONTH_DATA,
        };
        assert_eq!(
            empty_hint(&no_month, &["1月", "2月"]).as_deref(),
            Some("Hint: available months: 1月, 2月")
        );
        assert!(empty_hint(&no_month, &[]).unwrap().contains("no months"));
        assert!(empty_hint(&ScheduleView::Groups { groups: vec![] }, &[]).is_none());
    }

    #[test]
    fn test_pretty_row_joins_site_badges() {
        colored::control::set_override(false);
        let r = pretty_row(&row("A矿/B矿", &["A矿", "B矿"], "-"), 20);
        assert_eq!(r.site, "A矿 · B矿");
        assert_eq!(r.note, "-");
        assert_eq!(r.kind, "常规监测");
    }

    #[test]
    fn test_json_output_flattens_view() {
        let sel = Selection::new("1月");
        let view = ScheduleView::NoMatches {
            message: render::NO_MATCHES,
        };
        let value = serde_json::to_value(ScheduleOutput {
            selection: &sel,
            view: &view,
        })
        .unwrap();
        assert_eq!(value["state"], "no-matches");
        assert_eq!(value["selection"]["month"], "1月");
    }
}
