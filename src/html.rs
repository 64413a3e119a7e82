//! HTML adapter for the display tree.
//!
//! Produces a self-contained page per month. Month tabs become links between the pages
//! written by [`write_site`]; a single page rendered with [`page_to_html`] and no links
//! shows the tabs as plain buttons.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::classify::Keywords;
use crate::error::ScheduleError;
use crate::render::{self, COLUMN_HEADERS, GroupTable, Page, ScheduleView, TaskRow, UpcomingView};
use crate::schedule::Schedule;
use crate::select::Selection;

const STYLE: &str = r#"
body {
  font-family: "PingFang SC", "Microsoft YaHei", sans-serif;
  margin: 0 auto;
  max-width: 1100px;
  padding: 1rem;
}
.month-nav { display: flex; flex-wrap: wrap; gap: .4rem; margin: 1rem 0; }
.month-btn {
  border: 1px solid #0d6efd;
  border-radius: 4px;
  padding: .25rem .75rem;
  color: #0d6efd;
  background: #fff;
  text-decoration: none;
}
.month-btn.active { background: #0d6efd; color: #fff; }
.filter-badge {
  display: inline-block;
  border-radius: 1rem;
  padding: .15rem .7rem;
  background: #e9ecef;
  margin-right: .3rem;
}
.filter-badge.active { background: #198754; color: #fff; }
.stats { display: flex; gap: 1rem; margin: 1rem 0; }
.stat {
  flex: 1;
  border: 1px solid #dee2e6;
  border-radius: 6px;
  padding: .75rem;
  text-align: center;
}
.stat-value { font-size: 1.6rem; font-weight: bold; }
.recent-task-item {
  display: flex;
  justify-content: space-between;
  border-bottom: 1px solid #eee;
  padding: .5rem 0;
}
.today-highlight, tr.table-warning { background: #fff3cd; }
.task-type-indicator {
  display: inline-block;
  width: 10px;
  height: 10px;
  border-radius: 50%;
  margin-right: 6px;
}
.task-type-holiday { background: #dc3545; }
.task-type-multi { background: #fd7e14; }
.task-type-regular { background: #198754; }
.badge-mine {
  display: inline-block;
  background: #cfe2ff;
  border-radius: 3px;
  padding: 0 .4rem;
  margin-right: .25rem;
  font-size: .8rem;
}
.card { border: 1px solid #dee2e6; border-radius: 6px; margin-bottom: 1.5rem; }
.card-header {
  display: flex;
  justify-content: space-between;
  background: #f8f9fa;
  padding: .5rem .75rem;
}
table { width: 100%; border-collapse: collapse; }
th, td {
  border-top: 1px solid #dee2e6;
  padding: .4rem .6rem;
  text-align: left;
  vertical-align: top;
}
.no-data { color: #6c757d; text-align: center; padding: 2rem; }
.text-muted { color: #6c757d; }
"#;

pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// File name of the page for the month at `index` in store order.
pub fn month_file_name(index: usize) -> String {
    format!("month-{:02}.html", index + 1)
}

fn indicator(row: &TaskRow) -> String {
    format!(
        r#"<span class="task-type-indicator {}"></span>"#,
        row.category.css_class()
    )
}

fn upcoming_html(view: &UpcomingView, out: &mut String) {
    let range = match view {
        UpcomingView::Empty { range, .. } | UpcomingView::Tasks { range, .. } => range,
    };
    out.push_str(r#"<section class="recent"><h2>最近2天监测计划</h2>"#);
    out.push_str(&format!(r#"<div class="text-muted">{}</div>"#, escape(range)));

    match view {
        UpcomingView::Empty { message, .. } => {
            out.push_str(&format!(r#"<div class="no-data">{}</div>"#, escape(message)));
        }
        UpcomingView::Tasks { items, .. } => {
            for row in items {
                let class = if row.is_today {
                    "recent-task-item today-highlight"
                } else {
                    "recent-task-item"
                };
                out.push_str(&format!(r#"<div class="{}"><div>"#, class));
                out.push_str(&format!(
                    "<div>{} {}</div>",
                    escape(&row.date_display),
                    escape(&row.weekday)
                ));
                out.push_str(&format!("<div>{}{}</div>", indicator(row), escape(&row.site)));
                if row.has_note {
                    out.push_str(&format!(
                        r#"<div class="text-muted">{}</div>"#,
                        escape(&row.note)
                    ));
                }
                out.push_str(&format!(
                    "</div><div>{}</div></div>",
                    escape(row.group.as_deref().unwrap_or_default())
                ));
            }
        }
    }
    out.push_str("</section>");
}

fn group_html(group: &GroupTable, out: &mut String) {
    out.push_str(r#"<div class="card"><div class="card-header">"#);
    out.push_str(&format!(
        "<span>{}</span><span>{}</span></div>",
        escape(&group.label),
        escape(&group.count_label)
    ));
    out.push_str("<table><thead><tr>");
    for (header, width) in COLUMN_HEADERS.iter().zip(["15%", "10%", "50%", "25%"]) {
        out.push_str(&format!(r#"<th width="{}">{}</th>"#, width, header));
    }
    out.push_str("</tr></thead><tbody>");

    for row in &group.rows {
        let class = if row.is_today { "table-warning" } else { "" };
        out.push_str(&format!(r#"<tr class="{}">"#, class));
        out.push_str(&format!("<td>{}</td><td>{}</td>", escape(&row.date), escape(&row.weekday)));
        out.push_str(&format!("<td><div>{}{}</div>", indicator(row), escape(&row.site)));
        if !row.sites.is_empty() {
            out.push_str("<div>");
            for site in &row.sites {
                out.push_str(&format!(r#"<span class="badge-mine">{}</span>"#, escape(site)));
            }
            out.push_str("</div>");
        }
        out.push_str("</td><td>");
        if row.has_note {
            out.push_str(&format!(r#"<span class="text-info">{}</span>"#, escape(&row.note)));
        } else {
            out.push_str(&format!(r#"<span class="text-muted">{}</span>"#, escape(&row.note)));
        }
        if let Some(badge) = row.badge {
            out.push_str(&format!("<div><small>{}</small></div>", escape(badge)));
        }
        out.push_str("</td></tr>");
    }
    out.push_str("</tbody></table></div>");
}

/// Render a full HTML document.
///
/// `month_href` maps a month's index and label to a link target; `None` renders the tab
/// without a link.
pub fn page_to_html(page: &Page, month_href: impl Fn(usize, &str) -> Option<String>) -> String {
    let mut out = String::with_capacity(16 * 1024);
    out.push_str("<!DOCTYPE html>\n<html lang=\"zh-CN\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape(&page.title)));
    out.push_str(&format!("<style>{}</style>\n</head>\n<body>\n", STYLE));

    out.push_str(&format!(
        r#"<header><h1>{}</h1><div id="currentTime">{}</div></header>"#,
        escape(&page.title),
        escape(&page.today)
    ));

    out.push_str(r#"<nav class="month-nav" id="monthNav">"#);
    for (i, tab) in page.months.iter().enumerate() {
        let class = if tab.active { "month-btn active" } else { "month-btn" };
        match month_href(i, &tab.label) {
            Some(href) => out.push_str(&format!(
                r#"<a class="{}" href="{}">{}</a>"#,
                class,
                escape(&href),
                escape(&tab.label)
            )),
            None => out.push_str(&format!(
                r#"<span class="{}">{}</span>"#,
                class,
                escape(&tab.label)
            )),
        }
    }
    out.push_str("</nav>");

    out.push_str(r#"<div class="filters">"#);
    for badge in &page.groups {
        let class = if badge.active { "filter-badge active" } else { "filter-badge" };
        out.push_str(&format!(
            r#"<span class="{}" data-group="{}">{}</span>"#,
            class,
            escape(&badge.value),
            escape(&badge.label)
        ));
    }
    if !page.selection.search.is_empty() {
        out.push_str(&format!(
            r#"<span class="text-muted">搜索: {}</span>"#,
            escape(&page.selection.search)
        ));
    }
    out.push_str("</div>");

    out.push_str(&format!(
        concat!(
            r#"<div class="stats">"#,
            r#"<div class="stat"><div class="stat-value" id="totalTasks">{}</div>"#,
            r#"<div>总任务数</div></div>"#,
            r#"<div class="stat"><div class="stat-value" id="totalMines">{}</div>"#,
            r#"<div>监测煤矿数</div></div>"#,
            r#"<div class="stat"><div class="stat-value" id="currentMonthTasks">{}</div>"#,
            r#"<div>本月任务</div></div>"#,
            "</div>"
        ),
        page.stats.total_tasks, page.stats.unique_sites, page.stats.current_month_tasks
    ));

    upcoming_html(&page.upcoming, &mut out);

    out.push_str(r#"<section id="scheduleContent">"#);
    match &page.schedule {
        ScheduleView::NoMonthData { message } | ScheduleView::NoMatches { message } => {
            out.push_str(&format!(r#"<div class="no-data">{}</div>"#, escape(message)));
        }
        ScheduleView::Groups { groups } => {
            for group in groups {
                group_html(group, &mut out);
            }
        }
    }
    out.push_str("</section>\n</body>\n</html>\n");
    out
}

/// Page shown when no schedule data could be loaded.
pub fn missing_data_html(title: &str) -> String {
    format!(
        concat!(
            "<!DOCTYPE html>\n<html lang=\"zh-CN\">\n<head>\n<meta charset=\"utf-8\">\n",
            "<title>{title}</title>\n<style>{style}</style>\n</head>\n<body>\n",
            "<section id=\"scheduleContent\"><div class=\"no-data\">{msg}</div></section>\n",
            "</body>\n</html>\n"
        ),
        title = escape(title),
        style = STYLE,
        msg = crate::error::MISSING_DATA_MESSAGE,
    )
}

/// Write one page per month plus `index.html` for the selected month.
///
/// Month tabs link between the written pages. Returns the written paths.
pub fn write_site(
    title: &str,
    schedule: &Schedule,
    selection: &Selection,
    today: NaiveDate,
    keywords: &Keywords,
    dir: &Path,
) -> Result<Vec<PathBuf>, ScheduleError> {
    fs::create_dir_all(dir).map_err(|e| ScheduleError::io(dir, e))?;
    let link = |i: usize, _: &str| Some(month_file_name(i));
    let mut written = Vec::new();

    for (i, label) in schedule.month_labels().into_iter().enumerate() {
        let month_selection = Selection {
            month: label.to_string(),
            ..selection.clone()
        };
        let page = render::render_page(title, schedule, &month_selection, today, keywords);
        let path = dir.join(month_file_name(i));
        fs::write(&path, page_to_html(&page, &link)).map_err(|e| ScheduleError::io(&path, e))?;
        written.push(path);
    }

    let page = render::render_page(title, schedule, selection, today, keywords);
    let index = dir.join("index.html");
    fs::write(&index, page_to_html(&page, &link)).map_err(|e| ScheduleError::io(&index, e))?;
    written.push(index);

    Ok(written)
}
