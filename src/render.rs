//! Renderer: schedule + selection → declarative display tree.
//!
//! Nothing here touches a terminal or a file. The terminal commands and the HTML
//! adapter consume [`Page`] (or its parts) and only decide presentation.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::aggregate::{Aggregates, aggregate};
use crate::classify::{Category, Keywords, SITE_SEPARATOR, classify, split_sites};
use crate::schedule::{Schedule, Task};
use crate::select::{self, GroupFilter, Selected, Selection, Upcoming};

pub const REST_DAY: &str = "休息";
pub const NO_NOTE: &str = "-";
pub const ALL_GROUPS_LABEL: &str = "全部";
pub const NO_MONTH_DATA: &str = "该月份暂无数据";
pub const NO_MATCHES: &str = "没有找到符合筛选条件的监测计划";
pub const NOTHING_UPCOMING: &str = "最近2天没有监测计划";
pub const COLUMN_HEADERS: [&str; 4] = ["日期", "星期", "监测煤矿", "所属井田"];

/// `2024年1月5日`; unparseable input is returned unchanged.
pub fn display_date(date: &str) -> String {
    match select::date_key(date) {
        Some(d) => display_naive(d),
        None => date.to_string(),
    }
}

pub fn display_naive(d: NaiveDate) -> String {
    format!("{}年{}月{}日", d.year(), d.month(), d.day())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TaskRow {
    pub date: String,
    pub date_display: String,
    pub weekday: String,
    /// Site text, or the rest-day placeholder
    pub site: String,
    /// Individual site badges, only for `/`-joined sites
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sites: Vec<String>,
    pub category: Category,
    /// Category badge text, absent for regular tasks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<&'static str>,
    /// Note, or the no-note placeholder
    pub note: String,
    pub has_note: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub is_today: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GroupTable {
    pub label: String,
    pub count: usize,
    pub count_label: String,
    pub rows: Vec<TaskRow>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum ScheduleView {
    NoMonthData { message: &'static str },
    NoMatches { message: &'static str },
    Groups { groups: Vec<GroupTable> },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum UpcomingView {
    Empty { range: String, message: &'static str },
    Tasks { range: String, items: Vec<TaskRow> },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MonthTab {
    pub label: String,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GroupBadge {
    /// Filter value: `all` or a group label
    pub value: String,
    pub label: String,
    pub active: bool,
}

/// Everything one screen shows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Page {
    pub title: String,
    pub today: String,
    pub selection: Selection,
    pub months: Vec<MonthTab>,
    pub groups: Vec<GroupBadge>,
    pub stats: Aggregates,
    pub upcoming: UpcomingView,
    pub schedule: ScheduleView,
}

pub fn render_task(
    task: &Task,
    group: Option<&str>,
    today: NaiveDate,
    keywords: &Keywords,
) -> TaskRow {
    let category = classify(task, keywords);
    let sites = if task.mine.contains(SITE_SEPARATOR) {
        split_sites(&task.mine).map(str::to_string).collect()
    } else {
        Vec::new()
    };
    TaskRow {
        date: task.date.clone(),
        date_display: display_date(&task.date),
        weekday: task.day.clone(),
        site: if task.mine.is_empty() {
            REST_DAY.to_string()
        } else {
            task.mine.clone()
        },
        sites,
        category,
        badge: (category != Category::Regular).then(|| category.label()),
        note: if task.note.is_empty() {
            NO_NOTE.to_string()
        } else {
            task.note.clone()
        },
        has_note: !task.note.is_empty(),
        group: group.map(str::to_string),
        is_today: select::is_on(task, today),
    }
}

pub fn render_schedule(
    schedule: &Schedule,
    selection: &Selection,
    today: NaiveDate,
    keywords: &Keywords,
) -> ScheduleView {
    match select::select(schedule, selection) {
        Selected::NoMonthData => ScheduleView::NoMonthData {
            message: NO_MONTH_DATA,
        },
        Selected::NoMatches => ScheduleView::NoMatches {
            message: NO_MATCHES,
        },
        Selected::Groups(groups) => ScheduleView::Groups {
            groups: groups
                .into_iter()
                .map(|g| GroupTable {
                    label: g.label.to_string(),
                    count: g.tasks.len(),
                    count_label: format!("{} 个任务", g.tasks.len()),
                    rows: g
                        .tasks
                        .iter()
                        .map(|t| render_task(t, None, today, keywords))
                        .collect(),
                })
                .collect(),
        },
    }
}

pub fn render_upcoming(schedule: &Schedule, today: NaiveDate, keywords: &Keywords) -> UpcomingView {
    let dates = select::upcoming_dates(today);
    let range = dates
        .iter()
        .map(|d| display_naive(*d))
        .collect::<Vec<_>>()
        .join(" - ");

    match select::upcoming(schedule, today) {
        Upcoming::Empty => UpcomingView::Empty {
            range,
            message: NOTHING_UPCOMING,
        },
        Upcoming::Tasks(found) => UpcomingView::Tasks {
            range,
            items: found
                .iter()
                .map(|u| render_task(u.task, Some(u.group), today, keywords))
                .collect(),
        },
    }
}

pub fn month_tabs(schedule: &Schedule, selection: &Selection) -> Vec<MonthTab> {
    schedule
        .month_labels()
        .into_iter()
        .map(|label| MonthTab {
            label: label.to_string(),
            active: label == selection.month,
        })
        .collect()
}

/// The "all" badge followed by every group label in the store.
pub fn group_badges(schedule: &Schedule, selection: &Selection) -> Vec<GroupBadge> {
    let mut badges = vec![GroupBadge {
        value: GroupFilter::All.to_string(),
        label: ALL_GROUPS_LABEL.to_string(),
        active: selection.group == GroupFilter::All,
    }];
    badges.extend(schedule.group_labels().into_iter().map(|label| GroupBadge {
        value: label.to_string(),
        label: label.to_string(),
        active: selection.group.matches(label) && selection.group != GroupFilter::All,
    }));
    badges
}

pub fn render_page(
    title: &str,
    schedule: &Schedule,
    selection: &Selection,
    today: NaiveDate,
    keywords: &Keywords,
) -> Page {
    debug!(month = %selection.month, group = %selection.group, "render page");
    Page {
        title: title.to_string(),
        today: display_naive(today),
        selection: selection.clone(),
        months: month_tabs(schedule, selection),
        groups: group_badges(schedule, selection),
        stats: aggregate(schedule, &selection.month, keywords),
        upcoming: render_upcoming(schedule, today, keywords),
        schedule: render_schedule(schedule, selection, today, keywords),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::tests::sample;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(date: &str, mine: &str, note: &str) -> Task {
        Task {
            date: date.to_string(),
            day: "周一".to_string(),
            mine: mine.to_string(),
            note: note.to_string(),
        }
    }

    #[test]
    fn test_display_date() {
        assert_eq!(display_date("2024-01-05"), "2024年1月5日");
        assert_eq!(display_date("2024-12-31"), "2024年12月31日");
        assert_eq!(display_date("soon"), "soon");
    }

    #[test]
    fn placeholders_for_empty_fields() {
        let kw = Keywords::default();
        let row = render_task(&task("2024-01-01", "", ""), None, ymd(2024, 1, 2), &kw);
        assert_eq!(row.site, REST_DAY);
        assert_eq!(row.note, NO_NOTE);
        assert!(!row.has_note);
        assert!(!row.is_today);
        assert_eq!(row.badge, None);
        assert!(row.sites.is_empty());
    }

    #[test]
    fn multi_site_row_has_badges() {
        let row = render_task(
            &task("2024-01-01", "A矿 / B矿", ""),
            Some("一组"),
            ymd(2024, 1, 1),
            &Keywords::default(),
        );
        assert_eq!(row.category, Category::MultiSite);
        assert_eq!(row.badge, Some("多矿/项目监测"));
        assert_eq!(row.sites, vec!["A矿", "B矿"]);
        assert_eq!(row.group.as_deref(), Some("一组"));
        assert!(row.is_today);
    }

    #[test]
    fn holiday_badge_wins() {
        let kw = Keywords::default();
        let row = render_task(&task("2024-01-01", "A矿/B矿", "元旦"), None, ymd(2024, 1, 1), &kw);
        assert_eq!(row.category, Category::Holiday);
        assert_eq!(row.badge, Some("节假日"));
    }

    #[test]
    fn today_highlight_needs_exact_date_string() {
        let kw = Keywords::default();
        let today = ymd(2024, 1, 31);
        for date in ["2024-1-31", " 2024-01-31 ", "2024/01/31"] {
            assert!(!render_task(&task(date, "A矿", ""), None, today, &kw).is_today, "{:?}", date);
        }
        assert!(render_task(&task("2024-01-31", "A矿", ""), None, today, &kw).is_today);
    }

    #[test]
    fn schedule_view_states() {
        let s = sample();
        let kw = Keywords::default();
        let today = ymd(2024, 1, 1);

        assert_eq!(
            render_schedule(&s, &Selection::new("9月"), today, &kw),
            ScheduleView::NoMonthData { message: NO_MONTH_DATA }
        );

        let mut sel = Selection::new("1月");
        sel.search = "nothing-here".to_string();
        assert_eq!(
            render_schedule(&s, &sel, today, &kw),
            ScheduleView::NoMatches { message: NO_MATCHES }
        );

        let ScheduleView::Groups { groups } = render_schedule(&s, &Selection::new("1月"), today, &kw)
        else {
            panic!("expected groups");
        };
        assert_eq!(groups[0].count_label, "2 个任务");
        assert!(groups[0].rows[0].is_today);
        assert!(!groups[0].rows[1].is_today);
    }

    #[test]
    fn upcoming_view() {
        let s = sample();
        let kw = Keywords::default();

        let UpcomingView::Tasks { range, items } = render_upcoming(&s, ymd(2024, 2, 10), &kw) else {
            panic!("expected tasks");
        };
        assert_eq!(range, "2024年2月10日 - 2024年2月11日");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].group.as_deref(), Some("一组"));
        assert_eq!(items[0].site, REST_DAY);
        assert!(items[0].is_today);
        assert_eq!(items[1].group.as_deref(), Some("三组"));
        assert!(!items[1].is_today);

        assert!(matches!(
            render_upcoming(&s, ymd(2025, 5, 5), &kw),
            UpcomingView::Empty { message: NOTHING_UPCOMING, .. }
        ));
    }

    #[test]
    fn page_tabs_and_badges() {
        let s = sample();
        let mut sel = Selection::new("2月");
        sel.group = GroupFilter::parse("三组");
        let page = render_page("排班", &s, &sel, ymd(2024, 2, 1), &Keywords::default());

        let active: Vec<&str> = page
            .months
            .iter()
            .filter(|m| m.active)
            .map(|m| m.label.as_str())
            .collect();
        assert_eq!(active, vec!["2月"]);

        let badges: Vec<(&str, bool)> = page
            .groups
            .iter()
            .map(|b| (b.value.as_str(), b.active))
            .collect();
        assert_eq!(
            badges,
            vec![("all", false), ("一组", false), ("二组", false), ("三组", true)]
        );
        assert_eq!(page.stats.current_month_tasks, 2);
        assert_eq!(page.today, "2024年2月1日");
    }

    #[test]
    fn page_serializes_with_state_tags() {
        let kw = Keywords::default();
        let page = render_page("排班", &sample(), &Selection::new("8月"), ymd(2024, 1, 1), &kw);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["schedule"]["state"], "no-month-data");
        assert_eq!(json["upcoming"]["state"], "tasks");
        assert_eq!(json["selection"]["group"], "all");
    }
}
