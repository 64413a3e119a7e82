//! Selection state and the filter/sort pipeline that feeds the renderer.

use std::fmt;

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::schedule::{Schedule, Task};

/// Format of `Task::date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Selection state
// ============================================================================

/// Group filter: everything, or one group label.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum GroupFilter {
    #[default]
    All,
    Named(String),
}

impl GroupFilter {
    /// Exactly `"all"` selects every group; anything else is a group label as given.
    pub fn parse(s: &str) -> Self {
        if s == "all" {
            GroupFilter::All
        } else {
            GroupFilter::Named(s.to_string())
        }
    }

    pub fn matches(&self, group: &str) -> bool {
        match self {
            GroupFilter::All => true,
            GroupFilter::Named(name) => name == group,
        }
    }
}

impl fmt::Display for GroupFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupFilter::All => write!(f, "all"),
            GroupFilter::Named(name) => write!(f, "{}", name),
        }
    }
}

impl Serialize for GroupFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// What the user is looking at: month, group filter and search text.
///
/// Passed explicitly to every pipeline call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub month: String,
    pub group: GroupFilter,
    pub search: String,
}

impl Selection {
    pub fn new(month: impl Into<String>) -> Self {
        Self {
            month: month.into(),
            ..Default::default()
        }
    }
}

// ============================================================================
// Filter / sort
// ============================================================================

/// Surviving tasks of one group, sorted by date.
#[derive(Debug, PartialEq, Eq)]
pub struct GroupTasks<'a> {
    pub label: &'a str,
    pub tasks: Vec<&'a Task>,
}

/// Result of [`select`].
#[derive(Debug, PartialEq, Eq)]
pub enum Selected<'a> {
    /// The month is not a key of the store.
    NoMonthData,
    /// The month exists but no task passed the filters.
    NoMatches,
    Groups(Vec<GroupTasks<'a>>),
}

/// Sort key for a task date. `None` for anything that is not a date.
pub fn date_key(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).ok()
}

/// Stable ascending sort; unparseable dates go last, in input order.
fn sort_by_date<T>(items: &mut [T], date: impl Fn(&T) -> &str) {
    items.sort_by_key(|item| {
        let key = date_key(date(item));
        (key.is_none(), key)
    });
}

/// Search match: case-insensitive on site and note, literal on date.
pub fn matches_search(task: &Task, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let lower = term.to_lowercase();
    task.mine.to_lowercase().contains(&lower)
        || task.note.to_lowercase().contains(&lower)
        || task.date.contains(term)
}

/// Tasks of the selected month that pass the group filter and search term.
///
/// Groups keep store order; groups left empty are dropped.
pub fn select<'a>(schedule: &'a Schedule, selection: &Selection) -> Selected<'a> {
    let Some(month) = schedule.month(&selection.month) else {
        return Selected::NoMonthData;
    };

    let groups: Vec<GroupTasks<'a>> = month
        .iter()
        .filter(|(label, _)| selection.group.matches(label))
        .filter_map(|(label, tasks)| {
            let mut tasks: Vec<&Task> = tasks
                .iter()
                .filter(|t| matches_search(t, &selection.search))
                .collect();
            if tasks.is_empty() {
                return None;
            }
            sort_by_date(&mut tasks, |t| t.date.as_str());
            Some(GroupTasks { label, tasks })
        })
        .collect();

    if groups.is_empty() {
        Selected::NoMatches
    } else {
        Selected::Groups(groups)
    }
}

// ============================================================================
// Upcoming (today + tomorrow)
// ============================================================================

#[derive(Debug, PartialEq, Eq)]
pub struct UpcomingTask<'a> {
    pub group: &'a str,
    pub task: &'a Task,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Upcoming<'a> {
    Empty,
    Tasks(Vec<UpcomingTask<'a>>),
}

/// Today and the following day.
pub fn upcoming_dates(today: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = vec![today];
    dates.extend(today.checked_add_days(Days::new(1)));
    dates
}

/// A date as it is written in `Task::date`.
pub fn date_string(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Whether the task is scheduled on `date`: its date string equals `YYYY-MM-DD` exactly.
pub fn is_on(task: &Task, date: NaiveDate) -> bool {
    task.date == date_string(date)
}

/// Tasks dated today or tomorrow, from every month and group.
///
/// Sorted by date; equal dates keep scan order.
pub fn upcoming(schedule: &Schedule, today: NaiveDate) -> Upcoming<'_> {
    let targets: Vec<String> = upcoming_dates(today).into_iter().map(date_string).collect();
    let mut found: Vec<UpcomingTask<'_>> = schedule
        .entries()
        .filter(|(_, _, task)| targets.contains(&task.date))
        .map(|(_, group, task)| UpcomingTask { group, task })
        .collect();

    if found.is_empty() {
        return Upcoming::Empty;
    }
    sort_by_date(&mut found, |u| u.task.date.as_str());
    Upcoming::Tasks(found)
}
