//! Interactive session state: the store, the selection, and the events that change them.
//!
//! Events run one at a time to completion. Each one either updates the selection,
//! replaces the store, or writes an export; the caller re-renders from [`Session::page`].

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use crate::classify::Keywords;
use crate::error::ScheduleError;
use crate::render::{self, Page};
use crate::schedule::Schedule;
use crate::select::{GroupFilter, Selection};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    SelectMonth(String),
    SelectGroup(GroupFilter),
    Search(String),
    /// Reset group filter and search, keep the month
    ClearFilters,
    Import(PathBuf),
    /// Export to a file or directory
    Export(PathBuf),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The selection changed; re-render.
    SelectionChanged,
    /// The store was replaced wholesale.
    Imported { months: usize, tasks: usize },
    Exported(PathBuf),
}

pub struct Session {
    schedule: Schedule,
    selection: Selection,
    keywords: Keywords,
    today: NaiveDate,
    title: String,
}

impl Session {
    pub fn new(
        schedule: Schedule,
        selection: Selection,
        keywords: Keywords,
        today: NaiveDate,
        title: String,
    ) -> Self {
        Self {
            schedule,
            selection,
            keywords,
            today,
            title,
        }
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Render the current state.
    pub fn page(&self) -> Page {
        render::render_page(
            &self.title,
            &self.schedule,
            &self.selection,
            self.today,
            &self.keywords,
        )
    }

    /// Apply one event.
    ///
    /// A failed import or export leaves both store and selection as they were.
    pub fn apply(&mut self, event: Event) -> Result<Outcome, ScheduleError> {
        debug!(?event, "session event");
        match event {
            Event::SelectMonth(month) => {
                self.selection.month = month;
                Ok(Outcome::SelectionChanged)
            }
            Event::SelectGroup(group) => {
                self.selection.group = group;
                Ok(Outcome::SelectionChanged)
            }
            Event::Search(term) => {
                self.selection.search = term;
                Ok(Outcome::SelectionChanged)
            }
            Event::ClearFilters => {
                self.selection.group = GroupFilter::All;
                self.selection.search.clear();
                Ok(Outcome::SelectionChanged)
            }
            Event::Import(path) => self.import(&path),
            Event::Export(target) => Ok(Outcome::Exported(self.schedule.export_file(&target)?)),
        }
    }

    fn import(&mut self, path: &Path) -> Result<Outcome, ScheduleError> {
        self.schedule.import_file(path)?;
        Ok(Outcome::Imported {
            months: self.schedule.months().len(),
            tasks: self.schedule.total_tasks(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ScheduleView;
    use crate::schedule::tests::sample;
    use std::fs;

    fn session() -> Session {
        Session::new(
            sample(),
            Selection::new("1月"),
            Keywords::default(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            "排班".to_string(),
        )
    }

    fn group_labels(page: &Page) -> Vec<String> {
        match &page.schedule {
            ScheduleView::Groups { groups } => groups.iter().map(|g| g.label.clone()).collect(),
            _ => Vec::new(),
        }
    }

    #[test]
    fn selection_events_rerender() {
        let mut s = session();
        assert_eq!(group_labels(&s.page()), vec!["一组", "二组"]);

        s.apply(Event::SelectGroup(GroupFilter::parse("二组"))).unwrap();
        assert_eq!(group_labels(&s.page()), vec!["二组"]);

        s.apply(Event::SelectMonth("2月".to_string())).unwrap();
        assert!(matches!(s.page().schedule, ScheduleView::NoMatches { .. }));

        s.apply(Event::ClearFilters).unwrap();
        assert_eq!(group_labels(&s.page()), vec!["一组", "三组"]);
        assert_eq!(s.selection().month, "2月");

        s.apply(Event::Search("麦垛山".to_string())).unwrap();
        assert_eq!(group_labels(&s.page()), vec!["三组"]);
        assert_eq!(s.page().stats.current_month_tasks, 2);
    }

    #[test]
    fn month_change_updates_stats() {
        let mut s = session();
        assert_eq!(s.page().stats.current_month_tasks, 3);
        s.apply(Event::SelectMonth("2月".to_string())).unwrap();
        assert_eq!(s.page().stats.current_month_tasks, 2);
        assert_eq!(s.page().stats.total_tasks, 5);
    }

    #[test]
    fn bad_import_keeps_store_and_view() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{\"1月\": {").unwrap();

        let mut s = session();
        let before = s.page();
        let err = s.apply(Event::Import(path)).unwrap_err();
        assert!(matches!(err, ScheduleError::MalformedImport { .. }));
        assert_eq!(s.page(), before);
    }

    #[test]
    fn export_then_import_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session();

        let Outcome::Exported(path) = s.apply(Event::Export(dir.path().to_path_buf())).unwrap()
        else {
            panic!("expected export");
        };
        assert!(path.ends_with(crate::schedule::EXPORT_FILE_NAME));

        fs::write(dir.path().join("other.json"), r#"{"3月": {"x": [{"date": "2024-03-01"}]}}"#)
            .unwrap();
        let outcome = s.apply(Event::Import(dir.path().join("other.json"))).unwrap();
        assert_eq!(outcome, Outcome::Imported { months: 1, tasks: 1 });
        assert!(matches!(s.page().schedule, ScheduleView::NoMonthData { .. }));

        s.apply(Event::Import(path)).unwrap();
        assert_eq!(s.schedule(), &sample());
    }
}
