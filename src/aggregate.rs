//! Summary counters over the whole schedule.

use std::collections::HashSet;

use serde::Serialize;

use crate::classify::{Keywords, split_sites};
use crate::schedule::Schedule;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Aggregates {
    /// Tasks across every month and group
    pub total_tasks: usize,
    /// Distinct site names, holiday-like fragments excluded
    pub unique_sites: usize,
    /// Tasks filed under the current month
    pub current_month_tasks: usize,
}

/// Single pass over the store.
///
/// Site names come from splitting `mine` on `/` and trimming; a fragment is dropped when
/// the fragment text itself contains an exclusion keyword, regardless of the task's note.
pub fn aggregate(schedule: &Schedule, current_month: &str, keywords: &Keywords) -> Aggregates {
    let mut totals = Aggregates::default();
    let mut sites: HashSet<&str> = HashSet::new();

    for (month, _group, task) in schedule.entries() {
        totals.total_tasks += 1;
        if month == current_month {
            totals.current_month_tasks += 1;
        }
        sites.extend(split_sites(&task.mine).filter(|s| !keywords.is_excluded_site(s)));
    }

    totals.unique_sites = sites.len();
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::tests::sample;

    #[test]
    fn single_holiday_task_still_counts_its_sites() {
        let s = Schedule::from_json(
            r#"{"1月": {"一组": [{"date":"2024-01-01","day":"周一","mine":"A矿/B矿","note":"元旦"}]}}"#,
        )
        .unwrap();
        let a = aggregate(&s, "1月", &Keywords::default());
        assert_eq!(
            a,
            Aggregates {
                total_tasks: 1,
                unique_sites: 2,
                current_month_tasks: 1,
            }
        );
    }

    #[test]
    fn total_is_independent_of_current_month() {
        let s = sample();
        let kw = Keywords::default();
        for month in ["1月", "2月", "12月", ""] {
            assert_eq!(aggregate(&s, month, &kw).total_tasks, s.total_tasks());
        }
        assert_eq!(aggregate(&s, "1月", &kw).current_month_tasks, 3);
        assert_eq!(aggregate(&s, "2月", &kw).current_month_tasks, 2);
        assert_eq!(aggregate(&s, "12月", &kw).current_month_tasks, 0);
    }

    #[test]
    fn sites_are_split_trimmed_and_deduplicated() {
        // 红柳矿 appears twice, once padded; A矿, B矿, 石槽村矿, 麦垛山矿 once each.
        let a = aggregate(&sample(), "1月", &Keywords::default());
        assert_eq!(a.unique_sites, 5);
    }

    #[test]
    fn fragments_with_exclusion_keyword_are_dropped() {
        let s = Schedule::from_json(
            r#"{"1月": {"g": [
                {"date":"2024-01-01","mine":"节假日"},
                {"date":"2024-01-02","mine":"春节休息/红柳矿"},
                {"date":"2024-01-03","mine":"  "}
            ]}}"#,
        )
        .unwrap();
        let a = aggregate(&s, "1月", &Keywords::default());
        assert_eq!(a.total_tasks, 3);
        assert_eq!(a.unique_sites, 1);
    }

    #[test]
    fn empty_store() {
        let a = aggregate(&Schedule::default(), "1月", &Keywords::default());
        assert_eq!(a, Aggregates::default());
    }
}
