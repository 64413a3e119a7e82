//! Task classification by keyword matching.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::schedule::Task;

/// Display category of a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Holiday,
    MultiSite,
    Regular,
}

impl Category {
    /// Badge text.
    pub fn label(self) -> &'static str {
        match self {
            Category::Holiday => "节假日",
            Category::MultiSite => "多矿/项目监测",
            Category::Regular => "常规监测",
        }
    }

    /// CSS class of the category indicator.
    pub fn css_class(self) -> &'static str {
        match self {
            Category::Holiday => "task-type-holiday",
            Category::MultiSite => "task-type-multi",
            Category::Regular => "task-type-regular",
        }
    }
}

/// Separator between site names inside `Task::mine`.
pub const SITE_SEPARATOR: char = '/';

/// Keyword lists used by classification and site counting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Keywords {
    /// Holiday names; a note containing one marks the task as a holiday
    pub holiday: Vec<String>,
    /// A note containing this marks a joint (multi-site) project
    pub joint_project: String,
    /// Site fragments containing any of these are not counted as sites
    pub site_exclude: Vec<String>,
}

impl Default for Keywords {
    fn default() -> Self {
        let holiday: Vec<String> = ["元旦", "春节", "清明", "五一", "端午", "中秋", "国庆"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut site_exclude = holiday.clone();
        site_exclude.push("节假日".to_string());
        Self {
            holiday,
            joint_project: "综治项目".to_string(),
            site_exclude,
        }
    }
}

impl Keywords {
    pub fn is_holiday_note(&self, note: &str) -> bool {
        self.holiday.iter().any(|k| !k.is_empty() && note.contains(k.as_str()))
    }

    pub fn is_excluded_site(&self, fragment: &str) -> bool {
        self.site_exclude
            .iter()
            .any(|k| !k.is_empty() && fragment.contains(k.as_str()))
    }
}

/// Classify a task. First match wins: holiday, then multi-site, then regular.
pub fn classify(task: &Task, keywords: &Keywords) -> Category {
    if keywords.is_holiday_note(&task.note) {
        Category::Holiday
    } else if task.mine.contains(SITE_SEPARATOR)
        || (!keywords.joint_project.is_empty() && task.note.contains(&keywords.joint_project))
    {
        Category::MultiSite
    } else {
        Category::Regular
    }
}

/// Trimmed, non-empty site names of a `mine` field.
pub fn split_sites(mine: &str) -> impl Iterator<Item = &str> {
    mine.split(SITE_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(mine: &str, note: &str) -> Task {
        Task {
            date: "2024-01-01".to_string(),
            day: "周一".to_string(),
            mine: mine.to_string(),
            note: note.to_string(),
        }
    }

    #[test]
    fn test_classify() {
        let kw = Keywords::default();
        let cases = vec![
            ("A矿/B矿", "元旦", Category::Holiday),
            ("", "春节值班", Category::Holiday),
            ("红柳矿", "国庆", Category::Holiday),
            ("A矿/B矿", "", Category::MultiSite),
            ("石槽村矿", "综治项目", Category::MultiSite),
            ("红柳矿", "", Category::Regular),
            ("", "", Category::Regular),
            ("红柳矿", "例行检查", Category::Regular),
        ];

        for (mine, note, want) in cases {
            let got = classify(&task(mine, note), &kw);
            assert_eq!(got, want, "classify(mine={:?}, note={:?})", mine, note);
        }
    }

    #[test]
    fn holiday_in_mine_field_does_not_count() {
        // Only the note carries holiday semantics for classification.
        assert_eq!(
            classify(&task("春节", ""), &Keywords::default()),
            Category::Regular
        );
    }

    #[test]
    fn empty_keywords_never_match() {
        let kw = Keywords {
            holiday: vec![String::new()],
            joint_project: String::new(),
            site_exclude: vec![String::new()],
        };
        assert_eq!(classify(&task("红柳矿", "任意"), &kw), Category::Regular);
        assert!(!kw.is_excluded_site("红柳矿"));
    }

    #[test]
    fn site_exclusion_covers_holidays_and_generic_marker() {
        let kw = Keywords::default();
        assert!(kw.is_excluded_site("春节休息"));
        assert!(kw.is_excluded_site("节假日"));
        assert!(kw.is_excluded_site("中秋"));
        assert!(!kw.is_excluded_site("红柳矿"));
    }

    #[test]
    fn split_sites_trims_and_skips_empty() {
        let sites: Vec<&str> = split_sites(" A矿 / B矿 //").collect();
        assert_eq!(sites, vec!["A矿", "B矿"]);
        assert_eq!(split_sites("").count(), 0);
    }

    #[test]
    fn labels() {
        assert_eq!(Category::Holiday.label(), "节假日");
        assert_eq!(Category::MultiSite.label(), "多矿/项目监测");
        assert_eq!(Category::Regular.css_class(), "task-type-regular");
    }
}
