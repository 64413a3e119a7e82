//! The in-memory schedule store: month → group → ordered tasks.
//!
//! Month and group order follow the key order of the source JSON object. That order
//! drives month tabs, group badges, table order and export, so both levels are
//! `IndexMap`s. A repeated key keeps its first position and takes the last value.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

use crate::error::ScheduleError;

/// Literal filename offered for exports ("coal-mine monitoring data").
pub const EXPORT_FILE_NAME: &str = "煤矿监测数据.json";

/// One scheduled monitoring assignment.
///
/// Every field is a plain string; missing fields and JSON `null` both read as `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    /// Calendar date, `YYYY-MM-DD`
    #[serde(deserialize_with = "null_as_empty")]
    pub date: String,
    /// Weekday label, display only
    #[serde(deserialize_with = "null_as_empty")]
    pub day: String,
    /// Site name(s), several joined by `/`
    #[serde(deserialize_with = "null_as_empty")]
    pub mine: String,
    /// Free-text annotation
    #[serde(deserialize_with = "null_as_empty")]
    pub note: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A month's crews, each with its tasks, in source order.
pub type Groups = IndexMap<String, Vec<Task>>;

pub fn task_count(groups: &Groups) -> usize {
    groups.values().map(Vec::len).sum()
}

/// The whole schedule, in source order.
///
/// Equality compares contents; key order is checked through [`Schedule::month_labels`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    months: IndexMap<String, Groups>,
}

impl Schedule {
    pub fn months(&self) -> &IndexMap<String, Groups> {
        &self.months
    }

    pub fn month(&self, label: &str) -> Option<&Groups> {
        self.months.get(label)
    }

    pub fn has_month(&self, label: &str) -> bool {
        self.months.contains_key(label)
    }

    pub fn month_labels(&self) -> Vec<&str> {
        self.months.keys().map(String::as_str).collect()
    }

    /// Group labels across all months, in first-seen order.
    pub fn group_labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for label in self.months.values().flat_map(IndexMap::keys) {
            if !labels.contains(&label.as_str()) {
                labels.push(label);
            }
        }
        labels
    }

    pub fn total_tasks(&self) -> usize {
        self.months.values().map(task_count).sum()
    }

    /// Every task with its month and group label, in scan order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &Task)> {
        self.months.iter().flat_map(|(month, groups)| {
            groups.iter().flat_map(move |(group, tasks)| {
                tasks
                    .iter()
                    .map(move |t| (month.as_str(), group.as_str(), t))
            })
        })
    }

    /// Parse a schedule document.
    pub fn from_json(text: &str) -> Result<Self, ScheduleError> {
        serde_json::from_str(text).map_err(|source| ScheduleError::MalformedImport { source })
    }

    /// Serialize the whole store, two-space indented, no trailing newline.
    pub fn to_json(&self) -> Result<String, ScheduleError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load the startup data file.
    ///
    /// A file that does not exist, or whose document is `null`, is `MissingData`;
    /// the schedule cannot render without it.
    pub fn load(path: &Path) -> Result<Self, ScheduleError> {
        let missing = || ScheduleError::MissingData {
            path: path.to_path_buf(),
        };
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(missing()),
            Err(e) => return Err(ScheduleError::io(path, e)),
        };
        let schedule = serde_json::from_str::<Option<Self>>(&text)
            .map_err(|source| ScheduleError::MalformedImport { source })?
            .ok_or_else(missing)?;
        info!(
            path = %path.display(),
            months = schedule.months.len(),
            tasks = schedule.total_tasks(),
            "schedule loaded"
        );
        Ok(schedule)
    }

    /// Replace the whole store with a parsed document.
    ///
    /// The current contents are only touched once `text` has parsed successfully.
    pub fn replace_from_json(&mut self, text: &str) -> Result<(), ScheduleError> {
        let parsed = Self::from_json(text)?;
        *self = parsed;
        debug!(months = self.months.len(), "schedule replaced");
        Ok(())
    }

    /// Read a user-selected file and replace the store with it.
    pub fn import_file(&mut self, path: &Path) -> Result<(), ScheduleError> {
        let text = fs::read_to_string(path).map_err(|e| ScheduleError::io(path, e))?;
        self.replace_from_json(&text)?;
        info!(
            path = %path.display(),
            tasks = self.total_tasks(),
            "schedule imported"
        );
        Ok(())
    }

    /// Write the whole store as JSON.
    ///
    /// If `target` is a directory the file is named [`EXPORT_FILE_NAME`] inside it.
    /// Returns the path written.
    pub fn export_file(&self, target: &Path) -> Result<PathBuf, ScheduleError> {
        let path = if target.is_dir() {
            target.join(EXPORT_FILE_NAME)
        } else {
            target.to_path_buf()
        };
        let json = self.to_json()?;
        fs::write(&path, json).map_err(|e| ScheduleError::io(&path, e))?;
        info!(path = %path.display(), "schedule exported");
        Ok(path)
    }

    /// Write the store to `path` via a sibling temp file and rename.
    ///
    /// Readers of `path` see either the old or the new document, never a partial one.
    pub fn persist(&self, path: &Path) -> Result<(), ScheduleError> {
        let json = self.to_json()?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| EXPORT_FILE_NAME.to_string());
        let tmp = path.with_file_name(format!(".{}.tmp", file_name));
        fs::write(&tmp, json).map_err(|e| ScheduleError::io(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            ScheduleError::io(path, e)
        })?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
