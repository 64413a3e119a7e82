//! Error kinds for loading, importing and exporting schedule data.

use std::path::PathBuf;

use thiserror::Error;

/// Fixed message shown in place of the schedule when no data was supplied.
pub const MISSING_DATA_MESSAGE: &str = "数据加载失败，请刷新页面重试";

#[derive(Error, Debug)]
pub enum ScheduleError {
    /// No schedule data at startup: the file is absent or holds `null`.
    #[error("{} (no schedule data in {})", MISSING_DATA_MESSAGE, .path.display())]
    MissingData { path: PathBuf },

    /// A document offered for import is not valid schedule JSON.
    #[error("not a valid schedule document: {source}")]
    MalformedImport {
        #[source]
        source: serde_json::Error,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ScheduleError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScheduleError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_data_message_names_path() {
        let err = ScheduleError::MissingData {
            path: PathBuf::from("/nope/schedule.json"),
        };
        let msg = err.to_string();
        assert!(msg.starts_with(MISSING_DATA_MESSAGE));
        assert!(msg.contains("/nope/schedule.json"));
    }

    #[test]
    fn malformed_import_keeps_parse_error() {
        let source = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = ScheduleError::MalformedImport { source };
        assert!(err.to_string().starts_with("not a valid schedule document"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
