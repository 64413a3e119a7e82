pub mod browse;
pub mod config_cmd;
pub mod export;
pub mod html;
pub mod import;
pub mod months;
pub mod show;
pub mod stats;
pub mod upcoming;

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::error;

use crate::config::{self, Config};
use crate::error::ScheduleError;
use crate::schedule::Schedule;

/// Resolved inputs shared by every data command.
pub struct Context {
    pub config: Config,
    pub data_path: PathBuf,
    pub today: NaiveDate,
}

impl Context {
    /// Load the schedule from the resolved data path.
    pub fn load_schedule(&self) -> Result<Schedule, ScheduleError> {
        Schedule::load(&self.data_path).inspect_err(|e| {
            if matches!(e, ScheduleError::MissingData { .. }) {
                error!(path = %self.data_path.display(), "no schedule data");
            }
        })
    }

    /// Month to show: flag, env, config, then calendar/first-month fallback.
    pub fn month(&self, flag: Option<&str>, schedule: &Schedule) -> String {
        config::resolve_month(flag, &self.config, schedule, self.today)
    }

    pub fn quiet(&self) -> bool {
        config::is_quiet(&self.config)
    }
}
