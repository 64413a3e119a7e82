//! Configuration system for the minewatch CLI.
//!
//! Configuration is loaded from multiple sources with the following precedence:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (MINEWATCH_*)
//! 3. Project file (./.minewatch.yaml)
//! 4. User global (~/.config/minewatch/config.yaml)
//! 5. Built-in defaults (lowest priority)
//!
//! This module provides:
//! - `Config` struct with all settings
//! - `EnvVar` registry for documentation
//! - Helper functions for env var parsing
//! - Config loading and merging

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::classify::Keywords;
use crate::schedule::Schedule;

// ============================================================================
// Config Structs
// ============================================================================

/// Root configuration for minewatch.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Where the schedule comes from
    pub data: DataConfig,
    /// Keyword lists for classification and site counting
    pub keywords: Keywords,
    /// Display settings
    pub display: DisplayConfig,
    /// Behavior settings
    pub behavior: BehaviorConfig,
}

/// Data source settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DataConfig {
    /// Schedule JSON file
    pub path: String,
    /// Month shown first (null = current calendar month if present, else first month)
    pub default_month: Option<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_DATA_FILE.to_string(),
            default_month: None,
        }
    }
}

/// Display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DisplayConfig {
    /// Page and table title
    pub title: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

/// Behavior defaults.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Suppress hints
    pub quiet: bool,
}

pub const DEFAULT_DATA_FILE: &str = "schedule.json";
pub const DEFAULT_TITLE: &str = "煤矿监测排班表";

// ============================================================================
// Config Source Tracking
// ============================================================================

/// Source of a configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Built-in default
    Default,
    /// User global config (~/.config/minewatch/config.yaml)
    UserGlobal,
    /// Project file in the working directory
    Project(String),
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::UserGlobal => write!(f, "~/.config/minewatch/config.yaml"),
            ConfigSource::Project(path) => write!(f, "{}", path),
        }
    }
}

// ============================================================================
// Environment Variable Registry
// ============================================================================

/// Environment variable definition for documentation.
pub struct EnvVar {
    /// Variable name (e.g., "MINEWATCH_DATA")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Default value or behavior
    pub default: &'static str,
    /// Config path this maps to (e.g., "data.path")
    pub config_path: &'static str,
    /// Valid values (if enumerable)
    pub values: Option<&'static str>,
}

/// Registry of all supported environment variables.
pub const ENV_VARS: &[EnvVar] = &[
    EnvVar {
        name: "NO_COLOR",
        description: "Disable colored output (standard)",
        default: "unset",
        config_path: "-",
        values: Some("any non-empty value"),
    },
    EnvVar {
        name: "MINEWATCH_DATA",
        description: "Schedule JSON file to load",
        default: DEFAULT_DATA_FILE,
        config_path: "data.path",
        values: Some("path"),
    },
    EnvVar {
        name: "MINEWATCH_MONTH",
        description: "Month selected at startup",
        default: "current calendar month, else first month",
        config_path: "data.default_month",
        values: Some("month label, e.g. 1月"),
    },
    EnvVar {
        name: "MINEWATCH_TODAY",
        description: "Override today's date for upcoming/highlight",
        default: "local date",
        config_path: "-",
        values: Some("YYYY-MM-DD"),
    },
    EnvVar {
        name: "MINEWATCH_QUIET",
        description: "Suppress hint messages",
        default: "false",
        config_path: "behavior.quiet",
        values: Some("1, true, yes"),
    },
    EnvVar {
        name: "MINEWATCH_LOG",
        description: "Log filter (tracing EnvFilter syntax), written to stderr",
        default: "warn",
        config_path: "-",
        values: Some("error, warn, info, debug, trace"),
    },
];

// ============================================================================
// Environment Variable Helpers
// ============================================================================

/// Parse a boolean environment variable.
///
/// Returns `Some(true)` if the variable is set to a truthy value (1, true, yes),
/// `Some(false)` if set to a falsy value (0, false, no),
/// and `None` if unset or empty.
pub fn env_bool(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|v| {
        if v.is_empty() {
            return None;
        }
        let lower = v.to_lowercase();
        match lower.as_str() {
            "1" | "true" | "yes" => Some(true),
            "0" | "false" | "no" => Some(false),
            _ => None,
        }
    })
}

/// Parse a string environment variable.
///
/// Returns `Some(value)` if set and non-empty, `None` otherwise.
pub fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

// ============================================================================
// Config Loading
// ============================================================================

/// Project config file name, looked up in the working directory.
pub const PROJECT_FILE: &str = ".minewatch.yaml";

/// Load configuration from all sources.
///
/// Resolution order (later overrides earlier):
/// 1. Built-in defaults
/// 2. User global (~/.config/minewatch/config.yaml)
/// 3. Project file (./.minewatch.yaml)
///
/// Does not apply CLI flags or ENV vars; `resolve_*` helpers do that at point of use.
pub fn load_config(cwd: &Path) -> LoadedConfig {
    let mut config = Config::default();
    let mut sources = vec![ConfigSource::Default];

    if let Some(user_config_path) = user_config_path()
        && let Some(user_config) = load_file(&user_config_path)
    {
        merge(&mut config, &user_config);
        sources.push(ConfigSource::UserGlobal);
    }

    let project = cwd.join(PROJECT_FILE);
    if let Some(project_config) = load_file(&project) {
        merge(&mut config, &project_config);
        sources.push(ConfigSource::Project(PROJECT_FILE.to_string()));
    }

    LoadedConfig { config, sources }
}

/// Result of loading configuration with source tracking.
#[derive(Debug)]
pub struct LoadedConfig {
    /// The merged configuration
    pub config: Config,
    /// Sources that contributed to this config (in order of application)
    pub sources: Vec<ConfigSource>,
}

/// Get the user config file path (~/.config/minewatch/config.yaml).
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("minewatch").join("config.yaml"))
}

/// Load a config file, returning None if it doesn't exist or can't be parsed.
pub fn load_file(path: &Path) -> Option<Config> {
    let content = fs::read_to_string(path).ok()?;
    match serde_yaml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Merge overlay config into base config.
///
/// Non-default values in overlay override values in base.
/// For Vec fields, overlay replaces entirely (not appended).
pub fn merge(base: &mut Config, overlay: &Config) {
    let default_data = DataConfig::default();
    if overlay.data.path != default_data.path {
        base.data.path = overlay.data.path.clone();
    }
    if overlay.data.default_month.is_some() {
        base.data.default_month = overlay.data.default_month.clone();
    }

    let default_keywords = Keywords::default();
    if overlay.keywords.holiday != default_keywords.holiday {
        base.keywords.holiday = overlay.keywords.holiday.clone();
    }
    if overlay.keywords.joint_project != default_keywords.joint_project {
        base.keywords.joint_project = overlay.keywords.joint_project.clone();
    }
    if overlay.keywords.site_exclude != default_keywords.site_exclude {
        base.keywords.site_exclude = overlay.keywords.site_exclude.clone();
    }

    if overlay.display.title != DisplayConfig::default().title {
        base.display.title = overlay.display.title.clone();
    }

    if overlay.behavior.quiet != BehaviorConfig::default().quiet {
        base.behavior.quiet = overlay.behavior.quiet;
    }
}

// ============================================================================
// Resolution helpers
// ============================================================================

/// Check if quiet mode is enabled (suppress hints).
///
/// Checks both config.behavior.quiet and MINEWATCH_QUIET env var.
pub fn is_quiet(config: &Config) -> bool {
    config.behavior.quiet || env_bool("MINEWATCH_QUIET").unwrap_or(false)
}

/// Data file: CLI flag, then MINEWATCH_DATA, then config.
pub fn resolve_data_path(flag: Option<&Path>, config: &Config) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(|| env_string("MINEWATCH_DATA").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(&config.data.path))
}

/// Today's date: CLI flag, then MINEWATCH_TODAY, then the local calendar date.
pub fn resolve_today(flag: Option<NaiveDate>) -> Result<NaiveDate, String> {
    if let Some(today) = flag {
        return Ok(today);
    }
    match env_string("MINEWATCH_TODAY") {
        Some(raw) => NaiveDate::parse_from_str(&raw, crate::select::DATE_FORMAT)
            .map_err(|e| format!("invalid MINEWATCH_TODAY {:?}: {}", raw, e)),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

/// Month selected at startup.
///
/// CLI flag, MINEWATCH_MONTH, `data.default_month`; otherwise `<current month>月` when the
/// store has it, else the store's first month, else `1月`.
pub fn resolve_month(
    flag: Option<&str>,
    config: &Config,
    schedule: &Schedule,
    today: NaiveDate,
) -> String {
    if let Some(month) = flag
        .map(str::to_string)
        .or_else(|| env_string("MINEWATCH_MONTH"))
        .or_else(|| config.data.default_month.clone())
    {
        return month;
    }

    let calendar = format!("{}月", today.month());
    if schedule.has_month(&calendar) {
        return calendar;
    }
    schedule
        .month_labels()
        .first()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "1月".to_string())
}

/// Generate JSON schema for the config.
pub fn json_schema() -> String {
    let schema = schemars::schema_for!(Config);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string())
}

/// Generate a template config file with comments.
pub fn template_config() -> String {
    r#"# minewatch configuration
# Place in ./.minewatch.yaml or ~/.config/minewatch/config.yaml

# Data source
# data:
#   path: schedule.json
#   default_month: null   # null = current calendar month if present, else first month

# Keyword lists
# keywords:
#   holiday: [元旦, 春节, 清明, 五一, 端午, 中秋, 国庆]
#   joint_project: 综治项目
#   site_exclude: [元旦, 春节, 清明, 五一, 端午, 中秋, 国庆, 节假日]

# Display settings
# display:
#   title: 煤矿监测排班表

# Behavior settings
# behavior:
#   quiet: false
"#
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::tests::sample;
    use std::sync::Mutex;

    // Mutex to serialize env var tests
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn with_env<F, R>(vars: &[(&str, Option<&str>)], f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());

        let originals: Vec<_> = vars
            .iter()
            .map(|(k, _)| (*k, std::env::var(*k).ok()))
            .collect();

        // SAFETY: env mutation is serialized by ENV_MUTEX.
        for (k, v) in vars {
            match v {
                Some(val) => unsafe { std::env::set_var(k, val) },
                None => unsafe { std::env::remove_var(k) },
            }
        }

        let result = f();

        for (k, original) in originals {
            match original {
                Some(val) => unsafe { std::env::set_var(k, val) },
                None => unsafe { std::env::remove_var(k) },
            }
        }

        result
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_env_bool() {
        with_env(&[("MW_TEST_BOOL", Some("YES"))], || {
            assert_eq!(env_bool("MW_TEST_BOOL"), Some(true));
        });
        with_env(&[("MW_TEST_BOOL", Some("0"))], || {
            assert_eq!(env_bool("MW_TEST_BOOL"), Some(false));
        });
        with_env(&[("MW_TEST_BOOL", Some("maybe"))], || {
            assert_eq!(env_bool("MW_TEST_BOOL"), None);
        });
        with_env(&[("MW_TEST_BOOL", None)], || {
            assert_eq!(env_bool("MW_TEST_BOOL"), None);
        });
    }

    #[test]
    fn test_env_string() {
        with_env(&[("MW_TEST_STR", Some("hello"))], || {
            assert_eq!(env_string("MW_TEST_STR"), Some("hello".to_string()));
        });
        with_env(&[("MW_TEST_STR", Some(""))], || {
            assert_eq!(env_string("MW_TEST_STR"), None);
        });
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.data.path, "schedule.json");
        assert_eq!(config.data.default_month, None);
        assert!(config.keywords.holiday.contains(&"春节".to_string()));
        assert_eq!(config.display.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_merge_overlay_wins() {
        let mut base = Config::default();
        let mut overlay = Config::default();
        overlay.data.path = "other.json".to_string();
        overlay.keywords.joint_project = "联合检查".to_string();

        merge(&mut base, &overlay);

        assert_eq!(base.data.path, "other.json");
        assert_eq!(base.keywords.joint_project, "联合检查");
        // Untouched lists keep their defaults
        assert_eq!(base.keywords.holiday, Keywords::default().holiday);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: Config = serde_yaml::from_str("keywords:\n  holiday: [元宵]\n").unwrap();
        assert_eq!(config.keywords.holiday, vec!["元宵"]);
        assert_eq!(config.keywords.joint_project, "综治项目");
        assert_eq!(config.data.path, "schedule.json");
    }

    #[test]
    fn test_load_config_project_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(PROJECT_FILE),
            "data:\n  default_month: 3月\n",
        )
        .unwrap();
        let loaded = load_config(dir.path());
        assert_eq!(loaded.config.data.default_month.as_deref(), Some("3月"));
        assert_eq!(
            loaded.sources.last(),
            Some(&ConfigSource::Project(PROJECT_FILE.to_string()))
        );
    }

    #[test]
    fn test_unparseable_project_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PROJECT_FILE), "data: [not, a, map").unwrap();
        let loaded = load_config(dir.path());
        assert!(!loaded
            .sources
            .contains(&ConfigSource::Project(PROJECT_FILE.to_string())));
    }

    #[test]
    fn test_resolve_month_fallbacks() {
        with_env(&[("MINEWATCH_MONTH", None)], || {
            let s = sample();
            let mut config = Config::default();

            // Calendar month present in store
            assert_eq!(resolve_month(None, &config, &s, ymd(2024, 2, 5)), "2月");
            // Calendar month missing: first month
            assert_eq!(resolve_month(None, &config, &s, ymd(2024, 9, 5)), "1月");
            // Empty store
            assert_eq!(
                resolve_month(None, &config, &Schedule::default(), ymd(2024, 9, 5)),
                "1月"
            );
            // Config, then flag
            config.data.default_month = Some("12月".to_string());
            assert_eq!(resolve_month(None, &config, &s, ymd(2024, 2, 5)), "12月");
            assert_eq!(resolve_month(Some("2月"), &config, &s, ymd(2024, 9, 5)), "2月");
        });
    }

    #[test]
    fn test_resolve_today() {
        with_env(&[("MINEWATCH_TODAY", Some("2024-03-08"))], || {
            assert_eq!(resolve_today(None).unwrap(), ymd(2024, 3, 8));
            assert_eq!(resolve_today(Some(ymd(2020, 1, 1))).unwrap(), ymd(2020, 1, 1));
        });
        with_env(&[("MINEWATCH_TODAY", Some("tomorrow"))], || {
            assert!(resolve_today(None).is_err());
        });
    }

    #[test]
    fn test_resolve_data_path() {
        with_env(&[("MINEWATCH_DATA", Some("/env/data.json"))], || {
            let config = Config::default();
            assert_eq!(
                resolve_data_path(None, &config),
                PathBuf::from("/env/data.json")
            );
            assert_eq!(
                resolve_data_path(Some(Path::new("flag.json")), &config),
                PathBuf::from("flag.json")
            );
        });
        with_env(&[("MINEWATCH_DATA", None)], || {
            assert_eq!(
                resolve_data_path(None, &Config::default()),
                PathBuf::from("schedule.json")
            );
        });
    }

    #[test]
    fn test_json_schema_generates() {
        let schema = json_schema();
        assert!(schema.contains("Config"));
        assert!(schema.contains("Keywords"));
    }

    #[test]
    fn test_template_parses_as_defaults() {
        let template = template_config();
        assert!(template.contains("# minewatch configuration"));
        let config: Config = serde_yaml::from_str(&template).unwrap_or_default();
        assert_eq!(config, Config::default());
    }
}
