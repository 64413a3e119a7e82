//! Configuration introspection command.
//!
//! Provides `minewatch config` subcommands:
//! - show: Display resolved configuration
//! - env: Resolution order and environment variables
//! - schema: Output JSON schema
//! - init: Create template project or user config file

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use colored::Colorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::config::{
    self, Config, ConfigSource, ENV_VARS, PROJECT_FILE, load_config, template_config,
    user_config_path,
};
use crate::output;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show resolved configuration
    Show(ShowArgs),

    /// Show resolution order and environment variables
    Env,

    /// Output JSON schema for config validation
    Schema,

    /// Create a template config file
    Init(InitArgs),
}

#[derive(Args)]
struct ShowArgs {
    /// Show where each value came from
    #[arg(long)]
    effective: bool,
}

#[derive(Args)]
struct InitArgs {
    /// Write the user config (~/.config/minewatch/config.yaml) instead of ./.minewatch.yaml
    #[arg(long)]
    global: bool,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

/// How each setting is resolved, first match wins.
const RESOLUTION: &[(&str, &str)] = &[
    ("data file", "--data, MINEWATCH_DATA, data.path, schedule.json"),
    (
        "month",
        "--month, MINEWATCH_MONTH, data.default_month, <calendar month>月 if present, \
         first month, 1月",
    ),
    ("today", "--today, MINEWATCH_TODAY, local date"),
    ("quiet", "behavior.quiet or MINEWATCH_QUIET"),
    ("log filter", "MINEWATCH_LOG, warn"),
];

/// Row data for the env table
#[derive(Tabled)]
struct EnvRow {
    #[tabled(rename = "VARIABLE")]
    name: &'static str,
    #[tabled(rename = "CURRENT")]
    current: String,
    #[tabled(rename = "VALUES")]
    values: &'static str,
    #[tabled(rename = "DEFAULT")]
    default: &'static str,
    #[tabled(rename = "CONFIG")]
    config_path: &'static str,
    #[tabled(rename = "DESCRIPTION")]
    description: &'static str,
}

pub fn run(args: ConfigArgs, cwd: &Path) -> Result<(), String> {
    match args.command {
        ConfigCommand::Show(show_args) => run_show(cwd, show_args.effective),
        ConfigCommand::Env => run_env(),
        ConfigCommand::Schema => run_schema(),
        ConfigCommand::Init(init_args) => run_init(cwd, init_args),
    }
}

fn run_show(cwd: &Path, effective: bool) -> Result<(), String> {
    let loaded = load_config(cwd);

    if effective {
        print_effective(&loaded.config, &loaded.sources)?;
    } else {
        let yaml = serde_yaml::to_string(&loaded.config)
            .map_err(|e| format!("failed to serialize config: {}", e))?;
        println!("{}", yaml.trim());
    }

    Ok(())
}

fn print_effective(config: &Config, sources: &[ConfigSource]) -> Result<(), String> {
    println!("# Resolved configuration");
    println!("# Sources (in order of precedence):");
    for source in sources {
        println!("#   - {}", source);
    }

    let overrides: Vec<_> = ENV_VARS
        .iter()
        .filter(|v| config::env_string(v.name).is_some())
        .collect();
    if !overrides.is_empty() {
        println!("# Environment overrides in effect:");
        for var in overrides {
            println!("#   - {} ({})", var.name, var.config_path);
        }
    }
    println!();

    let yaml = serde_yaml::to_string(config)
        .map_err(|e| format!("failed to serialize config: {}", e))?;
    print!("{}", yaml);
    Ok(())
}

fn env_rows() -> Vec<EnvRow> {
    ENV_VARS
        .iter()
        .map(|var| EnvRow {
            name: var.name,
            current: config::env_string(var.name).unwrap_or_else(|| "-".to_string()),
            values: var.values.unwrap_or("-"),
            default: var.default,
            config_path: var.config_path,
            description: var.description,
        })
        .collect()
}

fn run_env() -> Result<(), String> {
    println!("{}", "Resolution order (first match wins):".bold());
    let width = RESOLUTION.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, chain) in RESOLUTION {
        println!("  {}  {}", output::pad_to_width(name, width), chain.dimmed());
    }
    println!();

    let mut table = Table::new(env_rows());
    table.with(Style::rounded());
    println!("{}", table);

    Ok(())
}

fn run_schema() -> Result<(), String> {
    println!("{}", config::json_schema());
    Ok(())
}

fn init_target(cwd: &Path, global: bool) -> Result<PathBuf, String> {
    if global {
        user_config_path().ok_or_else(|| "cannot locate the user config directory".to_string())
    } else {
        Ok(cwd.join(PROJECT_FILE))
    }
}

fn write_template(path: &Path, force: bool) -> Result<(), String> {
    if path.exists() && !force {
        return Err(format!(
            "config already exists: {}\nUse --force to overwrite",
            path.display()
        ));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("failed to create {}: {}", parent.display(), e))?;
    }
    fs::write(path, template_config())
        .map_err(|e| format!("failed to write {}: {}", path.display(), e))
}

fn run_init(cwd: &Path, args: InitArgs) -> Result<(), String> {
    let path = init_target(cwd, args.global)?;
    write_template(&path, args.force)?;
    println!("Created: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_template_once_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let path = init_target(dir.path(), false).unwrap();
        assert_eq!(path, dir.path().join(PROJECT_FILE));

        write_template(&path, false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), template_config());

        let err = write_template(&path, false).unwrap_err();
        assert!(err.contains("already exists"));
        write_template(&path, true).unwrap();
    }

    #[test]
    fn test_write_template_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("minewatch").join("config.yaml");
        write_template(&path, false).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_resolution_covers_every_variable() {
        let chains: String = RESOLUTION.iter().map(|(_, chain)| *chain).collect();
        for var in ENV_VARS.iter().filter(|v| v.name.starts_with("MINEWATCH_")) {
            assert!(chains.contains(var.name), "{} missing from resolution order", var.name);
        }
        assert_eq!(env_rows().len(), ENV_VARS.len());
    }
}
