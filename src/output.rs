//! Output formatting utilities with TTY auto-detection and semantic styling.

use std::io::IsTerminal;

use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use serde::Serialize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::classify::Category;

/// Output format for commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-optimized: colors, boxes
    #[default]
    Pretty,
    /// Script-friendly: no colors, pipe-delimited
    Plain,
    /// Machine-readable JSON
    Json,
    /// Machine-readable YAML
    Yaml,
}

impl OutputFormat {
    /// Resolve the output format, applying TTY auto-detection.
    ///
    /// If format is Pretty but stdout is not a TTY, returns Plain.
    pub fn resolve(self) -> Self {
        match self {
            OutputFormat::Pretty if !std::io::stdout().is_terminal() => OutputFormat::Plain,
            other => other,
        }
    }
}

/// Print a value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("JSON serialization failed: {}", e))?;
    println!("{}", json);
    Ok(())
}

/// Print a value as YAML.
pub fn print_yaml<T: Serialize>(value: &T) -> Result<(), String> {
    let yaml =
        serde_yaml::to_string(value).map_err(|e| format!("YAML serialization failed: {}", e))?;
    print!("{}", yaml);
    Ok(())
}

// ============================================================================
// Semantic Styling - Centralized color/style decisions
// ============================================================================

/// Category colors match the HTML indicators.
/// - Red: holiday
/// - Yellow: multi-site / joint project
/// - Green: regular
pub fn style_category(category: Category, text: &str) -> ColoredString {
    match category {
        Category::Holiday => text.red(),
        Category::MultiSite => text.yellow(),
        Category::Regular => text.green(),
    }
}

/// Today's rows stand out, everything else is left alone.
pub fn style_today(text: &str, is_today: bool) -> String {
    if is_today {
        text.bold().reversed().to_string()
    } else {
        text.to_string()
    }
}

/// Placeholders (rest day, no note) are dimmed.
pub fn style_placeholder(text: &str, is_placeholder: bool) -> String {
    if is_placeholder {
        text.dimmed().to_string()
    } else {
        text.to_string()
    }
}

// ============================================================================
// Terminal utilities
// ============================================================================

/// Get terminal width, defaulting to 80 if unavailable.
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

/// Truncate to a display width, showing "prefix…".
///
/// Width is measured in terminal columns, so CJK characters count double.
pub fn truncate_back(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width <= 1 {
        return "…".to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width - 1 {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

/// Right-pad to a display width.
pub fn pad_to_width(s: &str, width: usize) -> String {
    let current = s.width();
    if current >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - current))
    }
}
