//! Shared CLI argument structs for consistent flag definitions across commands.
//!
//! These structs centralize common flags like format and selection options.
//! Use `#[command(flatten)]` to include them in command-specific Args structs.

use clap::Args;

use crate::output::OutputFormat;
use crate::select::{GroupFilter, Selection};

// ============================================================================
// FormatArgs - Output format flags
// ============================================================================

/// Common output format flags.
///
/// Provides consistent --format/-f and --json flags across commands.
/// Use `resolve()` to get the effective format with TTY auto-detection.
#[derive(Args, Clone, Debug, Default)]
pub struct FormatArgs {
    /// Output format (auto-detects TTY for pretty vs plain)
    #[arg(short = 'f', long, value_enum, default_value = "pretty", global = true)]
    pub format: OutputFormat,

    /// Output as JSON (shorthand for --format=json)
    #[arg(long, conflicts_with = "format", global = true)]
    pub json: bool,
}

impl FormatArgs {
    /// Resolve the effective output format.
    ///
    /// Handles --json shorthand and applies TTY auto-detection for pretty mode.
    pub fn resolve(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format.resolve()
        }
    }
}

// ============================================================================
// MonthArgs / SelectionArgs - what to show
// ============================================================================

/// Month selection flag.
#[derive(Args, Clone, Debug, Default)]
pub struct MonthArgs {
    /// Month label (default: current calendar month if present, else first month)
    #[arg(short = 'm', long)]
    pub month: Option<String>,
}

/// Month, group filter and search term.
#[derive(Args, Clone, Debug, Default)]
pub struct SelectionArgs {
    #[command(flatten)]
    pub month: MonthArgs,

    /// Group label, or "all"
    #[arg(short = 'g', long, default_value = "all")]
    pub group: String,

    /// Search site, note (case-insensitive) and date
    #[arg(short = 's', long, default_value = "")]
    pub search: String,
}

impl SelectionArgs {
    /// Build a selection for an already-resolved month.
    pub fn to_selection(&self, month: String) -> Selection {
        Selection {
            group: GroupFilter::parse(&self.group),
            search: self.search.clone(),
            ..Selection::new(month)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
