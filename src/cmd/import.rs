use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::cmd::Context;
use crate::schedule::Schedule;

#[derive(Args)]
pub struct ImportArgs {
    /// JSON document to replace the schedule with
    file: PathBuf,
}

/// Replace the data file with a validated import.
///
/// The existing data file need not exist. Nothing is written unless the
/// whole document parses.
pub fn run(args: ImportArgs, ctx: &Context) -> Result<(), String> {
    let mut schedule = Schedule::default();
    schedule.import_file(&args.file).map_err(|e| e.to_string())?;
    schedule.persist(&ctx.data_path).map_err(|e| e.to_string())?;
    info!(
        from = %args.file.display(),
        to = %ctx.data_path.display(),
        "schedule replaced"
    );

    if !ctx.quiet() {
        println!(
            "Imported {} months, {} tasks into {}",
            schedule.months().len(),
            schedule.total_tasks(),
            ctx.data_path.display()
        );
    }
    Ok(())
}
