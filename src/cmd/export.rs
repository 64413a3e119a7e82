use std::path::PathBuf;

use clap::Args;

use crate::cmd::Context;

#[derive(Args)]
pub struct ExportArgs {
    /// Target file, or a directory to write 煤矿监测数据.json into
    #[arg(short, long, default_value = ".")]
    output: PathBuf,
}

pub fn run(args: ExportArgs, ctx: &Context) -> Result<(), String> {
    let schedule = ctx.load_schedule().map_err(|e| e.to_string())?;
    let path = schedule.export_file(&args.output).map_err(|e| e.to_string())?;
    if !ctx.quiet() {
        println!("Exported {} tasks to {}", schedule.total_tasks(), path.display());
    }
    Ok(())
}
