use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use tracing::info;

use crate::args::SelectionArgs;
use crate::cmd::Context;
use crate::error::ScheduleError;
use crate::html;
use crate::render;

#[derive(Args)]
pub struct HtmlArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Write the page here instead of stdout
    #[arg(short, long, conflicts_with = "site")]
    output: Option<PathBuf>,

    /// Write a linked page per month into this directory
    #[arg(long)]
    site: Option<PathBuf>,
}

pub fn run(args: HtmlArgs, ctx: &Context) -> Result<(), String> {
    let title = &ctx.config.display.title;

    let schedule = match ctx.load_schedule() {
        Ok(s) => s,
        Err(e @ ScheduleError::MissingData { .. }) => {
            // Still produce a page so a published site shows the failure.
            emit(args.output.as_deref(), &html::missing_data_html(title))?;
            return Err(e.to_string());
        }
        Err(e) => return Err(e.to_string()),
    };

    let month = ctx.month(args.selection.month.month.as_deref(), &schedule);
    let selection = args.selection.to_selection(month);

    if let Some(dir) = &args.site {
        let written = html::write_site(
            title,
            &schedule,
            &selection,
            ctx.today,
            &ctx.config.keywords,
            dir,
        )
        .map_err(|e| e.to_string())?;
        if !ctx.quiet() {
            println!("Wrote {} pages to {}", written.len(), dir.display());
        }
        return Ok(());
    }

    let page = render::render_page(title, &schedule, &selection, ctx.today, &ctx.config.keywords);
    emit(args.output.as_deref(), &html::page_to_html(&page, |_, _| None))?;
    if let Some(path) = &args.output
        && !ctx.quiet()
    {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn emit(output: Option<&Path>, document: &str) -> Result<(), String> {
    match output {
        Some(path) => {
            fs::write(path, document).map_err(|e| ScheduleError::io(path, e).to_string())?;
            info!(path = %path.display(), "wrote html page");
            Ok(())
        }
        None => {
            print!("{}", document);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use chrono::NaiveDate;

    #[test]
    fn null_data_writes_missing_data_page() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("schedule.json");
        fs::write(&data, "null").unwrap();
        let out = dir.path().join("index.html");

        let ctx = Context {
            config: Config::default(),
            data_path: data,
            today: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        let args = HtmlArgs {
            selection: SelectionArgs {
                group: "all".to_string(),
                ..Default::default()
            },
            output: Some(out.clone()),
            site: None,
        };

        let err = run(args, &ctx).unwrap_err();
        assert!(err.starts_with(crate::error::MISSING_DATA_MESSAGE));
        let page = fs::read_to_string(&out).unwrap();
        assert!(page.contains(crate::error::MISSING_DATA_MESSAGE));
    }
}
