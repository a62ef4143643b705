use std::fs;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::Parser;
use ropey::Rope;

use tabnav::cli::{Action, CliArgs};
use tabnav::config::TabNavConfig;
use tabnav::model::Region;
use tabnav::update::{is_table_context, update, Outcome};
use tabnav::util::copy_delimited;

fn main() -> Result<ExitCode> {
    tabnav::tracing::init();

    let invocation = CliArgs::parse()
        .into_invocation()
        .map_err(anyhow::Error::msg)?;

    let text = fs::read_to_string(&invocation.file)
        .with_context(|| format!("Failed to read {}", invocation.file.display()))?;
    let buffer = Rope::from_str(&text);

    let mut config = TabNavConfig::load();
    if let Some(path) = &invocation.config {
        config.merge(TabNavConfig::load_file(path)?);
    }
    let context = config.resolve(
        &invocation.context,
        invocation.capture_level,
        invocation.delimiter.as_deref(),
    )?;

    match invocation.action {
        Action::Table(msg) => {
            let outcome = update(&buffer, &invocation.selection, &context, &msg);
            let aborted = matches!(outcome, Outcome::Aborted(_));
            if let Outcome::Aborted(e) = &outcome {
                eprintln!("{}", e);
            }
            let selection = outcome.into_selection_or(&invocation.selection);
            let regions: Vec<Region> = selection.to_vec();
            println!("{}", serde_json::to_string(&regions)?);
            Ok(if aborted {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Action::Check { match_all } => {
            let in_table =
                is_table_context(&buffer, &invocation.selection, &context, match_all);
            println!("{}", in_table);
            Ok(if in_table {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Action::Copy { separator, trim } => {
            println!(
                "{}",
                copy_delimited(&buffer, &invocation.selection, &separator, trim)
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}
