use std::io::{self, Write};

use anyhow::Context;
use clap::{CommandFactory, FromArgMatches, ValueHint};

use crate::config::get_config_path;
use crate::models::query_result::QueryResult;

mod action;
mod app;
mod cli;
mod components;
mod config;
mod error;
mod logging;
mod models;
mod panic;
mod tui;
mod utils;
mod widgets;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    panic::init()?;

    // Enhance the help message for the config argument
    let def = get_config_path()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|_| "-".into());
    let help = format!("Path to config file (default: {def})");
    let cmd = cli::Args::command()
        .mut_arg("config", |a| a.help(help).value_hint(ValueHint::FilePath).next_line_help(true));
    let args = cli::Args::from_arg_matches(&cmd.get_matches())?;

    let config = config::Config::new(args.config.clone())?;
    logging::init(&config)?;

    let result = QueryResult::from_path(&args.results)?;
    tracing::info!(
        path = %args.results.display(),
        columns = result.columns.len(),
        rows = result.rows.len(),
        "Results loaded"
    );

    let app = app::App::new(config, args, result)?;
    let scheduled = app.run().await?;

    let mut stdout = io::stdout().lock();
    for query in &scheduled {
        let line = serde_json::to_string(query).context("Fail to serialize scheduled query")?;
        writeln!(stdout, "{line}")?;
    }
    Ok(())
}
