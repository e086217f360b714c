// UI layer: interactive menu built on `dialoguer`, spinner feedback from
// `indicatif`. Each flow collects its inputs, opens one API session for the
// duration of the work and prints the outcome.

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::style::Stylize;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use crate::api::ApiClient;
use crate::config::Config;
use crate::credentials::Credentials;
use crate::interrupt::InterruptRouter;
use crate::listing::{list_aliases, render_table, ListFilter, ListOutcome};
use crate::orchestrator::BatchOrchestrator;
use crate::store::AliasStore;

/// Main interactive menu. Runs until the operator picks "Exit" or presses
/// Ctrl-C at the menu. `interrupts` routes Ctrl-C to the generation run in
/// progress, if any.
pub async fn main_menu(
    config: Config,
    credentials: Credentials,
    interrupts: &InterruptRouter,
) -> Result<()> {
    let items = vec!["Generate aliases", "List aliases", "Exit"];
    loop {
        let Some(selection) = interrupted(Select::new().items(&items).default(0).interact())?
        else {
            break;
        };
        match selection {
            0 => {
                handle_generate(&config, &credentials, interrupts).await?;
            }
            1 => handle_list(&config, &credentials).await?,
            _ => break,
        }
    }
    Ok(())
}

/// Prompt for a count and label, then generate and persist the aliases.
/// Returns the addresses created by this run, empty when interrupted.
pub async fn handle_generate(
    config: &Config,
    credentials: &Credentials,
    interrupts: &InterruptRouter,
) -> Result<Vec<String>> {
    println!("{}", rule());
    let Some(count) = interrupted(
        Input::<usize>::new()
            .with_prompt("How many aliases do you want to generate?")
            .default(1)
            .interact_text(),
    )?
    else {
        return Ok(Vec::new());
    };
    let Some(label) = interrupted(
        Input::<String>::new()
            .with_prompt("Label for the new aliases")
            .default(config.label.clone())
            .interact_text(),
    )?
    else {
        return Ok(Vec::new());
    };

    println!("Generating {count} aliases...");
    println!("{}", rule());

    let client = ApiClient::new(config.with_label(label), credentials.clone());
    let session = client.open_session().context("failed to open API session")?;
    let store = AliasStore::new(config.output_file.clone());
    let orchestrator = BatchOrchestrator::new(&session, config.concurrency, store);

    let spinner = spinner("Generating aliases...")?;
    let run = interrupts.begin_run();
    let outcome = orchestrator.run(count, &spinner, run.token()).await;
    drop(run);
    spinner.finish_and_clear();
    let report = outcome?;

    if report.cancelled {
        println!("{}", "Generation cancelled, nothing was saved.".yellow());
        return Ok(Vec::new());
    }
    if !report.aliases.is_empty() {
        println!("{}", rule());
        println!("Aliases saved to \"{}\"", config.output_file.display());
        println!(
            "{} Created {} aliases",
            "Done!".green().bold(),
            report.aliases.len().to_string().green().bold()
        );
    }
    Ok(report.aliases)
}

/// Prompt for the filter, fetch the aliases and print them as a table.
pub async fn handle_list(config: &Config, credentials: &Credentials) -> Result<()> {
    let Some(active) = interrupted(
        Confirm::new()
            .with_prompt("Show active aliases?")
            .default(true)
            .interact(),
    )?
    else {
        return Ok(());
    };
    let Some(search) = interrupted(
        Input::<String>::new()
            .with_prompt("Label search (regex, empty for all)")
            .allow_empty(true)
            .interact_text(),
    )?
    else {
        return Ok(());
    };

    let filter = match ListFilter::new(active, Some(&search)) {
        Ok(filter) => filter,
        Err(e) => {
            println!("{} {e}", "[ERR]".red().bold());
            return Ok(());
        }
    };

    let client = ApiClient::new(config.clone(), credentials.clone());
    let session = client.open_session().context("failed to open API session")?;
    let spinner = spinner("Fetching aliases...")?;
    let outcome = list_aliases(&session, &filter).await;
    spinner.finish_and_clear();

    match outcome? {
        ListOutcome::Listed(rows) => println!("{}", render_table(&rows)),
        ListOutcome::Failed(reason) => {
            println!("{} failed to list aliases: {reason}", "[ERR]".red().bold())
        }
    }
    Ok(())
}

/// Map a Ctrl-C during a prompt to `None`.
fn interrupted<T>(result: io::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e).context("failed to read input"),
    }
}

fn spinner(message: &'static str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(120));
    Ok(spinner)
}

fn rule() -> String {
    "─".repeat(60).dim().to_string()
}
