use crate::cli::context::AppContext;
use crate::cli::report::print_outcomes;
use crate::domain::{SelectionSet, ServiceState};
use crate::services::Action;
use anyhow::{Context, Result};

pub fn status(ctx: &AppContext) -> Result<bool> {
    let containers = ctx.lifecycle.list()?;

    if containers.is_empty() {
        println!("No containers. Run 'pistack install <service>' to add one.");
        return Ok(true);
    }

    println!("{:<28} {:<8} IMAGE", "NAME", "STATE");
    for container in &containers {
        println!(
            "{:<28} {:<8} {}",
            container.name,
            container.state,
            container.image.as_deref().unwrap_or("-")
        );
    }

    let stopped = containers
        .iter()
        .filter(|c| c.state != ServiceState::Running)
        .count();
    if stopped > 0 {
        println!("{stopped} container(s) not running. Use 'pistack start <name>'.");
    }

    Ok(true)
}

pub fn act(ctx: &AppContext, action: Action, identifiers: &[String]) -> Result<bool> {
    let selection = selection(identifiers);
    let outcomes = ctx.lifecycle.act(action, &selection)?;
    Ok(print_outcomes(&outcomes))
}

/// Removal asks for confirmation unless `assume_yes` is set.
pub fn remove(ctx: &AppContext, identifiers: &[String], assume_yes: bool) -> Result<bool> {
    let selection = selection(identifiers);

    if !assume_yes && !confirm_removal(&selection)? {
        println!("Nothing removed.");
        return Ok(true);
    }

    let outcomes = ctx.lifecycle.act(Action::Remove, &selection)?;
    Ok(print_outcomes(&outcomes))
}

pub fn logs(ctx: &AppContext, identifiers: &[String], lines: usize) -> Result<bool> {
    let text = ctx.lifecycle.logs(&selection(identifiers), lines)?;
    print!("{text}");
    Ok(true)
}

fn confirm_removal(selection: &SelectionSet) -> Result<bool> {
    let names: Vec<&str> = selection.iter().collect();
    let question = format!(
        "Remove {}? Data outside named volumes is lost.",
        names.join(", ")
    );

    inquire::Confirm::new(&question)
        .with_default(false)
        .prompt()
        .context("reading confirmation")
}

fn selection(identifiers: &[String]) -> SelectionSet {
    identifiers.iter().map(String::as_str).collect()
}
