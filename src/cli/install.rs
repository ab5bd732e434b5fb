use crate::cli::context::AppContext;
use crate::cli::report::print_outcomes;
use crate::cli::setup::print_hints;
use crate::domain::{SelectionSet, ServiceId};
use crate::services::{Outcome, ServiceOutcome};
use anyhow::Result;

/// Installs (or brings back up) the selected services.
pub fn install(ctx: &AppContext, identifiers: &[String]) -> Result<bool> {
    let outcomes = reconcile(ctx, identifiers)?;
    let ok = print_outcomes(&outcomes);

    let started = outcomes
        .iter()
        .filter(|o| matches!(o.outcome, Outcome::Started))
        .filter_map(|o| o.service.parse::<ServiceId>().ok());

    for id in started {
        println!();
        print_hints(ctx, id)?;
    }

    Ok(ok)
}

pub fn reconcile(ctx: &AppContext, identifiers: &[String]) -> Result<Vec<ServiceOutcome>> {
    let selection: SelectionSet = identifiers.iter().map(String::as_str).collect();
    Ok(ctx.reconciler.apply(&selection)?)
}
