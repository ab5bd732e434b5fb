use crate::services::{Outcome, ServiceOutcome, any_failed};

/// Prints one line per outcome. Returns true when nothing failed.
pub fn print_outcomes(outcomes: &[ServiceOutcome]) -> bool {
    for outcome in outcomes {
        let marker = match outcome.outcome {
            Outcome::Failed(_) => "✗",
            Outcome::AlreadyRunning | Outcome::AlreadyStopped => "•",
            _ => "✓",
        };
        println!("{marker} {outcome}");
    }

    let failed = outcomes.iter().filter(|o| o.is_failure()).count();
    if failed > 0 {
        println!("{failed} of {} failed", outcomes.len());
    }

    !any_failed(outcomes)
}
