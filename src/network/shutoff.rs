//! Retirement of gas infrastructure once its customers have left.
//!
//! A building leaves the gas network in its retrofit year. A pipe can only be shut off once every
//! building below it has left, so the year it becomes redundant is the latest exit year of its
//! children. The exit year is propagated upwards one level at a time.
use crate::scenario::Scenario;

/// The year by which every child has left the gas network.
///
/// Returns `None` if there are no children or if any child never leaves.
pub fn combine_exit_years<I>(children: I) -> Option<u32>
where
    I: IntoIterator<Item = Option<u32>>,
{
    let mut children = children.into_iter().peekable();
    children.peek()?;
    children.try_fold(0, |latest, exit| exit.map(|year| latest.max(year)))
}

/// The earlier of two optional years, where `None` means "never"
pub fn earliest(a: Option<u32>, b: Option<u32>) -> Option<u32> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// The year a gas pipe is retired.
///
/// In scenarios where redundant gas infrastructure is shut off, this is the earlier of the pipe's
/// scheduled replacement and the year its last customer leaves.
pub fn pipe_replacement_year(
    scenario: Scenario,
    scheduled: Option<u32>,
    exit_year: Option<u32>,
) -> Option<u32> {
    if scenario.is_shutoff_scenario() {
        earliest(scheduled, exit_year)
    } else {
        scheduled
    }
}

/// The year a gas pipe is shut off, if it is shut off at all
pub fn shutoff_year(scenario: Scenario, exit_year: Option<u32>) -> Option<u32> {
    if scenario.is_shutoff_scenario() {
        exit_year
    } else {
        None
    }
}
