//! Properties every session must satisfy after each transition.
//!
//! The engine checks [`SessionInvariants`] in debug builds. Each invariant is
//! a zero-sized type so sets of them can be composed as tuples.

pub mod history_consistent;
pub mod mark_balance;
pub mod single_winner;

pub use history_consistent::HistoryConsistentInvariant;
pub use mark_balance::MarkBalanceInvariant;
pub use single_winner::SingleWinnerInvariant;

/// A property of a state `S`.
pub trait Invariant<S> {
    /// Returns true if `state` satisfies the property.
    fn holds(state: &S) -> bool;

    /// What the property says, for reports.
    fn description() -> &'static str;
}

/// A failed invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the failed invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a violation report.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// Several invariants checked in one call.
pub trait InvariantSet<S> {
    /// Checks every member and reports all failures, not just the first.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, A, B, C> InvariantSet<S> for (A, B, C)
where
    A: Invariant<S>,
    B: Invariant<S>,
    C: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        report([
            (A::holds(state), A::description()),
            (B::holds(state), B::description()),
            (C::holds(state), C::description()),
        ])
    }
}

fn report<const N: usize>(
    results: [(bool, &'static str); N],
) -> Result<(), Vec<InvariantViolation>> {
    let failed: Vec<_> = results
        .into_iter()
        .filter_map(|(ok, description)| (!ok).then(|| InvariantViolation::new(description)))
        .collect();

    if failed.is_empty() { Ok(()) } else { Err(failed) }
}

/// Everything checked after an engine transition.
pub type SessionInvariants = (
    MarkBalanceInvariant,
    HistoryConsistentInvariant,
    SingleWinnerInvariant,
);
