//! Error taxonomy for the memory core.
//!
//! Most of these are fatal: they indicate the static analysis (or a front end
//! violating its contract) let an unsound program through, and the only sane
//! response is to unwind the current fiber's scope stack, running CLEAN
//! phases as we go, rather than to keep running on corrupted invariants.
//! `AllocFailure` is the one kind a caller can reasonably recover from, so it
//! is the one kind returned as a `Result`.

use std::fmt;

use crate::region::RegionId;

/// A fatal or recoverable condition raised by the core.
#[derive(Debug)]
pub enum CoreError {
    /// VA reservation, commit, or chunk allocation failed.
    AllocFailure { requested: usize },
    /// A tether was dereferenced after its target region's generation moved on.
    StaleTether {
        region: RegionId,
        expected_gen: u32,
        found_gen: u32,
    },
    /// A pointer write from `from` into `into` did not satisfy the parent relation.
    CrossRegionWrite { from: RegionId, into: RegionId },
    /// A strong write landed in a field the ownership graph classified as weak.
    BackEdgeViolation {
        type_name: &'static str,
        field: &'static str,
    },
    /// Debug-build-only: a free observed live-looking bits on the freed object.
    AnalysisUnsound { detail: String },
    /// A collector phase ran past its work budget without finishing.
    /// Resumable, not an error to the user — see [`crate::error::fatal`]'s
    /// doc comment for why this kind is the one exception that should
    /// never be passed to it.
    BudgetExhausted,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::AllocFailure { requested } => {
                write!(f, "allocation of {requested} bytes failed")
            }
            CoreError::StaleTether {
                region,
                expected_gen,
                found_gen,
            } => write!(
                f,
                "stale tether on region {region:?}: expected generation {expected_gen}, found {found_gen}"
            ),
            CoreError::CrossRegionWrite { from, into } => write!(
                f,
                "cross-region write from {from:?} into {into:?} without a parent relation or transmigration"
            ),
            CoreError::BackEdgeViolation { type_name, field } => write!(
                f,
                "strong write into weak (back-edge) field {type_name}.{field}"
            ),
            CoreError::AnalysisUnsound { detail } => {
                write!(f, "analysis-unsound: {detail}")
            }
            CoreError::BudgetExhausted => write!(f, "work budget exhausted, resume at next safe point"),
        }
    }
}

impl std::error::Error for CoreError {}

/// Raises a fatal [`CoreError`] by panicking with its message. Fatal kinds
/// are never returned through the normal value channel (spec.md lists them
/// as unwinding through CLEAN phases instead) — this is the single place
/// that turns one into the panic that drives that unwind.
#[cold]
pub fn fatal(err: CoreError) -> ! {
    panic!("{err}");
}
