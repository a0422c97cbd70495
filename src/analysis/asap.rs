//! ASAP injector: turns escape + shape classifications into explicit free
//! operations placed in the CLEAN phase of each binding's enclosing scope.
//!
//! Grounded on the teacher's IR-augmentation passes that thread an
//! allocation-semantics decision through a pipeline
//! (`src/plan/global.rs`'s `create_mutator` dispatch-by-selector pattern):
//! here the "selector" is a binding's `(captured_by_lambda, escape_class,
//! shape)` triple instead of a GC plan enum, but the shape — decide once,
//! emit a call — is the same.

use crate::analysis::escape::{BindingId, EscapeClass, UsageRecord};
use crate::analysis::shape::{free_strategy, FreeStrategy};
use crate::analysis::shape::Shape;

/// What the CLEAN phase does with one binding on scope exit.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum CleanDecision {
    /// The binding's value outlives this scope via a lambda closure; the
    /// lambda now owns it, so no free is emitted here.
    OwnershipTransferred,
    /// The binding escapes to the program result; freeing here would be
    /// unsound.
    EscapesNoFree,
    /// Emit a free call dispatched on the binding's free strategy.
    Free(FreeStrategy),
}

/// Decides the CLEAN-phase action for one binding, per spec.md §4.E.
/// `use_count == 0` bindings are still bound and freed — dead-store
/// elimination is the front end's concern, not this injector's.
pub fn decide(usage: &UsageRecord, shape: Shape) -> CleanDecision {
    if usage.captured_by_lambda {
        CleanDecision::OwnershipTransferred
    } else if usage.escape_class == EscapeClass::Global {
        CleanDecision::EscapesNoFree
    } else {
        CleanDecision::Free(free_strategy(shape))
    }
}

/// Plans the CLEAN phase for one `Let` scope's bindings, in reverse
/// declaration order as required by spec.md §4.E step 3. Scoped to a
/// single `Let`'s bindings (identified by [`BindingId`], not by name) so
/// that a shadowing binding in a nested scope never clobbers or merges
/// with an outer one sharing the same name (spec.md §4.C).
pub fn plan_clean_phase(
    declared_in_order: &[(BindingId, String)],
    usage: &std::collections::HashMap<BindingId, UsageRecord>,
    shapes: &std::collections::HashMap<BindingId, Shape>,
) -> Vec<(BindingId, String, CleanDecision)> {
    declared_in_order
        .iter()
        .rev()
        .map(|(id, name)| {
            let rec = usage.get(id);
            let decision = match rec {
                Some(rec) => decide(rec, shapes.get(id).copied().unwrap_or(Shape::Unknown)),
                None => CleanDecision::Free(FreeStrategy::DeferredRc),
            };
            (*id, name.clone(), decision)
        })
        .collect()
}
