//! Front-end-to-core interface: the safe Rust API surface.
//!
//! This module provides the safe entry points the front end drives the
//! core through. We expect a front end to call [`init`] once at startup,
//! register its types, then drive allocation/tethering/collection through
//! the functions below — the same safe-API-surface shape as the teacher's
//! `memory_manager.rs` of the same name and purpose, adapted from a single
//! process-wide `MMTK<VM>` instance to the explicit `Core` handle this
//! crate threads through instead (no process-wide singleton; see
//! `src/options.rs`'s doc comment on why).

use std::collections::HashMap;

use crate::analysis::{annotate, Annotated};
use crate::collect::{DeferredRc, SccCollector, Traceable};
use crate::error::CoreError;
use crate::ir::Expr;
use crate::options::CoreOptions;
use crate::region::{RegionId, RegionManager, Tether};

/// The handle a front end holds for the lifetime of the process (or one
/// per isolate, if it embeds more than one). Owns the region table and
/// the tunables; the type registry is process-wide (see
/// `crate::types::TYPE_REGISTRY`) since type definitions are loaded once
/// and never vary per `Core`.
pub struct Core {
    pub options: CoreOptions,
    pub regions: RegionManager,
}

/// Creates a `Core` with the given tunables and attempts to initialize
/// the built-in logger, matching the teacher's `gc_init`: a VM that wants
/// its own logger should initialize it before calling this.
pub fn init(options: CoreOptions) -> Core {
    crate::logger::try_init();
    Core {
        options,
        regions: RegionManager::new(),
    }
}

/// Opens a new region, scoped to `parent` (`None` for a root region).
/// The caller is responsible for calling [`region_close`] on every exit
/// path — see `crate::region::RegionManager::close`'s doc comment.
pub fn region_open(core: &Core, parent: Option<RegionId>) -> RegionId {
    core.regions.open(parent, &core.options)
}

/// Seals `region` for further allocation and queues it for reclamation
/// once unleased. Call on every exit path of the scope that opened it
/// (normal return, failure, cancellation).
pub fn region_close(core: &Core, region: RegionId) {
    core.regions.close(region);
}

/// Allocates `size` bytes in `region`.
pub fn alloc_in(core: &Core, region: RegionId, size: usize) -> Result<crate::address::Address, CoreError> {
    let region = core
        .regions
        .get(region)
        .ok_or(CoreError::AllocFailure { requested: size })?;
    region.alloc(size)
}

/// `tether(T) -> tau`: snapshots `T`'s generation and increments its
/// lease count so it cannot be physically reclaimed while the tether is
/// alive.
pub fn tether(core: &Core, target: RegionId, holder: RegionId) -> Option<Tether> {
    core.regions.tether(target, holder)
}

/// `untether(tau)`: decrements the target region's lease count; if it
/// reaches zero and the region is frozen, queues it for reclamation.
pub fn untether(core: &Core, tether: Tether) {
    core.regions.untether(tether);
}

/// Validates `tether` against its target region's current generation
/// before returning `obj` back to the caller, matching spec.md's
/// `through(tau, obj) -> obj'`. Every dereference through a tether must
/// go through this call.
pub fn through<T>(core: &Core, tether: &Tether, obj: T) -> Result<T, CoreError> {
    let region = core.regions.get(tether.target()).ok_or(CoreError::StaleTether {
        region: tether.target(),
        expected_gen: 0,
        found_gen: 0,
    })?;
    tether.validate(region.generation())?;
    Ok(obj)
}

/// Registers a type's fields with the process-wide type registry.
pub fn register_type(name: &'static str, fields: Vec<(&'static str, &'static str, bool)>) {
    crate::types::TYPE_REGISTRY.register_type(name, fields);
}

/// Runs the static analysis pipeline (components B through E) over
/// `expr`, returning the CLEAN-phase plan the ASAP injector computed.
pub fn annotate_ir(expr: &Expr, binding_types: &HashMap<String, &str>) -> Annotated {
    annotate(expr, &crate::types::TYPE_REGISTRY, binding_types)
}

/// Deep-copies the graph reachable from `root` into `dest`, preserving
/// shared subgraphs and cycles, via `children_of`/`copy_into`/`link`.
/// See `crate::region::transmigrate` for the traversal itself.
pub fn transmigrate<T, FChildren, FCopy, FLink>(
    root: T,
    children_of: FChildren,
    copy_into: FCopy,
    link: FLink,
) -> Result<T, CoreError>
where
    T: Copy + Eq + std::hash::Hash,
    FChildren: FnMut(T) -> Vec<(T, crate::types::Strength)>,
    FCopy: FnMut(T) -> T,
    FLink: FnMut(T, usize, T),
{
    crate::region::transmigrate(root, children_of, copy_into, link)
}

/// The single call site the ASAP injector emits into generated code:
/// drains reclaimable work up to each reclaimer's configured budget (F:
/// SCC collection, G: deferred reference counting), then reclaims any
/// regions that became unleased since the last call.
///
/// `deferred` and `scc` are the calling thread's own collector state.
/// Per DESIGN.md's per-thread-state deviation, this crate has no fixed
/// worker pool to hang shared collector instances off (unlike the
/// teacher's `Worker<C>`), so a front end keeps its own `thread_local!`
/// [`DeferredRc<T>`]/[`SccCollector<T>`] per object-handle type `T` and
/// passes them into this call every safe point — the same "state lives
/// with the caller, `T` is supplied per call" shape already used by
/// [`through`] and [`transmigrate`] above. `scc_work`, when `Some`,
/// supplies the `(root, members)` pair to resume (or start) an SCC
/// collection from; `None` skips F entirely (e.g. nothing in this
/// thread's scope roots a collectible shape this call). `dec_ref` is
/// invoked once per object whose deferred count reaches zero; `free_scc`
/// once per object the SCC pass frees.
pub fn safe_point<T: Traceable + Eq + Clone>(
    core: &Core,
    deferred: &mut DeferredRc<T>,
    mut dec_ref: impl FnMut(&T),
    scc: &mut SccCollector<T>,
    scc_work: Option<(T, &[T])>,
    mut free_scc: impl FnMut(&T),
) {
    if deferred.should_process_deferred() {
        let _ = deferred.process_deferred(*core.options.budget, &mut dec_ref);
    }
    if let Some((root, members)) = scc_work {
        if let Ok(freed) = scc.collect_from(root, members, *core.options.budget) {
            for obj in &freed {
                free_scc(obj);
            }
        }
    }
    core.regions.reclaim_pending();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_in_an_unopened_region_fails() {
        let core = init(CoreOptions::default());
        let bogus = core.regions.open(None, &core.options);
        core.regions.close(bogus);
        core.regions.reclaim_pending();
        assert!(alloc_in(&core, bogus, 16).is_err());
    }

    #[test]
    fn alloc_in_an_open_region_succeeds() {
        let core = init(CoreOptions::default());
        let r = region_open(&core, None);
        assert!(alloc_in(&core, r, 16).is_ok());
        region_close(&core, r);
    }

    #[test]
    fn tether_through_untether_round_trips() {
        let core = init(CoreOptions::default());
        let holder = region_open(&core, None);
        let target = region_open(&core, None);
        let t = tether(&core, target, holder).unwrap();
        let obj = through(&core, &t, 42u32).unwrap();
        assert_eq!(obj, 42);
        untether(&core, t);
    }

    #[derive(Clone, Copy)]
    struct Leaf(*const crate::obj::Obj);

    impl PartialEq for Leaf {
        fn eq(&self, other: &Self) -> bool {
            std::ptr::eq(self.0, other.0)
        }
    }
    impl Eq for Leaf {}
    impl std::hash::Hash for Leaf {
        fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
            (self.0 as usize).hash(state);
        }
    }
    impl crate::collect::Traceable for Leaf {
        fn header(&self) -> &crate::obj::Obj {
            unsafe { &*self.0 }
        }
        fn strong_children(&self) -> Vec<Leaf> {
            Vec::new()
        }
    }

    #[test]
    fn safe_point_drives_deferred_rc_and_scc_in_addition_to_region_reclaim() {
        let core = init(CoreOptions::default());
        let region = region_open(&core, None);
        region_close(&core, region);

        let leaked = Box::leak(Box::new(crate::obj::Obj::new(crate::obj::Tag::Atom, 0, None)));
        let leaf = Leaf(leaked);
        let members = vec![leaf];

        let mut deferred: DeferredRc<Leaf> = DeferredRc::new(*core.options.batch_size);
        // Force process_deferred to actually run by exceeding the
        // should_process_deferred threshold (twice the batch size).
        for _ in 0..(2 * *core.options.batch_size + 1) {
            deferred.defer_decrement(leaf);
        }
        let mut collector: SccCollector<Leaf> = SccCollector::new();
        let mut dec_ref_calls = 0usize;
        let mut scc_frees = 0usize;

        safe_point(
            &core,
            &mut deferred,
            |_| dec_ref_calls += 1,
            &mut collector,
            Some((leaf, &members)),
            |_| scc_frees += 1,
        );

        assert!(dec_ref_calls > 0, "safe_point must drive deferred RC");
        assert_eq!(scc_frees, 0, "the sole member is reachable from itself as root");
        // The closed, unleased region must also have been reclaimed.
        assert!(core.regions.get(region).is_none());
    }
}
