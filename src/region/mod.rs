//! Region lifecycle and the tether cross-region borrow protocol.
//!
//! Grounded on the teacher's region-based space family
//! (`src/policy/regionspace/region.rs`, `src/policy/regionspace/regionspace.rs`)
//! for the "named, scoped arena with generation and lease count" shape, and
//! on `src/global_state.rs` for the atomic-state-machine style (explicit
//! transition methods over `AtomicUsize`/`AtomicBool` fields rather than a
//! lock around a plain struct).

mod tether;
mod transmigrate;

pub use tether::{Tether, TetherCache};
pub use transmigrate::transmigrate;

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::arena::Arena;
use crate::error::CoreError;
use crate::options::CoreOptions;

/// Identifies a region. Regions are never reused while any tether could
/// still reference them, so this is a simple monotonic counter rather
/// than an index into a recycled slab.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct RegionId(u32);

#[cfg(test)]
impl RegionId {
    pub(crate) fn for_test(n: u32) -> RegionId {
        RegionId(n)
    }
}

/// A named, scoped arena. Exclusively owns every object allocated in it
/// until an object is shared out via a [`Tether`] or copied out via
/// [`transmigrate`].
pub struct Region {
    id: RegionId,
    parent: Option<RegionId>,
    arena: Mutex<Arena>,
    generation: AtomicU32,
    lease_count: AtomicU32,
    frozen: std::sync::atomic::AtomicBool,
    /// Next scc_id this region will mint, seeded from a per-region range
    /// (spec: `scc_id_base`) so two regions never mint the same id
    /// without the [`crate::options::SccMergePolicy`] explicitly merging
    /// them.
    next_scc_id: AtomicU32,
}

impl Region {
    pub fn id(&self) -> RegionId {
        self.id
    }

    pub fn generation(&self) -> u32 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn lease_count(&self) -> u32 {
        self.lease_count.load(Ordering::Relaxed)
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Relaxed)
    }

    pub fn parent(&self) -> Option<RegionId> {
        self.parent
    }

    /// Seals the region for further allocation (scope exit). Physical
    /// release still waits on `lease_count == 0`.
    fn seal(&self) {
        self.frozen.store(true, Ordering::Release);
        self.generation.fetch_add(1, Ordering::Release);
    }

    pub fn alloc(&self, size: usize) -> Result<crate::address::Address, CoreError> {
        self.arena.lock().unwrap().alloc(size)
    }

    /// Mints a fresh scc_id from this region's private range. Called by
    /// the allocator when a shape analysis marks a value SCC-collectible
    /// (see `crate::obj::SCC_ID_UNASSIGNED`).
    pub fn mint_scc_id(&self) -> u32 {
        self.next_scc_id.fetch_add(1, Ordering::Relaxed)
    }
}

/// Owns every live [`Region`] and mints fresh [`RegionId`]s. One manager
/// per process (or per isolate, if the front end embeds more than one);
/// there is no implicit global instance, matching this crate's
/// no-singleton configuration style (see `src/options.rs`).
pub struct RegionManager {
    next_id: AtomicUsize,
    regions: Mutex<std::collections::HashMap<RegionId, std::sync::Arc<Region>>>,
    /// Regions sealed and unleased, awaiting reclamation at the next safe
    /// point (spec §4.H: "enqueue T for reclamation").
    pending_reclaim: Mutex<Vec<RegionId>>,
}

impl RegionManager {
    pub fn new() -> Self {
        RegionManager {
            next_id: AtomicUsize::new(1),
            regions: Mutex::new(std::collections::HashMap::new()),
            pending_reclaim: Mutex::new(Vec::new()),
        }
    }

    /// Opens a new region whose parent is `parent` (`None` for a root
    /// region, e.g. a thread's private root).
    pub fn open(&self, parent: Option<RegionId>, options: &CoreOptions) -> RegionId {
        let id = RegionId(self.next_id.fetch_add(1, Ordering::Relaxed) as u32);
        let region = Region {
            id,
            parent,
            arena: Mutex::new(Arena::new(options)),
            generation: AtomicU32::new(0),
            lease_count: AtomicU32::new(0),
            frozen: std::sync::atomic::AtomicBool::new(false),
            next_scc_id: AtomicU32::new(id.0.wrapping_mul(1 << 20).max(1)),
        };
        self.regions
            .lock()
            .unwrap()
            .insert(id, std::sync::Arc::new(region));
        id
    }

    pub fn get(&self, id: RegionId) -> Option<std::sync::Arc<Region>> {
        self.regions.lock().unwrap().get(&id).cloned()
    }

    /// Seals `id` for allocation (scope exit) and, if unleased, queues it
    /// for reclamation; a scope guard calls this on every exit path.
    pub fn close(&self, id: RegionId) {
        let region = match self.get(id) {
            Some(r) => r,
            None => return,
        };
        region.seal();
        if region.lease_count() == 0 {
            self.pending_reclaim.lock().unwrap().push(id);
        }
    }

    /// Physically drops every region queued for reclamation whose lease
    /// count is still zero. Called at a safe point.
    pub fn reclaim_pending(&self) {
        let mut pending = self.pending_reclaim.lock().unwrap();
        let mut regions = self.regions.lock().unwrap();
        pending.retain(|id| {
            let keep_pending = match regions.get(id) {
                Some(r) => r.lease_count() != 0,
                None => false,
            };
            if !keep_pending {
                regions.remove(id);
            }
            keep_pending
        });
    }

    /// Creates a tether leasing `target` from `holder`. Fails with
    /// [`CoreError::AllocFailure`]-free semantics are not applicable here;
    /// tethering a region whose lease count has saturated is rejected per
    /// spec (`UINT32_MAX` guard).
    pub fn tether(&self, target: RegionId, holder: RegionId) -> Option<Tether> {
        let region = self.get(target)?;
        let prior = region.lease_count.fetch_add(1, Ordering::AcqRel);
        if prior == u32::MAX {
            region.lease_count.fetch_sub(1, Ordering::AcqRel);
            return None;
        }
        let generation_snapshot = region.generation();
        Some(Tether::new(target, holder, generation_snapshot))
    }

    pub fn untether(&self, tether: Tether) {
        if let Some(region) = self.get(tether.target()) {
            let prior = region.lease_count.fetch_sub(1, Ordering::AcqRel);
            if prior == 1 && region.is_frozen() {
                self.pending_reclaim.lock().unwrap().push(tether.target());
            }
        }
    }
}

impl Default for RegionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closing_an_unleased_region_queues_it_for_reclamation() {
        let mgr = RegionManager::new();
        let opts = CoreOptions::default();
        let r = mgr.open(None, &opts);
        mgr.close(r);
        mgr.reclaim_pending();
        assert!(mgr.get(r).is_none());
    }

    #[test]
    fn a_leased_region_survives_close_until_untethered() {
        let mgr = RegionManager::new();
        let opts = CoreOptions::default();
        let holder = mgr.open(None, &opts);
        let target = mgr.open(None, &opts);
        let tether = mgr.tether(target, holder).unwrap();
        mgr.close(target);
        mgr.reclaim_pending();
        assert!(mgr.get(target).is_some());
        mgr.untether(tether);
        mgr.reclaim_pending();
        assert!(mgr.get(target).is_none());
    }
}
