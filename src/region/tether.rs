//! A tether is a borrow capability on a region: `(target, holder,
//! generation_snapshot)`. Every dereference through a live tether checks
//! the snapshot against the target's current generation; a mismatch is a
//! fatal stale-tether error (spec §4.H, step 2).

use std::collections::VecDeque;

use super::RegionId;
use crate::error::CoreError;

pub struct Tether {
    target: RegionId,
    #[allow(dead_code)]
    holder: RegionId,
    generation_snapshot: u32,
}

impl Tether {
    pub(super) fn new(target: RegionId, holder: RegionId, generation_snapshot: u32) -> Self {
        Tether {
            target,
            holder,
            generation_snapshot,
        }
    }

    pub fn target(&self) -> RegionId {
        self.target
    }

    /// Validates `self` against `current_generation` (an acquire load of
    /// the target region's generation counter, per the ordering note in
    /// spec §5). Returns the fatal error on mismatch rather than
    /// panicking directly, leaving the decision of whether to unwind
    /// immediately to the caller (mirroring `Result`-returning
    /// AllocFailure's non-instant-panic treatment for recoverable paths,
    /// even though this kind is itself fatal once raised).
    pub fn validate(&self, current_generation: u32) -> Result<(), CoreError> {
        if self.generation_snapshot == current_generation {
            Ok(())
        } else {
            Err(CoreError::StaleTether {
                region: self.target,
                expected_gen: self.generation_snapshot,
                found_gen: current_generation,
            })
        }
    }
}

/// Per-thread LRU cache of `(target region -> tether)` for repeat
/// borrows, as described in spec §4.H. Opt-in via
/// `CoreOptions::tether_cache` per the open question in spec §9: ablation
/// showed no benchmark speedup, so it defaults off.
pub struct TetherCache {
    capacity: usize,
    // Most-recently-used at the back.
    entries: VecDeque<(RegionId, std::sync::Arc<Tether>)>,
}

impl TetherCache {
    pub fn new(capacity: usize) -> Self {
        TetherCache {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn get(&mut self, target: RegionId) -> Option<std::sync::Arc<Tether>> {
        if let Some(pos) = self.entries.iter().position(|(id, _)| *id == target) {
            let entry = self.entries.remove(pos).unwrap();
            let tether = entry.1.clone();
            self.entries.push_back(entry);
            Some(tether)
        } else {
            None
        }
    }

    pub fn insert(&mut self, target: RegionId, tether: std::sync::Arc<Tether>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back((target, tether));
    }

    /// Evicts every cached tether for `target`, called on explicit
    /// release of the tether and on the owning region's close.
    pub fn evict(&mut self, target: RegionId) {
        self.entries.retain(|(id, _)| *id != target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_generation_is_rejected() {
        let t = Tether::new(RegionId::for_test(1), RegionId::for_test(2), 3);
        assert!(t.validate(3).is_ok());
        assert!(t.validate(4).is_err());
    }

    #[test]
    fn cache_evicts_least_recently_used_first() {
        let mut cache = TetherCache::new(2);
        let a = RegionId::for_test(1);
        let b = RegionId::for_test(2);
        let c = RegionId::for_test(3);
        cache.insert(a, std::sync::Arc::new(Tether::new(a, a, 0)));
        cache.insert(b, std::sync::Arc::new(Tether::new(b, b, 0)));
        cache.insert(c, std::sync::Arc::new(Tether::new(c, c, 0)));
        assert!(cache.get(a).is_none());
        assert!(cache.get(b).is_some());
        assert!(cache.get(c).is_some());
    }
}
