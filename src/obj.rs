//! The object header every arena-allocated value carries.
//!
//! Field layout mirrors the header metadata the teacher packs into object
//! headers (`src/util/metadata/header_metadata.rs`): small fixed-width
//! fields read and written directly rather than computed, with the
//! concurrently-mutated ones (`mark`, `scan_tag`) behind atomics so the SCC
//! collector and a mutator thread can touch the same object without a lock.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use static_assertions::const_assert;

use crate::region::RegionId;

// The mark/scan_tag fields are read on every frontier pop; keeping them
// narrow enough to fit a cache line alongside `tag`/`generation` matters
// more than it would for a cold field. `scc_id` is the one 4-byte field
// a header can't do without (see its doc comment below).
const_assert!(std::mem::size_of::<AtomicU8>() == 1);
const_assert!(std::mem::size_of::<AtomicU32>() == 4);

/// The dynamic type tag carried by every object. Order is insignificant;
/// kept alphabetical-ish to match the enumeration in the data model.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[repr(u8)]
pub enum Tag {
    Atom,
    Pair,
    Str,
    Char,
    Float,
    Vector,
    Dict,
    Symbol,
    Closure,
    Port,
    ForeignLib,
    ForeignPtr,
    Thread,
    Channel,
    Process,
    Continuation,
    Box,
    Bounce,
    Syntax,
    Effect,
    Error,
}

/// Value 0 means "unassigned": minted scc_ids start at 1, matching the
/// spec's "0 if unassigned" note for `scc_id`.
pub const SCC_ID_UNASSIGNED: u32 = 0;

/// Header for a heap object. `region` is `None` for objects allocated
/// directly on the (non-arena) heap, e.g. before any region is open.
pub struct Obj {
    pub tag: Tag,
    /// Invalidates stale references once the owning region's generation
    /// moves past this snapshot.
    pub generation: u16,
    /// Set by the SCC collector's mark phase; cleared in the subsequent
    /// sweep pass.
    mark: AtomicU8,
    /// Equivalence class of potentially-cyclic peers. `SCC_ID_UNASSIGNED`
    /// until the collector or [`crate::options::SccMergePolicy`] assigns
    /// one.
    scc_id: AtomicU32,
    /// Generation of the last frontier scan that touched this object,
    /// used to skip objects already visited in the current `collect_from`.
    scan_tag: AtomicU32,
    pub region: Option<RegionId>,
}

impl Obj {
    pub fn new(tag: Tag, generation: u16, region: Option<RegionId>) -> Self {
        Obj {
            tag,
            generation,
            mark: AtomicU8::new(0),
            scc_id: AtomicU32::new(SCC_ID_UNASSIGNED),
            scan_tag: AtomicU32::new(0),
            region,
        }
    }

    pub fn is_marked(&self) -> bool {
        self.mark.load(Ordering::Relaxed) != 0
    }

    pub fn set_mark(&self, marked: bool) {
        self.mark.store(marked as u8, Ordering::Relaxed);
    }

    /// Sets `mark` and returns whether it was already set, matching the
    /// teacher's `test_and_mark` pattern on `MarkBitMap`.
    pub fn test_and_mark(&self) -> bool {
        self.mark.swap(1, Ordering::Relaxed) != 0
    }

    pub fn scc_id(&self) -> u32 {
        self.scc_id.load(Ordering::Relaxed)
    }

    pub fn set_scc_id(&self, id: u32) {
        self.scc_id.store(id, Ordering::Relaxed);
    }

    pub fn scan_tag(&self) -> u32 {
        self.scan_tag.load(Ordering::Relaxed)
    }

    /// Marks this object as scanned at `tag`. Returns `true` if it was
    /// already scanned at this tag (the frontier should skip it).
    pub fn mark_scanned(&self, tag: u32) -> bool {
        self.scan_tag.swap(tag, Ordering::Relaxed) == tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and_mark_reports_prior_state() {
        let o = Obj::new(Tag::Pair, 0, None);
        assert!(!o.test_and_mark());
        assert!(o.test_and_mark());
        assert!(o.is_marked());
    }

    #[test]
    fn mark_scanned_detects_repeat_visits() {
        let o = Obj::new(Tag::Atom, 0, None);
        assert!(!o.mark_scanned(1));
        assert!(o.mark_scanned(1));
        assert!(!o.mark_scanned(2));
    }
}
