//! Reserved-virtual-address-space bump allocator with commit-on-demand.
//!
//! Grounded on the teacher's POSIX memory layer (`src/util/os/posix_common.rs`,
//! `src/util/os/linux.rs`) for the `mmap`/`mprotect`/`madvise` calling
//! convention, and on `src/util/alloc/bumpallocator.rs` for the
//! cursor/limit bump-and-slow-path shape. The teacher keeps chunks on an
//! intrusive linked list reachable via raw-pointer chasing; we keep the
//! same "ordered chain, splice a sub-range in O(length to the splice
//! point)" semantics but express the chain as a `Vec<Chunk>`, which is
//! memory-safe without giving up the detach/attach operations the region
//! manager needs for merging (see DESIGN.md).

mod chunk;

pub use chunk::Chunk;

use crate::error::CoreError;
use crate::options::CoreOptions;

/// A snapshot of the bump cursor, as returned by [`Arena::snapshot`].
/// Rewinding to a `Mark` never unmaps anything; it only moves chunk
/// offsets back, mirroring the teacher's non-releasing `rewind`.
#[derive(Copy, Clone, Debug)]
pub struct Mark {
    chunk_index: usize,
    offset: usize,
}

/// A chain of [`Chunk`]s, the unit of VA reservation for one region (or the
/// process-wide heap arena).
pub struct Arena {
    chunks: Vec<Chunk>,
    /// Chunks detached from the tail by [`Arena::rewind`], kept (not
    /// unmapped) so a later `alloc` can reuse their VA reservation and
    /// already-committed pages instead of paying for a fresh `mmap`.
    spare: Vec<Chunk>,
    commit_ahead_pages: usize,
    default_reserve: usize,
    initial_commit: usize,
    hugepage_threshold: usize,
}

impl Arena {
    /// An empty arena. The first `alloc` call pays for the first chunk.
    pub fn new(options: &CoreOptions) -> Self {
        Arena {
            chunks: Vec::new(),
            spare: Vec::new(),
            commit_ahead_pages: *options.vmem_commit_ahead,
            default_reserve: *options.default_reserve,
            initial_commit: *options.initial_commit,
            hugepage_threshold: *options.hugepage_threshold,
        }
    }

    fn end_mut(&mut self) -> Option<&mut Chunk> {
        self.chunks.last_mut()
    }

    /// Fast/medium/slow path bump allocation, per spec.md §4.A.
    pub fn alloc(&mut self, size: usize) -> Result<crate::address::Address, CoreError> {
        let size = size.max(crate::util::constants::MIN_OBJECT_SIZE);
        let size = align_up(size, crate::util::constants::BYTES_IN_WORD);

        // Fast path: room in the tail chunk's already-committed range.
        let commit_ahead = self.commit_ahead_pages * page_size();
        if let Some(chunk) = self.end_mut() {
            if let Some(addr) = chunk.bump(size) {
                return Ok(addr);
            }
            // Medium path: still within the VA reservation, commit more.
            if chunk.offset + size <= chunk.reserved {
                chunk
                    .commit_more(size, commit_ahead)
                    .map_err(|_| CoreError::AllocFailure { requested: size })?;
                if let Some(addr) = chunk.bump(size) {
                    return Ok(addr);
                }
            }
        }

        // Slow path: walk the chain for a chunk with room.
        for chunk in self.chunks.iter_mut() {
            if let Some(addr) = chunk.bump(size) {
                return Ok(addr);
            }
        }

        // No chunk has room: reuse a chunk rewind set aside, or reserve and
        // link a new one at the tail.
        let needed_reserve = align_up(size, page_size());
        let mut chunk = match self.take_spare(needed_reserve) {
            Some(chunk) => chunk,
            None => {
                let reserve = self.default_reserve.max(needed_reserve);
                if reserve > 4 * self.default_reserve {
                    // A corrupted request rather than a legitimately huge
                    // one: fail rather than escalate, per spec.md's
                    // failure-mode note.
                    return Err(CoreError::AllocFailure { requested: size });
                }
                let huge = reserve >= self.hugepage_threshold;
                Chunk::reserve(reserve, huge)
                    .map_err(|_| CoreError::AllocFailure { requested: size })?
            }
        };
        chunk
            .commit_more(self.initial_commit.min(chunk.reserved), 0)
            .map_err(|_| CoreError::AllocFailure { requested: size })?;
        let addr = chunk
            .bump(size)
            .ok_or(CoreError::AllocFailure { requested: size })?;
        self.chunks.push(chunk);
        Ok(addr)
    }

    /// Takes the first spare chunk (in the order rewind set them aside)
    /// whose reservation is big enough for `needed_reserve`, if any.
    fn take_spare(&mut self, needed_reserve: usize) -> Option<Chunk> {
        let pos = self.spare.iter().position(|c| c.reserved >= needed_reserve)?;
        Some(self.spare.remove(pos))
    }

    /// Captures `(end, end.offset)`.
    pub fn snapshot(&self) -> Mark {
        let chunk_index = self.chunks.len().saturating_sub(1);
        let offset = self.chunks.last().map(|c| c.offset).unwrap_or(0);
        Mark {
            chunk_index,
            offset,
        }
    }

    /// Rewinds the bump cursor to `mark`. Chunks allocated after the mark
    /// are detached from the active chain into `spare` with their offset
    /// zeroed, **not** dropped — dropping a [`Chunk`] unmaps its VA
    /// reservation (see its `Drop` impl), which would be a physical
    /// release `rewind` must never perform (only `reset` may). A later
    /// `alloc` reuses spare chunks before reserving new ones, so repeated
    /// snapshot/alloc/rewind cycles return pointers in the same chunks in
    /// the same order each time. Chunks up to and including the mark have
    /// their tail zeroed back to the snapshot offset. No physical memory
    /// is released.
    pub fn rewind(&mut self, mark: Mark) {
        if self.chunks.is_empty() {
            return;
        }
        for mut chunk in self.chunks.drain(mark.chunk_index + 1..) {
            chunk.offset = 0;
            self.spare.push(chunk);
        }
        if let Some(chunk) = self.chunks.get_mut(mark.chunk_index) {
            chunk.offset = mark.offset;
        }
    }

    /// Returns every chunk's committed pages to the OS via `madvise` (or
    /// decommit on Windows) without unmapping the VA reservation, and
    /// rewinds every offset to zero.
    pub fn reset(&mut self) {
        for chunk in self.chunks.iter_mut() {
            chunk.decommit_all();
        }
    }

    /// Splits off the chunks from `start_index` onward into a new `Arena`,
    /// leaving this arena holding the chunks before `start_index`. Used by
    /// the region manager to move a trailing run of chunks between
    /// regions in O(chain length to the split point).
    pub fn detach(&mut self, start_index: usize) -> Arena {
        let tail = self.chunks.split_off(start_index.min(self.chunks.len()));
        Arena {
            chunks: tail,
            spare: Vec::new(),
            commit_ahead_pages: self.commit_ahead_pages,
            default_reserve: self.default_reserve,
            initial_commit: self.initial_commit,
            hugepage_threshold: self.hugepage_threshold,
        }
    }

    /// Appends `other`'s chunks to the tail of this arena's chain, and its
    /// spare chunks to this arena's spare pool.
    pub fn attach(&mut self, mut other: Arena) {
        self.chunks.append(&mut other.chunks);
        self.spare.append(&mut other.spare);
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}

fn align_up(v: usize, align: usize) -> usize {
    (v + align - 1) & !(align - 1)
}

fn page_size() -> usize {
    crate::util::constants::BYTES_IN_PAGE
}
