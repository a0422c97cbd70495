//! Deferred reference counting: fall-back reclamation for graphs whose
//! mutability precludes static analysis.
//!
//! Grounded on the teacher's write-barrier modification buffer
//! (`ObjectRememberingBarrier::modbuf` in `src/plan/barriers.rs`) — a
//! plain `Vec` accumulating work to be flushed later, repurposed here
//! from write-barrier buffering to decrement buffering.

use std::collections::VecDeque;

use crate::error::CoreError;

struct Entry<T> {
    obj: T,
    pending_count: u32,
}

/// A singly-linked (here, `VecDeque`-backed) queue of pending decrements,
/// bounded by `batch_size`.
pub struct DeferredRc<T: Eq + Clone> {
    queue: VecDeque<Entry<T>>,
    batch_size: usize,
}

impl<T: Eq + Clone> DeferredRc<T> {
    pub fn new(batch_size: usize) -> Self {
        DeferredRc {
            queue: VecDeque::new(),
            batch_size,
        }
    }

    pub fn total_pending(&self) -> u32 {
        self.queue.iter().map(|e| e.pending_count).sum()
    }

    /// If `obj` is already queued, increments its pending count; else
    /// prepends a new entry. O(n-in-queue) worst case, as the spec notes.
    pub fn defer_decrement(&mut self, obj: T) {
        if let Some(entry) = self.queue.iter_mut().find(|e| e.obj == obj) {
            entry.pending_count += 1;
        } else {
            self.queue.push_front(Entry {
                obj,
                pending_count: 1,
            });
        }
    }

    /// `true` once there is more than twice a batch's worth of work
    /// outstanding.
    pub fn should_process_deferred(&self) -> bool {
        self.total_pending() > 2 * self.batch_size as u32
    }

    /// Pops up to `batch_size` entries and calls `dec_ref` once per
    /// pending decrement on each. If the work budget runs out mid-entry,
    /// the remainder of that entry's pending count is re-queued at the
    /// head, per spec.md §4.G.
    pub fn process_deferred(&mut self, budget: usize, mut dec_ref: impl FnMut(&T)) -> Result<(), CoreError> {
        let mut entries_done = 0usize;
        let mut work = 0usize;
        while entries_done < self.batch_size {
            let Some(mut entry) = self.queue.pop_front() else {
                break;
            };
            while entry.pending_count > 0 {
                if work >= budget {
                    self.queue.push_front(entry);
                    return Err(CoreError::BudgetExhausted);
                }
                dec_ref(&entry.obj);
                entry.pending_count -= 1;
                work += 1;
            }
            entries_done += 1;
        }
        Ok(())
    }

    /// Drains the queue unconditionally, ignoring `batch_size` and any
    /// work budget. Called on region teardown and process exit.
    pub fn flush_deferred(&mut self, mut dec_ref: impl FnMut(&T)) {
        while let Some(entry) = self.queue.pop_front() {
            for _ in 0..entry.pending_count {
                dec_ref(&entry.obj);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_defers_coalesce_into_one_entry() {
        let mut q: DeferredRc<u32> = DeferredRc::new(32);
        q.defer_decrement(1);
        q.defer_decrement(1);
        q.defer_decrement(2);
        assert_eq!(q.total_pending(), 3);
        assert_eq!(q.queue.len(), 2);
    }

    #[test]
    fn should_process_triggers_above_twice_batch_size() {
        let mut q: DeferredRc<u32> = DeferredRc::new(2);
        for i in 0..4 {
            q.defer_decrement(i);
        }
        assert!(!q.should_process_deferred());
        q.defer_decrement(100);
        assert!(q.should_process_deferred());
    }

    #[test]
    fn process_deferred_applies_every_decrement_exactly_once() {
        let mut q: DeferredRc<u32> = DeferredRc::new(32);
        q.defer_decrement(1);
        q.defer_decrement(1);
        q.defer_decrement(2);
        let mut total = 0;
        q.process_deferred(100, |_| total += 1).unwrap();
        assert_eq!(total, 3);
        assert_eq!(q.total_pending(), 0);
    }

    #[test]
    fn flush_deferred_drains_unconditionally() {
        let mut q: DeferredRc<u32> = DeferredRc::new(1);
        for i in 0..10 {
            q.defer_decrement(i);
        }
        let mut total = 0;
        q.flush_deferred(|_| total += 1);
        assert_eq!(total, 10);
        assert_eq!(q.total_pending(), 0);
    }
}
