//! A single virtual-memory reservation within an [`super::Arena`].

use std::io;

use crate::address::Address;

/// `offset <= committed <= reserved`; `base` is page-aligned. A reserved
/// range starts `PROT_NONE` and is progressively made readable/writable
/// as `commit_more` is called, the way `posix_common::mmap` +
/// `mprotect` work in the teacher's OS layer.
pub struct Chunk {
    base: Address,
    pub(super) reserved: usize,
    committed: usize,
    pub(super) offset: usize,
}

fn wrap_libc_call<T: PartialEq>(f: impl Fn() -> T, expect: T) -> io::Result<()> {
    if f() == expect {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

impl Chunk {
    /// Reserves `size` bytes of address space with `PROT_NONE`. Nothing is
    /// committed yet. `huge` requests transparent huge pages via
    /// `madvise(MADV_HUGEPAGE)`, matching `LinuxMemoryImpl::set_hugepage`.
    pub fn reserve(size: usize, huge: bool) -> io::Result<Chunk> {
        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                size,
                libc::PROT_NONE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS | libc::MAP_NORESERVE,
                -1,
                0,
            )
        };
        if ptr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }
        if huge {
            // Best-effort: a failure here does not affect correctness.
            let _ = wrap_libc_call(
                || unsafe { libc::madvise(ptr, size, libc::MADV_HUGEPAGE) },
                0,
            );
        }
        Ok(Chunk {
            base: Address::from_mut_ptr(ptr),
            reserved: size,
            committed: 0,
            offset: 0,
        })
    }

    /// Bumps `offset` by `size` if the already-committed range has room.
    pub(super) fn bump(&mut self, size: usize) -> Option<Address> {
        if self.offset + size <= self.committed {
            let addr = self.base + self.offset;
            self.offset += size;
            Some(addr)
        } else {
            None
        }
    }

    /// Extends `committed` by at least `size` bytes (page-rounded),
    /// looking `commit_ahead` bytes further to amortize `mprotect` calls,
    /// capped at `reserved`.
    pub(super) fn commit_more(&mut self, size: usize, commit_ahead: usize) -> io::Result<()> {
        let page = crate::util::constants::BYTES_IN_PAGE;
        let needed = self.offset + size;
        let want = (needed + commit_ahead).min(self.reserved);
        let want = align_up(want, page).min(self.reserved);
        if want <= self.committed {
            return Ok(());
        }
        let grow = want - self.committed;
        let addr = self.base + self.committed;
        wrap_libc_call(
            || unsafe {
                libc::mprotect(
                    addr.to_mut_ptr(),
                    grow,
                    libc::PROT_READ | libc::PROT_WRITE,
                )
            },
            0,
        )?;
        self.committed = want;
        Ok(())
    }

    /// Returns committed pages to the OS without unmapping the
    /// reservation (`madvise(MADV_DONTNEED)`), and rewinds the bump
    /// cursor, mirroring the teacher's decommit-on-reset behaviour.
    pub(super) fn decommit_all(&mut self) {
        if self.committed > 0 {
            let _ = wrap_libc_call(
                || unsafe {
                    libc::madvise(
                        self.base.to_mut_ptr(),
                        self.committed,
                        libc::MADV_DONTNEED,
                    )
                },
                0,
            );
        }
        self.offset = 0;
    }
}

impl Drop for Chunk {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.base.to_mut_ptr(), self.reserved);
        }
    }
}

fn align_up(v: usize, align: usize) -> usize {
    (v + align - 1) & !(align - 1)
}
