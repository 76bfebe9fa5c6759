//! The public surface: an owned allocator instance driven directly through
//! `&mut self`.
//!
//! [`Allocator`] owns the arena bounds, the segregated free lists, the
//! backend that grows the arena, and a logger for diagnostics. It is not
//! `Sync` by itself and makes no attempt to be; wrap it in [`crate::GlobalAllocator`]
//! for the locking needed to park one behind a `static`.

use core::ptr::NonNull;

use crate::backend::HeapBackend;
use crate::block::{self, BlockRef};
use crate::check;
use crate::classes;
use crate::coalesce;
use crate::config::{align_up, Config};
use crate::err::AllocError;
use crate::extend;
use crate::logger::{Logger, NullLogger};
use crate::placement;
use crate::split;
use crate::stats::Stats;

/// Number of segregated free-list classes, unless overridden via the const
/// generic parameter on [`Allocator`].
pub const DEFAULT_CLASSES: usize = 16;

/// An owned, single-threaded allocator instance.
///
/// `N` is the number of segregated size classes (16 by default); it is a
/// compile-time parameter because it sizes an inline array rather than a
/// heap-allocated one, since this crate never assumes an allocator of its
/// own is available to build itself.
pub struct Allocator<B: HeapBackend, L: Logger = NullLogger, const N: usize = DEFAULT_CLASSES> {
    backend: B,
    logger: L,
    config: Config,
    heap_base: usize,
    heap_end: usize,
    free_lists: [BlockRef; N],
    stats: Stats,
}

impl<B: HeapBackend, const N: usize> Allocator<B, NullLogger, N> {
    /// Creates an allocator with default configuration and no logging.
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, Config::default())
    }

    pub fn with_config(backend: B, config: Config) -> Self {
        Allocator {
            backend,
            logger: NullLogger,
            config,
            heap_base: 0,
            heap_end: 0,
            free_lists: [BlockRef::NULL; N],
            stats: Stats::default(),
        }
    }
}

impl<B: HeapBackend, L: Logger, const N: usize> Allocator<B, L, N> {
    pub fn with_logger(backend: B, config: Config, logger: L) -> Self {
        Allocator {
            backend,
            logger,
            config,
            heap_base: 0,
            heap_end: 0,
            free_lists: [BlockRef::NULL; N],
            stats: Stats::default(),
        }
    }

    /// Grows the arena by one chunk and formats it as the initial free
    /// block. Must be called before any other operation; calling it again
    /// resets the free lists and counters and grows a second, disjoint-looking
    /// chunk that is folded in by the same coalescing path every later
    /// extension uses.
    pub fn init(&mut self) -> Result<(), AllocError> {
        self.free_lists = [BlockRef::NULL; N];
        self.stats = Stats::default();
        let chunk = align_up(
            self.config.chunk_size + block::HSIZE + block::FSIZE,
            self.config.alignment,
        );
        unsafe {
            extend::extend_heap(
                &mut self.backend,
                &mut self.free_lists,
                &mut self.heap_base,
                &mut self.heap_end,
                chunk,
                &self.config,
            )
        }
        .ok_or(AllocError::BackendExhausted)?;
        self.stats.extends += 1;
        Ok(())
    }

    /// Allocates at least `size` bytes, growing the arena through the
    /// backend if no free block is large enough. Returns `None` if `size`
    /// is zero, if the padded size overflows, or if the backend can't grow
    /// far enough to satisfy the request.
    pub fn allocate(&mut self, size: usize) -> Option<NonNull<u8>> {
        if size == 0 || self.heap_base == 0 {
            return None;
        }
        let asize = block::block_size_for(size, self.config.alignment)?;

        let addr = unsafe {
            match placement::find_fit(&self.free_lists, self.heap_base, asize, &self.config) {
                Some(found) => split::split(&mut self.free_lists, self.heap_base, found, asize, &self.config),
                None => {
                    let grow_by = self.extension_amount(asize);
                    let (region, _) = extend::extend_heap(
                        &mut self.backend,
                        &mut self.free_lists,
                        &mut self.heap_base,
                        &mut self.heap_end,
                        grow_by,
                        &self.config,
                    )?;
                    self.stats.extends += 1;
                    split::split(&mut self.free_lists, self.heap_base, region, asize, &self.config)
                }
            }
        };

        self.stats.mallocs += 1;
        NonNull::new(unsafe { block::payload_ptr(addr) })
    }

    /// How many bytes to ask the backend for when no free block fits
    /// `asize`. Tops up against the last block if it happens to be free and
    /// merely too small, so the extension (folded into that block by
    /// [`crate::extend::extend_heap`]'s coalescing) lands exactly on
    /// `asize` instead of overshooting by the whole last block's size.
    fn extension_amount(&self, asize: usize) -> usize {
        if self.heap_base == 0 {
            return core::cmp::max(asize, self.config.chunk_size);
        }
        match unsafe { block::prev_block(self.heap_end, self.heap_base) } {
            Some(last) if unsafe { block::is_freed(last) } => {
                let last_size = unsafe { block::size_of_block(last) };
                debug_assert!(asize > last_size);
                asize - last_size
            }
            _ => core::cmp::max(asize, self.config.chunk_size),
        }
    }

    /// Frees a block previously returned by [`Allocator::allocate`],
    /// [`Allocator::reallocate`], or [`Allocator::zalloc`]. A `None` pointer
    /// is a no-op, mirroring `free(NULL)`.
    pub fn free(&mut self, ptr: Option<NonNull<u8>>) {
        let Some(ptr) = ptr else { return };
        let addr = unsafe { block::block_of_payload(ptr.as_ptr()) };
        unsafe {
            let size = block::size_of_block(addr);
            block::set_tags(addr, size, true);
            coalesce::coalesce(&mut self.free_lists, self.heap_base, self.heap_end, addr, &self.config);
        }
        self.stats.frees += 1;
    }

    /// Resizes a previously allocated block. A `None` pointer behaves like
    /// [`Allocator::allocate`]; a zero `size` behaves like [`Allocator::free`]
    /// and returns `None`. Otherwise the payload is preserved up to
    /// `min(old_size, new_size)` bytes, whether or not the block moved.
    pub fn reallocate(&mut self, ptr: Option<NonNull<u8>>, size: usize) -> Option<NonNull<u8>> {
        if size == 0 {
            self.free(ptr);
            return None;
        }
        let Some(old_ptr) = ptr else {
            return self.allocate(size);
        };

        let old_addr = unsafe { block::block_of_payload(old_ptr.as_ptr()) };
        let old_block_size = unsafe { block::size_of_block(old_addr) };
        let new_block_size = block::block_size_for(size, self.config.alignment)?;

        if new_block_size == old_block_size {
            return Some(old_ptr);
        }

        let new_ptr = self.allocate(size)?;
        let old_payload = old_block_size - block::HSIZE - block::FSIZE;
        let new_payload = new_block_size - block::HSIZE - block::FSIZE;
        let copy_len = core::cmp::min(old_payload, new_payload);
        unsafe {
            core::ptr::copy_nonoverlapping(old_ptr.as_ptr(), new_ptr.as_ptr(), copy_len);
        }
        self.free(Some(old_ptr));
        self.stats.reallocs += 1;
        Some(new_ptr)
    }

    /// Allocates `count * size` bytes, zeroed. Returns `None` on overflow or
    /// if the allocation itself fails.
    pub fn zalloc(&mut self, count: usize, size: usize) -> Option<NonNull<u8>> {
        let total = count.checked_mul(size)?;
        let ptr = self.allocate(total)?;
        unsafe {
            core::ptr::write_bytes(ptr.as_ptr(), 0, total);
        }
        Some(ptr)
    }

    /// Walks the arena and the free lists, cross-checking every documented
    /// invariant, logging a diagnostic per violation through this
    /// allocator's [`Logger`]. `line` is conventionally `line!()` at the
    /// call site.
    pub fn checkheap(&self, line: i32) -> bool {
        check::check_heap(self, line)
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub(crate) fn heap_base(&self) -> Option<usize> {
        (self.heap_base != 0).then_some(self.heap_base)
    }

    pub(crate) fn heap_end(&self) -> Option<usize> {
        (self.heap_base != 0).then_some(self.heap_end)
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn logger(&self) -> &L {
        &self.logger
    }

    pub(crate) fn free_lists(&self) -> &[BlockRef; N] {
        &self.free_lists
    }
}
