//! Parking one [`Allocator`] behind a `static` so it can back
//! `#[global_allocator]` or simply be called from more than one place
//! without threading a `&mut Allocator` through the whole program.
//!
//! This is the only place in the crate that takes a lock: [`Allocator`]
//! itself stays single-threaded and `&mut self`-driven, and
//! [`GlobalAllocator`] wraps one in a [`spin::Mutex`] behind a
//! [`conquer_once::spin::OnceCell`], so construction can stay `const fn` for
//! a `static` initializer while the actual allocator is built lazily on
//! first use.

use core::alloc::{GlobalAlloc, Layout};
use core::ptr::NonNull;

use conquer_once::spin::OnceCell;
use spin::Mutex;

use crate::allocator::{Allocator, DEFAULT_CLASSES};
use crate::backend::HeapBackend;
use crate::err::AllocError;
use crate::logger::{Logger, NullLogger};
use crate::stats::Stats;

/// A process-wide [`Allocator`] instance, safe to share behind a `static`.
pub struct GlobalAllocator<B: HeapBackend, L: Logger = NullLogger, const N: usize = DEFAULT_CLASSES> {
    inner: OnceCell<Mutex<Allocator<B, L, N>>>,
}

impl<B: HeapBackend, L: Logger, const N: usize> GlobalAllocator<B, L, N> {
    /// Builds an uninitialized singleton, suitable for a `static`.
    pub const fn uninit() -> Self {
        GlobalAllocator {
            inner: OnceCell::uninit(),
        }
    }

    /// Installs `allocator` as the process-wide instance and runs
    /// [`Allocator::init`] on it. Only the first caller's `allocator` takes
    /// effect; later calls are true no-ops, returning `Ok(())` without
    /// touching the backend the caller passed in, since that instance is
    /// discarded unused.
    pub fn init(&self, mut allocator: Allocator<B, L, N>) -> Result<(), AllocError> {
        if self.inner.get().is_some() {
            return Ok(());
        }
        let result = allocator.init();
        self.inner.init_once(|| Mutex::new(allocator));
        result
    }

    pub fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        self.inner.get()?.lock().allocate(size)
    }

    pub fn free(&self, ptr: Option<NonNull<u8>>) {
        if let Some(m) = self.inner.get() {
            m.lock().free(ptr);
        }
    }

    pub fn reallocate(&self, ptr: Option<NonNull<u8>>, size: usize) -> Option<NonNull<u8>> {
        self.inner.get()?.lock().reallocate(ptr, size)
    }

    pub fn zalloc(&self, count: usize, size: usize) -> Option<NonNull<u8>> {
        self.inner.get()?.lock().zalloc(count, size)
    }

    pub fn checkheap(&self, line: i32) -> bool {
        self.inner.get().map_or(false, |m| m.lock().checkheap(line))
    }

    pub fn stats(&self) -> Stats {
        self.inner.get().map_or(Stats::default(), |m| m.lock().stats())
    }
}

// `GlobalAllocator<B, L, N>` is `Sync` automatically whenever `B` and `L`
// are `Send`, since that's exactly what makes `Mutex<Allocator<B, L, N>>`
// (and so the `OnceCell` wrapping it) `Sync`; access only ever happens
// through the lock, which is what `GlobalAlloc` requires.
unsafe impl<B: HeapBackend + Send, L: Logger + Send, const N: usize> GlobalAlloc for GlobalAllocator<B, L, N> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        self.allocate(layout.size())
            .map_or(core::ptr::null_mut(), |p| p.as_ptr())
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        self.free(NonNull::new(ptr));
    }

    unsafe fn realloc(&self, ptr: *mut u8, _layout: Layout, new_size: usize) -> *mut u8 {
        self.reallocate(NonNull::new(ptr), new_size)
            .map_or(core::ptr::null_mut(), |p| p.as_ptr())
    }
}
