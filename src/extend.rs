//! Growing the arena through a [`crate::HeapBackend`] and folding the new
//! region into the free lists.
//!
//! The very first extension (when the arena doesn't exist yet) and every
//! later one share the same code path: the new region is tagged as one
//! free block and handed to [`crate::coalesce`], which merges it with the
//! previous arena's last block if that block happened to be free. On the
//! first call there is no previous block, and [`block::prev_block`] and
//! [`block::next_block`] both correctly report none, so the coalescer
//! degenerates into "format the new region as the sole free block", which
//! is exactly the behavior `init` needs.

use crate::backend::HeapBackend;
use crate::block::{self, BlockRef};
use crate::coalesce::{self, MergeKind};
use crate::config::Config;

pub(crate) unsafe fn extend_heap<B: HeapBackend, const N: usize>(
    backend: &mut B,
    lists: &mut [BlockRef; N],
    heap_base: &mut usize,
    heap_end: &mut usize,
    n: usize,
    cfg: &Config,
) -> Option<(usize, MergeKind)> {
    let region = backend.extend(n)?;
    if *heap_base == 0 && *heap_end == 0 {
        *heap_base = region;
    } else {
        debug_assert_eq!(region, *heap_end, "backend must grow contiguously");
    }

    block::set_tags(region, n, true);
    *heap_end = region + n;

    Some(coalesce::coalesce(lists, *heap_base, *heap_end, region, cfg))
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::backend::VecHeapBackend;

    #[test]
    fn first_extension_formats_a_single_free_block() {
        let mut backend = VecHeapBackend::with_capacity(4096);
        let mut lists: [BlockRef; 16] = [BlockRef::NULL; 16];
        let cfg = Config::default();
        let mut base = 0usize;
        let mut end = 0usize;

        let (addr, kind) = unsafe {
            extend_heap(&mut backend, &mut lists, &mut base, &mut end, 256, &cfg).unwrap()
        };

        assert_eq!(kind, MergeKind::None);
        assert_eq!(addr, base);
        assert_eq!(end - base, 256);
        unsafe {
            assert_eq!(block::size_of_block(addr), 256);
            assert!(block::is_freed(addr));
        }
    }

    #[test]
    fn second_extension_merges_with_free_last_block() {
        let mut backend = VecHeapBackend::with_capacity(4096);
        let mut lists: [BlockRef; 16] = [BlockRef::NULL; 16];
        let cfg = Config::default();
        let mut base = 0usize;
        let mut end = 0usize;

        unsafe {
            extend_heap(&mut backend, &mut lists, &mut base, &mut end, 256, &cfg).unwrap();
            let (addr, kind) =
                extend_heap(&mut backend, &mut lists, &mut base, &mut end, 128, &cfg).unwrap();
            assert_eq!(kind, MergeKind::Left);
            assert_eq!(addr, base);
            assert_eq!(block::size_of_block(addr), 384);
        }
    }
}
