//! Merging a newly freed (or newly extended) block with free neighbors.

use crate::block::{self, BlockRef};
use crate::classes;
use crate::config::Config;

/// Which of a block's immediate neighbors were free at the moment it was
/// coalesced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MergeKind {
    None,
    Left,
    Right,
    Both,
}

/// Merges the block at `addr` (already tagged free, not yet on any list)
/// with whichever immediate neighbors are themselves free, inserts the
/// resulting block into its size class, and returns its address.
///
/// `addr` must not already be linked into a free list: callers unlink or
/// simply haven't yet linked it before calling this.
pub(crate) unsafe fn coalesce<const N: usize>(
    lists: &mut [BlockRef; N],
    base: usize,
    heap_end: usize,
    addr: usize,
    cfg: &Config,
) -> (usize, MergeKind) {
    let size = block::size_of_block(addr);
    let prev = block::prev_block(addr, base);
    let next = block::next_block(addr, heap_end);

    let prev_free = prev.map_or(false, |p| block::is_freed(p));
    let next_free = next.map_or(false, |n| block::is_freed(n));

    let kind = match (prev_free, next_free) {
        (false, false) => MergeKind::None,
        (true, false) => MergeKind::Left,
        (false, true) => MergeKind::Right,
        (true, true) => MergeKind::Both,
    };

    let (result_addr, result_size) = match kind {
        MergeKind::None => (addr, size),
        MergeKind::Left => {
            let p = prev.unwrap();
            let p_size = block::size_of_block(p);
            classes::unlink(lists, base, p, p_size, cfg);
            (p, p_size + size)
        }
        MergeKind::Right => {
            let n = next.unwrap();
            let n_size = block::size_of_block(n);
            classes::unlink(lists, base, n, n_size, cfg);
            (addr, size + n_size)
        }
        MergeKind::Both => {
            let p = prev.unwrap();
            let n = next.unwrap();
            let p_size = block::size_of_block(p);
            let n_size = block::size_of_block(n);
            classes::unlink(lists, base, n, n_size, cfg);
            classes::unlink(lists, base, p, p_size, cfg);
            (p, p_size + size + n_size)
        }
    };

    block::set_tags(result_addr, result_size, true);
    classes::insert(lists, base, result_addr, result_size, cfg);
    (result_addr, kind)
}
