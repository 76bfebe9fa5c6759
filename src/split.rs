//! Carving an allocation out of a free block found by [`crate::placement`].

use crate::block::{self, BlockRef, MIN_BLOCK};
use crate::classes;
use crate::config::Config;

/// Unlinks the free block at `addr` and carves `target` bytes off its front
/// for allocation, returning the address of the (now allocated) block.
///
/// If the remainder is too small to hold a block of its own, the entire
/// free block is handed out instead of splitting it, an internal
/// fragmentation trade the allocator accepts rather than create a block
/// that could never be reused.
pub(crate) unsafe fn split<const N: usize>(
    lists: &mut [BlockRef; N],
    base: usize,
    addr: usize,
    target: usize,
    cfg: &Config,
) -> usize {
    let block_size = block::size_of_block(addr);
    debug_assert!(block_size >= target);
    classes::unlink(lists, base, addr, block_size, cfg);

    let remainder = block_size - target;
    if remainder < MIN_BLOCK {
        block::set_tags(addr, block_size, false);
        return addr;
    }

    block::set_tags(addr, target, false);
    let remainder_addr = addr + target;
    block::set_tags(remainder_addr, remainder, true);
    classes::insert(lists, base, remainder_addr, remainder, cfg);
    addr
}
