//! First-fit placement: finding a free block large enough for a request.

use crate::block::{self, BlockRef};
use crate::classes;
use crate::config::Config;

/// Searches the free lists, starting from the class the requested size
/// itself falls into and scanning upward, for the first block at least
/// `asize` bytes. Larger classes are guaranteed to hold only blocks that
/// could satisfy a smaller request, so nothing below the starting class is
/// ever worth a look.
pub(crate) unsafe fn find_fit<const N: usize>(
    lists: &[BlockRef; N],
    base: usize,
    asize: usize,
    cfg: &Config,
) -> Option<usize> {
    let start = classes::class_of(asize, cfg, N);
    for list in lists.iter().take(N).skip(start) {
        let mut cur = *list;
        while !cur.is_null() {
            let addr = cur.addr(base);
            if block::size_of_block(addr) >= asize {
                return Some(addr);
            }
            cur = block::read_next(addr);
        }
    }
    None
}
