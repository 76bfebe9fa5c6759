//! A two-pass heap consistency checker, callable from anywhere as
//! `self.checkheap(line!())` to pin down exactly which call site a
//! corruption first became visible from.
//!
//! The first pass walks the arena block by block (ignoring the free lists
//! entirely) checking that blocks tile the arena with no gaps or overlap,
//! that every header agrees with its footer, that no two free blocks sit
//! next to each other uncoalesced, and that every block claiming to be free
//! is reachable from its size class's list. The second pass walks the free
//! lists themselves, checking that every linked block is actually tagged
//! free and filed under the right class. Comparing the free-block count
//! from each pass catches a block that is tagged free but missing from
//! every list, the one failure mode an arena-only or lists-only walk can't
//! see by itself.

use crate::allocator::Allocator;
use crate::backend::HeapBackend;
use crate::block::{self, BlockRef};
use crate::classes;
use crate::logger::Logger;
use crate::{dbg_error, dbg_info};

pub(crate) fn check_heap<B: HeapBackend, L: Logger, const N: usize>(
    a: &Allocator<B, L, N>,
    line: i32,
) -> bool {
    let (heap_base, heap_end) = match (a.heap_base(), a.heap_end()) {
        (Some(b), Some(e)) => (b, e),
        _ => return true,
    };

    let mut ok = true;
    let mut addr = heap_base;
    let mut tiled = 0usize;
    let mut prev_was_free = false;
    let mut arena_free_count = 0usize;

    while addr < heap_end {
        if addr % a.config().alignment != 0 {
            dbg_error!(a.logger(), "checkheap", line, "block at {:#x} is not aligned", addr);
            ok = false;
        }

        let size = unsafe { block::size_of_block(addr) };
        let freed = unsafe { block::is_freed(addr) };
        let (footer_size, footer_freed) = unsafe { block::footer_tag(addr, size) };
        if footer_size != size || footer_freed != freed {
            dbg_error!(
                a.logger(),
                "checkheap",
                line,
                "header/footer disagree at {:#x}: header=({}, {}) footer=({}, {})",
                addr,
                size,
                freed,
                footer_size,
                footer_freed
            );
            ok = false;
        }

        if freed && prev_was_free {
            dbg_error!(a.logger(), "checkheap", line, "uncoalesced free blocks meeting at {:#x}", addr);
            ok = false;
        }

        if freed {
            arena_free_count += 1;
            let class = classes::class_of(size, a.config(), N);
            if !list_contains(a.free_lists(), heap_base, addr, class) {
                dbg_error!(
                    a.logger(),
                    "checkheap",
                    line,
                    "free block at {:#x} unreachable from class {}",
                    addr,
                    class
                );
                ok = false;
            }
        }

        tiled += size;
        prev_was_free = freed;
        addr += size;
    }

    if tiled != heap_end - heap_base {
        dbg_error!(
            a.logger(),
            "checkheap",
            line,
            "blocks sum to {} bytes but the arena spans {}",
            tiled,
            heap_end - heap_base
        );
        ok = false;
    }

    let mut list_free_count = 0usize;
    for (class, head) in a.free_lists().iter().enumerate() {
        let mut cur = *head;
        while !cur.is_null() {
            let caddr = cur.addr(heap_base);
            if !unsafe { block::is_freed(caddr) } {
                dbg_error!(
                    a.logger(),
                    "checkheap",
                    line,
                    "block at {:#x} linked on free list {} but not tagged free",
                    caddr,
                    class
                );
                ok = false;
            }
            let size = unsafe { block::size_of_block(caddr) };
            let expected = classes::class_of(size, a.config(), N);
            if expected != class {
                dbg_error!(
                    a.logger(),
                    "checkheap",
                    line,
                    "block at {:#x} filed under class {} but belongs in {}",
                    caddr,
                    class,
                    expected
                );
                ok = false;
            }
            list_free_count += 1;
            cur = unsafe { block::read_next(caddr) };
        }
    }

    if arena_free_count != list_free_count {
        dbg_error!(
            a.logger(),
            "checkheap",
            line,
            "arena walk found {} free blocks but the lists hold {}",
            arena_free_count,
            list_free_count
        );
        ok = false;
    }

    if ok {
        dbg_info!(a.logger(), "checkheap", line, "heap consistent: {} free blocks", arena_free_count);
    }

    ok
}

fn list_contains<const N: usize>(lists: &[BlockRef; N], base: usize, target: usize, class: usize) -> bool {
    let mut cur = lists[class];
    while !cur.is_null() {
        let addr = cur.addr(base);
        if addr == target {
            return true;
        }
        cur = unsafe { block::read_next(addr) };
    }
    false
}
