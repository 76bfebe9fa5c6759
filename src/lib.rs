#![cfg_attr(not(test), no_std)]

//! A single-threaded, segregated free-list dynamic memory allocator.
//!
//! The allocator manages one contiguous arena obtained through a pluggable
//! [`HeapBackend`], carving it into tagged blocks that tile the arena without
//! gaps or overlap. Free blocks are threaded onto sixteen segregated
//! free lists, bucketed by a power-of-two size class, and a first-fit search
//! over those lists backs every allocation. Adjacent free blocks are merged
//! eagerly on every free and on every heap extension.
//!
//! [`Allocator`] owns this state directly and is meant to be driven from a
//! single call site at a time; [`GlobalAllocator`] adds the locking needed to
//! park one instance behind a `static` and use it as a `#[global_allocator]`.

#[cfg(any(test, feature = "std"))]
#[macro_use]
extern crate std;

mod block;
mod classes;
mod coalesce;
mod extend;
mod placement;
mod split;

mod check;

#[cfg(all(test, feature = "std"))]
mod scenarios;

pub mod allocator;
pub mod backend;
pub mod config;
pub mod err;
pub mod logger;
pub mod global;
pub mod stats;

pub use allocator::Allocator;
pub use backend::HeapBackend;
pub use config::Config;
pub use err::{AllocError, BaseError, CanFail};
pub use global::GlobalAllocator;
pub use logger::{Level, Logger, NullLogger};
pub use stats::Stats;

#[cfg(feature = "std")]
pub use backend::VecHeapBackend;
#[cfg(feature = "std")]
pub use logger::StdLogger;
