//! Diagnostic counters. Never consulted by the allocator's own logic,
//! purely an accessor for callers who want visibility into how hard the
//! arena has been worked.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub mallocs: u64,
    pub frees: u64,
    pub reallocs: u64,
    /// Number of times the arena was grown through the [`crate::HeapBackend`].
    pub extends: u64,
}
