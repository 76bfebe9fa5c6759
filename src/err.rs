//! Error taxonomy shared across the crate.

/// Marker trait for allocator-facing error types: a small `Debug` supertrait
/// rather than an elaborate `std::error::Error`-style hierarchy, since this
/// crate never carries `std`.
pub trait BaseError: core::fmt::Debug {}

/// Result alias for fallible operations that carry no success payload.
pub type CanFail<T> = Result<(), T>;

/// Failure modes surfaced by the allocator's own operations.
///
/// Callers mostly see these indirectly, as a `None` returned from
/// [`crate::Allocator::allocate`] or friends; [`AllocError`] exists for the
/// code paths ([`crate::Allocator::init`] and [`crate::check`]) that want to
/// explain *why* a request failed rather than just that it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// The backend refused to grow the arena by the requested amount.
    BackendExhausted,
}

impl BaseError for AllocError {}

impl core::fmt::Display for AllocError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AllocError::BackendExhausted => write!(f, "heap backend exhausted"),
        }
    }
}
