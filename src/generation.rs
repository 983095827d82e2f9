//! Generation counter for discarding stale async results.
//!
//! There is no cancellation for in-flight fetches. A caller that may be
//! superseded (search-as-you-type, page navigation) records the generation
//! it started under and applies the result only if that generation is still
//! current when the future resumes. [`crate::Catalog::refresh`] advances the
//! catalog's counter, so results computed against the old snapshot identify
//! themselves as stale.

use std::sync::atomic::{AtomicU64, Ordering};

/// An opaque, monotonically increasing generation tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

/// Monotonic counter handing out generation tags
#[derive(Debug, Default)]
pub struct GenerationCounter(AtomicU64);

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently active generation
    pub fn current(&self) -> Generation {
        Generation(self.0.load(Ordering::SeqCst))
    }

    /// Advance to a new generation, invalidating all earlier tags
    pub fn advance(&self) -> Generation {
        Generation(self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether a recorded tag is still the active generation
    pub fn is_current(&self, generation: Generation) -> bool {
        self.current() == generation
    }
}
