//! Single-slot handoff from the home-sensor interrupt to the periodic
//! update.

use std::sync::atomic::{AtomicU8, Ordering};

const EMPTY: u8 = 0;
const INACTIVE: u8 = 1;
const ACTIVE: u8 = 2;

/// At most one pending home-sensor reading.
///
/// [`post`](Self::post) is write-if-empty: when a second edge arrives
/// before the first reading has been drained, the later reading is
/// discarded, so a rapid double toggle between two drains is observed as
/// a single reading. The loss is intentional: the machine only ever
/// acts on the level that was latched first.
///
/// Both operations are single atomic read-modify-writes; the latch never
/// blocks and is safe to share with interrupt context.
#[derive(Debug, Default)]
pub struct HomeLatch {
    slot: AtomicU8,
}

impl HomeLatch {
    /// An empty latch.
    pub const fn new() -> Self {
        Self {
            slot: AtomicU8::new(EMPTY),
        }
    }

    /// Store a reading unless one is already pending.
    ///
    /// Returns whether the reading was stored.
    pub fn post(&self, active: bool) -> bool {
        let value = if active { ACTIVE } else { INACTIVE };
        self.slot
            .compare_exchange(EMPTY, value, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Remove and return the pending reading, if any.
    pub fn take(&self) -> Option<bool> {
        match self.slot.swap(EMPTY, Ordering::AcqRel) {
            EMPTY => None,
            INACTIVE => Some(false),
            _ => Some(true),
        }
    }

    /// Whether a reading is pending.
    pub fn is_pending(&self) -> bool {
        self.slot.load(Ordering::Acquire) != EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_returns_the_posted_reading() {
        let latch = HomeLatch::new();
        assert_eq!(latch.take(), None);

        assert!(latch.post(true));
        assert!(latch.is_pending());
        assert_eq!(latch.take(), Some(true));
        assert_eq!(latch.take(), None);
    }

    #[test]
    fn second_post_before_the_drain_is_discarded() {
        let latch = HomeLatch::new();
        assert!(latch.post(true));
        // The double toggle collapses into the first reading.
        assert!(!latch.post(false));
        assert_eq!(latch.take(), Some(true));
    }

    #[test]
    fn post_after_take_is_accepted_again() {
        let latch = HomeLatch::new();
        assert!(latch.post(false));
        assert_eq!(latch.take(), Some(false));
        assert!(latch.post(true));
        assert_eq!(latch.take(), Some(true));
    }
}
