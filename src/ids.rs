//! Task id allocation.

/// Hands out monotonically increasing task ids, starting at 1.
///
/// Each `TaskManager` owns one, so two managers in the same process never
/// share a counter and tests can start from a known state.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        IdAllocator { next: 1 }
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next id.
    pub fn allocate(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The id the next call to `allocate` will return.
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Record an id that was assigned elsewhere (e.g. loaded from a store)
    /// so it is never handed out again.
    pub fn observe(&mut self, id: u64) {
        if id >= self.next {
            self.next = id + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocates_sequentially_from_one() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(), 1);
        assert_eq!(ids.allocate(), 2);
        assert_eq!(ids.peek(), 3);
    }

    #[test]
    fn test_observe_skips_past_loaded_ids() {
        let mut ids = IdAllocator::new();
        ids.observe(7);
        assert_eq!(ids.allocate(), 8);
        ids.observe(3);
        assert_eq!(ids.allocate(), 9);
    }

    #[test]
    fn test_allocators_are_independent() {
        let mut a = IdAllocator::new();
        let mut b = IdAllocator::new();
        assert_eq!(a.allocate(), 1);
        assert_eq!(b.allocate(), 1);
    }
}
