use tracing::{debug, warn};

use super::{Allocator, Range, RangeSequence, Release, Result, Snapshot, SpaceConfig, SpaceError};

impl Allocator {
    /// Create a new `Allocator` managing the addresses `[0, capacity)`, all of them free.
    ///
    /// Errors with `SpaceError::InvalidCapacity` if `capacity` is zero.
    pub fn new(capacity: u32) -> Result<Self> {
        if capacity == 0 {
            return Err(SpaceError::InvalidCapacity);
        }

        let mut free = RangeSequence::new();
        free.append(Range::new(0, capacity));

        Ok(Self {
            capacity,
            free,
            allocated: RangeSequence::new(),
        })
    }

    pub fn from_config(config: &SpaceConfig) -> Result<Self> {
        Self::new(config.capacity)
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Total number of free words.
    pub fn free_len(&self) -> u64 {
        self.free.total_length()
    }

    /// Total number of allocated words.
    pub fn allocated_len(&self) -> u64 {
        self.allocated.total_length()
    }

    /// Length of the largest free range, 0 when everything is allocated.
    pub fn largest_free(&self) -> u32 {
        self.free.iter().map(|r| r.length).max().unwrap_or(0)
    }

    pub fn is_allocated(&self, base: u32) -> bool {
        self.allocated.position_by_base(base).is_some()
    }

    /// Allocates `length` words from the first free range (in scan order) that can hold them,
    /// returning the base address of the new block.
    ///
    /// The block is carved from the low end of the chosen free range. A free range that is used
    /// up exactly is removed rather than left behind with a zero length.
    ///
    /// Errors with `SpaceError::InvalidLength` for a zero-length request and with
    /// `SpaceError::AllocationFailure` when no free range is large enough; neither touches
    /// the free or allocated set. This never coalesces on its own, see `allocate_or_coalesce`.
    pub fn allocate(&mut self, length: u32) -> Result<u32> {
        if length == 0 {
            return Err(SpaceError::InvalidLength);
        }

        let Some((idx, found)) = self.free.scan_first_fit(length) else {
            let largest = self.largest_free();
            debug!(requested = length, largest, "allocation failed");
            return Err(SpaceError::AllocationFailure {
                requested: length,
                largest,
            });
        };

        if found.length == length {
            self.free.remove_at(idx)?;
        } else {
            self.free
                .mutate_at(idx, Range::new(found.base + length, found.length - length))?;
        }

        self.allocated.append(Range::new(found.base, length));
        debug!(base = found.base, length, "allocated");

        Ok(found.base)
    }

    /// Like `allocate`, but on `AllocationFailure` coalesces the free set once and retries.
    pub fn allocate_or_coalesce(&mut self, length: u32) -> Result<u32> {
        match self.allocate(length) {
            Err(SpaceError::AllocationFailure { .. }) => {
                self.coalesce();
                self.allocate(length)
            }
            other => other,
        }
    }

    /// Moves the allocated block starting at `base` back to the end of the free set, unchanged.
    ///
    /// It errors with `SpaceError::NotFound` if no allocated block starts at `base` (a double
    /// free, a bad address, or one from another allocator); both sets are left as they were.
    pub fn release(&mut self, base: u32) -> Result<Release> {
        let Some(idx) = self.allocated.position_by_base(base) else {
            warn!(base, "release of unknown address");
            return Err(SpaceError::NotFound(base));
        };

        let block = self.allocated.remove_at(idx)?;
        self.free.append(block);
        debug!(base, length = block.length, "released");

        Ok(Release {
            base: block.base,
            length: block.length,
        })
    }

    /// Rebuilds the free set sorted by base, merging every run of adjacent free ranges into one.
    ///
    /// Returns how many merges happened. The allocated set is never touched, and calling this
    /// again right away changes nothing.
    pub fn coalesce(&mut self) -> usize {
        let mut merged = RangeSequence::new();
        let mut current: Option<Range> = None;
        let mut merges = 0;

        for range in self.free.sorted_by_base() {
            current = match current {
                Some(prev) if prev.is_adjacent_to(&range) => {
                    merges += 1;
                    Some(Range::new(prev.base, prev.length + range.length))
                }
                Some(prev) => {
                    merged.append(prev);
                    Some(range)
                }
                None => Some(range),
            };
        }
        if let Some(last) = current {
            merged.append(last);
        }

        debug!(merges, free_ranges = merged.len(), "coalesced");
        self.free = merged;

        merges
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            free: self.free.iter().copied().collect(),
            allocated: self.allocated.iter().copied().collect(),
        }
    }

    /// Checks that the free and allocated ranges together cover `[0, capacity)` exactly once,
    /// with no zero-length range anywhere.
    pub fn check_tiling(&self) -> bool {
        let mut all: Vec<Range> = self.free.iter().chain(self.allocated.iter()).copied().collect();
        all.sort_by_key(|r| r.base);

        let mut next = 0u32;
        for range in &all {
            if range.length == 0 || range.base != next {
                return false;
            }
            next = range.end();
        }

        next == self.capacity
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Allocate(u32),
        Release(usize),
        Coalesce,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (1u32..40).prop_map(Op::Allocate),
            3 => any::<usize>().prop_map(Op::Release),
            1 => Just(Op::Coalesce),
        ]
    }

    proptest! {
        #[test]
        fn prop_every_step_tiles(capacity in 1u32..200, ops in prop::collection::vec(op(), 1..80)) {
            let mut space = Allocator::new(capacity).unwrap();
            let mut live: Vec<u32> = vec![];

            for op in ops {
                match op {
                    Op::Allocate(len) => {
                        let before = space.snapshot();
                        match space.allocate(len) {
                            Ok(base) => live.push(base),
                            Err(_) => {
                                prop_assert_eq!(space.snapshot(), before);
                            }
                        }
                    }
                    Op::Release(pick) if !live.is_empty() => {
                        let base = live.swap_remove(pick % live.len());
                        prop_assert!(space.release(base).is_ok());
                        prop_assert_eq!(space.release(base), Err(SpaceError::NotFound(base)));
                    }
                    Op::Release(_) => {}
                    Op::Coalesce => {
                        let allocated = space.snapshot().allocated;
                        space.coalesce();
                        let once = space.snapshot();
                        prop_assert_eq!(&once.allocated, &allocated);
                        for pair in once.free.windows(2) {
                            prop_assert!(pair[0].end() < pair[1].base);
                        }
                        space.coalesce();
                        prop_assert_eq!(space.snapshot(), once);
                    }
                }

                prop_assert!(space.check_tiling());
                prop_assert_eq!(space.free_len() + space.allocated_len(), capacity as u64);
            }
        }

        #[test]
        fn prop_full_release_coalesces_to_one_range(capacity in 1u32..200, sizes in prop::collection::vec(1u32..20, 1..20)) {
            let mut space = Allocator::new(capacity).unwrap();
            let bases: Vec<u32> = sizes.iter().filter_map(|&len| space.allocate(len).ok()).collect();

            for base in bases.iter().rev() {
                prop_assert!(space.release(*base).is_ok());
            }
            space.coalesce();

            prop_assert_eq!(space.snapshot().free, vec![Range::new(0, capacity)]);
            prop_assert!(space.snapshot().allocated.is_empty());
        }
    }
}
