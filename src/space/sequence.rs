use std::fmt;

use super::{Range, Result, SpaceError};

/// Ordered storage for ranges, used for both the free set and the allocated set.
///
/// Order is whatever the caller built: `append` always adds at the end, and
/// nothing reorders entries except an explicit `commit_sorted`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSequence {
    ranges: Vec<Range>,
}

impl RangeSequence {
    pub fn new() -> Self {
        Self { ranges: vec![] }
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Range> {
        self.ranges.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Range> {
        self.ranges.iter()
    }

    pub fn append(&mut self, range: Range) {
        self.ranges.push(range);
    }

    /// Index and copy of the first range, in current order, with at least `min_length` words.
    pub fn scan_first_fit(&self, min_length: u32) -> Option<(usize, Range)> {
        self.ranges
            .iter()
            .copied()
            .enumerate()
            .find(|(_, r)| r.length >= min_length)
    }

    /// Index of the first range, in current order, starting at `base`.
    pub fn position_by_base(&self, base: u32) -> Option<usize> {
        self.ranges.iter().position(|r| r.base == base)
    }

    /// Removes the range at `index`, keeping the relative order of the rest.
    pub fn remove_at(&mut self, index: usize) -> Result<Range> {
        self.check_index(index)?;
        Ok(self.ranges.remove(index))
    }

    /// Replaces the range at `index` without moving it.
    pub fn mutate_at(&mut self, index: usize, range: Range) -> Result<()> {
        self.check_index(index)?;
        self.ranges[index] = range;
        Ok(())
    }

    /// Ranges ordered by base address, leaving this sequence untouched.
    ///
    /// The returned iterator is `Clone`, so a consumer can restart the walk
    /// from a saved copy; calling this again also starts over.
    pub fn sorted_by_base(&self) -> impl Iterator<Item = Range> + Clone + '_ {
        let mut order: Vec<usize> = (0..self.ranges.len()).collect();
        order.sort_by_key(|&i| self.ranges[i].base);
        order.into_iter().map(move |i| self.ranges[i])
    }

    /// Sorts the sequence in place by base address.
    pub fn commit_sorted(&mut self) {
        self.ranges.sort_by_key(|r| r.base);
    }

    /// Sum of all range lengths.
    pub fn total_length(&self) -> u64 {
        self.ranges.iter().map(|r| r.length as u64).sum()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.ranges.len() {
            return Err(SpaceError::OutOfRange {
                index,
                len: self.ranges.len(),
            });
        }

        Ok(())
    }
}

impl From<Vec<Range>> for RangeSequence {
    fn from(ranges: Vec<Range>) -> Self {
        Self { ranges }
    }
}

impl FromIterator<Range> for RangeSequence {
    fn from_iter<I: IntoIterator<Item = Range>>(iter: I) -> Self {
        Self {
            ranges: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for RangeSequence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for range in &self.ranges {
            write!(f, "{} ", range)?;
        }
        Ok(())
    }
}
